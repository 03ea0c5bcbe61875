// storage/mod.rs
// Visit persistence: key/value backends and the typed visit store

/// Key/value storage backends
pub mod backend;
mod migration;
/// Visit record types
pub mod models;
/// Typed visit store
pub mod store;

// Re-export commonly used items
pub use backend::{FileStorage, KeyValueStorage, MemoryStorage};
pub use models::{VisitRecord, VisitRecords};
pub use store::VisitRecordStore;
