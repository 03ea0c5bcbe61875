//! Error handling.
//!
//! Failures are grouped by the collaborator they come from:
//! - **Initialization**: logger and HTTP client setup
//! - **Storage**: key/value storage unavailable, full or corrupt
//! - **Lookup**: visitor geolocation request or payload problems
//! - **Atlas**: geographic dataset fetch or parse problems
//!
//! None of these are surfaced to the visitor; the widget stays inert instead.

mod types;

// Re-export public API
pub use types::{AtlasError, InitializationError, LookupError, StorageError};
