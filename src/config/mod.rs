//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (thresholds, endpoints, storage keys, styling)
//! - Configuration and CLI option types

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, DedupMode, LogFormat, LogLevel};
