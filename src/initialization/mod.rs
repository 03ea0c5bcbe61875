//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources:
//! - Logger (plain or JSON output)
//! - HTTP client used for the geolocation and atlas requests

mod client;
mod logger;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
