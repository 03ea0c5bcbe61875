//! Error type definitions.
//!
//! Every failure here is local and non-fatal to the widget: callers on the
//! best-effort paths log these and degrade to a no-op.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for key/value storage access.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be (de)serialized.
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing the value would exceed the storage quota.
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} bytes available")]
    QuotaExceeded {
        /// Bytes the storage would hold after the write
        needed: usize,
        /// Configured quota in bytes
        quota: usize,
    },

    /// Storage has been disabled.
    #[error("Storage unavailable")]
    Unavailable,

    /// A visit was offered without a usable country code.
    #[error("Invalid country code: {0:?}")]
    InvalidCode(String),
}

/// Error types for the visitor country lookup.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The request could not be sent or timed out.
    #[error("Geolocation request failed: {0}")]
    Request(#[from] ReqwestError),

    /// The endpoint answered with a non-success status.
    #[error("Geolocation endpoint returned HTTP {0}")]
    Status(u16),

    /// The body was not the expected JSON object.
    #[error("Geolocation response could not be decoded: {0}")]
    Decode(String),

    /// A required field was missing or empty.
    #[error("Geolocation response missing field `{0}`")]
    MissingField(&'static str),
}

/// Error types for loading the geographic dataset.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// Fetching a remote dataset failed.
    #[error("Atlas fetch failed: {0}")]
    Fetch(#[from] ReqwestError),

    /// The remote dataset answered with a non-success status.
    #[error("Atlas endpoint returned HTTP {0}")]
    Status(u16),

    /// Reading a local dataset failed.
    #[error("Atlas read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset is not valid TopoJSON.
    #[error("Atlas parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    /// The requested geometry collection does not exist.
    #[error("Atlas has no object named `{0}`")]
    MissingObject(String),

    /// A geometry references an arc index outside the topology.
    #[error("Atlas geometry references unknown arc {0}")]
    InvalidArc(i64),
}
