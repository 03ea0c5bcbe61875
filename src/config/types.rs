//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::config::constants::{
    COUNTRY_THRESHOLD, DEFAULT_ATLAS_OBJECT, DEFAULT_ATLAS_SOURCE, DEFAULT_GEOLOCATION_URL,
    DEFAULT_STORAGE_PATH, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, VISIT_THRESHOLD,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// How repeated page loads from the same session are counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DedupMode {
    /// Every page load counts as a visit (reloads re-inflate counts)
    None,
    /// A session id is counted at most once
    Session,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use visitor_map::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     storage_path: PathBuf::from("visits.json"),
///     country_threshold: 3,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON file backing the key/value storage
    pub storage_path: PathBuf,

    /// IP geolocation endpoint
    pub geolocation_url: String,

    /// TopoJSON world atlas, URL or local path
    pub atlas_source: String,

    /// Geometry collection name inside the atlas `objects`
    pub atlas_object: String,

    /// Minimum distinct countries before the map is shown
    pub country_threshold: usize,

    /// Minimum total visits before the map is shown
    pub visit_threshold: u64,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Visit deduplication mode
    pub dedup: DedupMode,

    /// Session identifier used when `dedup` is `Session`
    pub session_id: Option<String>,

    /// Country highlighted with the home style (any code scheme)
    pub home_country: Option<String>,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            geolocation_url: DEFAULT_GEOLOCATION_URL.to_string(),
            atlas_source: DEFAULT_ATLAS_SOURCE.to_string(),
            atlas_object: DEFAULT_ATLAS_OBJECT.to_string(),
            country_threshold: COUNTRY_THRESHOLD,
            visit_threshold: VISIT_THRESHOLD,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            dedup: DedupMode::None,
            session_id: None,
            home_country: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_log_format_debug() {
        assert_eq!(format!("{:?}", LogFormat::Plain), "Plain");
        assert_eq!(format!("{:?}", LogFormat::Json), "Json");
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.country_threshold, 5);
        assert_eq!(config.visit_threshold, 20);
        assert_eq!(config.timeout_seconds, 10);
        assert_eq!(config.dedup, DedupMode::None);
        assert!(config.session_id.is_none());
        assert!(config.home_country.is_none());
        assert_eq!(config.storage_path, PathBuf::from("./visitor_map.json"));
        assert_eq!(config.geolocation_url, "https://ipapi.co/json/");
        assert_eq!(config.atlas_object, "countries");
    }

    #[test]
    fn test_user_agent_names_crate() {
        let config = Config::default();
        assert!(config.user_agent.starts_with("visitor_map/"));
    }
}
