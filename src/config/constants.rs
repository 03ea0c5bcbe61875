//! Configuration constants.
//!
//! This module defines the thresholds, endpoints, storage keys and map styling
//! used throughout the widget.

use std::time::Duration;

// Visibility thresholds
/// Minimum number of distinct countries before the map is revealed
pub const COUNTRY_THRESHOLD: usize = 5;
/// Minimum total visits across all countries before the map is revealed
pub const VISIT_THRESHOLD: u64 = 20;

// External collaborators
/// IP geolocation endpoint queried once per page load.
///
/// Expected to answer `{"country_code": "..", "country_name": "..", ...}`.
pub const DEFAULT_GEOLOCATION_URL: &str = "https://ipapi.co/json/";
/// World topology (TopoJSON) used to build the map regions.
pub const DEFAULT_ATLAS_SOURCE: &str =
    "https://cdn.jsdelivr.net/npm/world-atlas@2/countries-110m.json";
/// Name of the geometry collection inside the topology's `objects`.
pub const DEFAULT_ATLAS_OBJECT: &str = "countries";
/// HTTP timeout in seconds for the geolocation and atlas requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// JSON file backing the visit store
pub const DEFAULT_STORAGE_PATH: &str = "./visitor_map.json";
/// User-Agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("visitor_map/", env!("CARGO_PKG_VERSION"));

// Storage keys
/// Consolidated country-code -> record mapping
pub const VISITOR_MAP_KEY: &str = "visitorMap";
/// Session ids already counted (only used with session deduplication)
pub const SESSIONS_KEY: &str = "visitorMapSessions";
/// Oldest session ids are forgotten beyond this many
pub const MAX_TRACKED_SESSIONS: usize = 1000;
/// Legacy count-bearing map (`{code: {name, count}}`), migrated on first read
pub const LEGACY_VISITOR_DATA_KEY: &str = "visitorData";
/// Legacy membership set (`{code: true}`), migrated on first read
pub const LEGACY_VISITED_COUNTRIES_KEY: &str = "visitedCountries";

// Preview
/// How long a manual preview keeps the map visible
pub const PREVIEW_DURATION: Duration = Duration::from_secs(10);
/// Duration of the one-shot fade-in cue played on reveal
pub const REVEAL_FADE_IN: Duration = Duration::from_secs(1);

// Debug trigger
/// Key sequence that seeds the debug preset (case-insensitive)
pub const DEBUG_SEQUENCE: &str = "mdmd";

// Map styling
/// Background behind all regions
pub const OCEAN_FILL: &str = "#283445";
/// Fill of a region without visits
pub const DEFAULT_FILL: &str = "#3e5065";
/// Border of a region without visits
pub const DEFAULT_STROKE: &str = "#4c5f75";
/// Border width of a region without visits
pub const DEFAULT_STROKE_WIDTH: f64 = 0.3;
/// Fill of a visited region
pub const VISITED_FILL: &str = "#7de2ff";
/// Border of a visited region
pub const VISITED_STROKE: &str = "#a0f0ff";
/// Border width of a visited region
pub const VISITED_STROKE_WIDTH: f64 = 0.7;
/// Fill of the home country
pub const HOME_FILL: &str = "#98f7ff";
/// Border of the home country
pub const HOME_STROKE: &str = "#c4faff";
/// Border width of the home country
pub const HOME_STROKE_WIDTH: f64 = 1.0;
/// Default SVG viewport width
pub const DEFAULT_MAP_WIDTH: u32 = 800;
/// Default SVG viewport height, matching the compact widget
pub const DEFAULT_MAP_HEIGHT: u32 = 200;
