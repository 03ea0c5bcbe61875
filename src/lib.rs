//! visitor_map library: the visitor world map widget
//!
//! This library accumulates per-country visit counts in a key/value store,
//! decides when enough distinct countries and visits have been seen to reveal
//! a world map, and renders that map with visited countries highlighted and a
//! hover tooltip per country.
//!
//! # Example
//!
//! ```no_run
//! use visitor_map::{Config, run_page_load};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     storage_path: std::path::PathBuf::from("visits.json"),
//!     ..Default::default()
//! };
//!
//! let report = run_page_load(&config).await?;
//! println!(
//!     "{} countries, {} visits, map {}",
//!     report.state.distinct_countries,
//!     report.state.total_visits,
//!     report.renderer.state()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! The page-load flow and the atlas loader are async and need a Tokio runtime.

#![warn(missing_docs)]

pub mod atlas;
pub mod config;
pub mod country;
pub mod debug;
pub mod error_handling;
pub mod initialization;
pub mod policy;
pub mod recorder;
pub mod render;
/// Visit persistence over key/value storage
pub mod storage;

// Re-export public API
pub use atlas::{load_atlas, regions_from_topojson, GeographicRegion};
pub use config::{Config, DedupMode, LogFormat, LogLevel};
pub use country::normalize_code;
pub use debug::{DebugController, DEBUG_SEED, DEMO_SEED};
pub use policy::{should_show_map, VisibilityPolicy, VisibilityState};
pub use recorder::{RecordOutcome, VisitRecorder};
pub use render::{render_svg, MapRenderer, MapState, RenderEvent};
pub use run::{build_renderer, open_store, run_page_load, PageLoadReport};
pub use storage::{
    FileStorage, KeyValueStorage, MemoryStorage, VisitRecord, VisitRecordStore, VisitRecords,
};

// Page-load orchestration
mod run {
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use log::{info, warn};

    use crate::atlas::load_atlas;
    use crate::config::Config;
    use crate::initialization::init_client;
    use crate::policy::{VisibilityPolicy, VisibilityState};
    use crate::recorder::{RecordOutcome, VisitRecorder};
    use crate::render::{MapRenderer, RenderEvent};
    use crate::storage::{FileStorage, VisitRecordStore, VisitRecords};

    /// Outcome of one page load.
    #[derive(Debug)]
    pub struct PageLoadReport {
        /// What happened to this load's visit
        pub outcome: RecordOutcome,
        /// Store contents after recording
        pub records: VisitRecords,
        /// Policy evaluation over `records`
        pub state: VisibilityState,
        /// Renderer synced with `state`; empty when the atlas failed to load
        pub renderer: MapRenderer,
        /// Transitions made while the page loaded, drained from `renderer`
        pub events: Vec<RenderEvent>,
        /// Whether the atlas loaded
        pub atlas_loaded: bool,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Opens the file-backed visit store named by the config.
    pub fn open_store(config: &Config) -> VisitRecordStore<FileStorage> {
        VisitRecordStore::open(FileStorage::new(config.storage_path.clone()))
    }

    /// Loads the atlas and builds a renderer styled from `records`.
    ///
    /// An atlas failure is logged and leaves the renderer without regions and
    /// hidden, whatever the policy says.
    pub async fn build_renderer(
        config: &Config,
        client: &reqwest::Client,
        records: &VisitRecords,
        state: &VisibilityState,
    ) -> (MapRenderer, bool) {
        let atlas = load_atlas(client, &config.atlas_source, &config.atlas_object).await;
        renderer_for(config, atlas, records, state)
    }

    fn renderer_for(
        config: &Config,
        atlas: Result<Vec<crate::atlas::GeographicRegion>, crate::error_handling::AtlasError>,
        records: &VisitRecords,
        state: &VisibilityState,
    ) -> (MapRenderer, bool) {
        let mut renderer = match config.home_country.as_deref() {
            Some(home) => MapRenderer::new().with_home_country(home),
            None => MapRenderer::new(),
        };
        match atlas {
            Ok(regions) => {
                renderer.initialize(regions);
                renderer.apply_store(records);
                renderer.sync_with(state);
                (renderer, true)
            }
            Err(e) => {
                warn!("Map data unavailable, map stays hidden: {e}");
                (renderer, false)
            }
        }
    }

    /// Runs the page-load flow: record the visitor, evaluate the policy and
    /// prepare the map.
    ///
    /// The geolocation lookup and the atlas fetch run concurrently. Neither
    /// failure is an error here; both only degrade the widget.
    ///
    /// # Errors
    ///
    /// Returns an error only if the HTTP client cannot be built.
    pub async fn run_page_load(config: &Config) -> Result<PageLoadReport> {
        let start_time = std::time::Instant::now();
        let client = init_client(config).context("Failed to initialize HTTP client")?;

        let mut store = open_store(config);
        let recorder = VisitRecorder::from_config(Arc::clone(&client), config);

        let (outcome, atlas) = tokio::join!(
            recorder.record_current_visitor(&mut store),
            load_atlas(&client, &config.atlas_source, &config.atlas_object)
        );

        let records = store.get_all();
        let policy = VisibilityPolicy::from_config(config);
        let state = policy.evaluate_logged(&records);
        let (mut renderer, atlas_loaded) = renderer_for(config, atlas, &records, &state);
        let events = renderer.take_events();

        if renderer.is_visible() {
            info!("Map visible with {} visited countries", state.distinct_countries);
        }

        Ok(PageLoadReport {
            outcome,
            records,
            state,
            renderer,
            events,
            atlas_loaded,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        })
    }
}
