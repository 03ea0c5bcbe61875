//! Visitor map renderer.
//!
//! Holds the map's regions and a two-state visibility machine:
//!
//! - **Hidden** (initial)
//! - **Visible**, reached when the visibility policy is satisfied or while a
//!   manual preview is running
//!
//! The renderer never persists anything. Region styling and tooltip text are
//! derived from whatever [`VisitRecords`] it is handed, and the visible state
//! follows the [`VisibilityState`] it is synced with.

mod projection;
mod svg;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, info};
use strum_macros::Display;

use crate::atlas::GeographicRegion;
use crate::config::{
    DEFAULT_FILL, DEFAULT_STROKE, DEFAULT_STROKE_WIDTH, HOME_FILL, HOME_STROKE, HOME_STROKE_WIDTH,
    REVEAL_FADE_IN, VISITED_FILL, VISITED_STROKE, VISITED_STROKE_WIDTH,
};
use crate::country::{country_name, normalize_code};
use crate::policy::VisibilityState;
use crate::storage::VisitRecords;

pub use svg::render_svg;

/// Visibility of the map container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MapState {
    /// Container hidden (initial)
    #[default]
    Hidden,
    /// Container shown
    Visible,
}

/// Styling class of a rendered region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RegionStyle {
    /// No recorded visits
    Default,
    /// At least one recorded visit
    Visited,
    /// The configured home country
    Home,
}

impl RegionStyle {
    /// Fill color.
    pub fn fill(&self) -> &'static str {
        match self {
            RegionStyle::Default => DEFAULT_FILL,
            RegionStyle::Visited => VISITED_FILL,
            RegionStyle::Home => HOME_FILL,
        }
    }

    /// Border color.
    pub fn stroke(&self) -> &'static str {
        match self {
            RegionStyle::Default => DEFAULT_STROKE,
            RegionStyle::Visited => VISITED_STROKE,
            RegionStyle::Home => HOME_STROKE,
        }
    }

    /// Border width.
    pub fn stroke_width(&self) -> f64 {
        match self {
            RegionStyle::Default => DEFAULT_STROKE_WIDTH,
            RegionStyle::Visited => VISITED_STROKE_WIDTH,
            RegionStyle::Home => HOME_STROKE_WIDTH,
        }
    }
}

/// A region as drawn: dataset geometry plus its canonical code and style.
#[derive(Debug, Clone)]
pub struct RenderedRegion {
    /// Geometry and names from the dataset
    pub region: GeographicRegion,
    /// Canonical code of the region's id
    pub code: String,
    /// Current styling class
    pub style: RegionStyle,
}

/// Side effects of state transitions, drained by the embedding page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    /// Hidden -> Visible, with the one-shot fade-in to play
    Revealed {
        /// Length of the fade-in
        fade_in: Duration,
    },
    /// Visible -> Hidden
    Hidden,
    /// A manual preview began
    PreviewStarted {
        /// How long the preview lasts
        duration: Duration,
    },
    /// A manual preview expired
    PreviewEnded,
}

/// Map regions, their styles and the visibility state machine.
#[derive(Debug, Default)]
pub struct MapRenderer {
    regions: Vec<RenderedRegion>,
    /// Raw region id and canonical code -> position in `regions`
    index: HashMap<String, usize>,
    state: MapState,
    policy_visible: bool,
    /// Start and length of the running preview
    preview: Option<(Instant, Duration)>,
    tooltip: Option<String>,
    home_code: Option<String>,
    events: Vec<RenderEvent>,
}

impl MapRenderer {
    /// Hidden renderer without regions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlights one country (any code scheme) with the home style.
    pub fn with_home_country(mut self, code: &str) -> Self {
        let code = normalize_code(code);
        self.home_code = (!code.is_empty()).then_some(code);
        self
    }

    /// Builds one rendered region per dataset region, replacing any previous set.
    pub fn initialize(&mut self, regions: Vec<GeographicRegion>) {
        self.index.clear();
        self.regions = regions
            .into_iter()
            .enumerate()
            .map(|(position, region)| {
                let code = normalize_code(&region.region_id);
                self.index.entry(region.region_id.clone()).or_insert(position);
                self.index.entry(code.clone()).or_insert(position);
                RenderedRegion {
                    region,
                    code,
                    style: RegionStyle::Default,
                }
            })
            .collect();
        debug!("Map initialized with {} regions", self.regions.len());
    }

    /// Regions in dataset order.
    pub fn regions(&self) -> &[RenderedRegion] {
        &self.regions
    }

    /// Region by dataset id or by any code scheme of its country.
    pub fn region(&self, region_id: &str) -> Option<&RenderedRegion> {
        self.index
            .get(region_id)
            .or_else(|| self.index.get(&normalize_code(region_id)))
            .map(|&i| &self.regions[i])
    }

    /// Marks regions with recorded visits; all others return to default.
    pub fn apply_store(&mut self, records: &VisitRecords) {
        let home = self.home_code.as_deref();
        for rendered in &mut self.regions {
            rendered.style = if home == Some(rendered.code.as_str()) {
                RegionStyle::Home
            } else if records.contains(&rendered.code) {
                RegionStyle::Visited
            } else {
                RegionStyle::Default
            };
        }
    }

    /// Tooltip text for a region, shown until [`MapRenderer::on_leave`].
    ///
    /// The name comes from the dataset, then the visit record, then the
    /// country table, then a `Country {id}` placeholder; an unmatched
    /// region reports zero visits.
    pub fn on_hover(&mut self, region_id: &str, records: &VisitRecords) -> &str {
        let text = self.tooltip_text(region_id, records);
        self.tooltip.insert(text).as_str()
    }

    /// Tooltip text for a region without showing it.
    pub fn tooltip_text(&self, region_id: &str, records: &VisitRecords) -> String {
        let rendered = self.region(region_id);
        let code = rendered
            .map(|r| r.code.clone())
            .unwrap_or_else(|| normalize_code(region_id));
        let record = records.get(&code);

        let name = rendered
            .map(|r| r.region.display_name.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| record.map(|r| r.name.clone()))
            .or_else(|| country_name(&code).map(str::to_string))
            .unwrap_or_else(|| format!("Country {region_id}"));

        if record.is_none() && rendered.is_none() {
            debug!("Unknown country code: {region_id}");
        }

        let count = record.map_or(0, |r| r.count);
        format!("{name}: {count} visit{}", if count == 1 { "" } else { "s" })
    }

    /// Hides the tooltip.
    pub fn on_leave(&mut self) {
        self.tooltip = None;
    }

    /// Tooltip currently shown, if any.
    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    /// Current visibility state.
    pub fn state(&self) -> MapState {
        self.state
    }

    /// Whether the map is shown.
    pub fn is_visible(&self) -> bool {
        self.state == MapState::Visible
    }

    /// Whether a manual preview is running.
    pub fn is_previewing(&self) -> bool {
        self.preview.is_some()
    }

    /// Hidden -> Visible. Returns `false` (and emits nothing) if already visible.
    pub fn reveal(&mut self) -> bool {
        if self.state == MapState::Visible {
            return false;
        }
        self.state = MapState::Visible;
        self.events.push(RenderEvent::Revealed {
            fade_in: REVEAL_FADE_IN,
        });
        info!("Map revealed");
        true
    }

    /// Visible -> Hidden. Returns `false` (and emits nothing) if already hidden.
    pub fn hide(&mut self) -> bool {
        if self.state == MapState::Hidden {
            return false;
        }
        self.state = MapState::Hidden;
        self.tooltip = None;
        self.events.push(RenderEvent::Hidden);
        true
    }

    /// Follows the policy outcome unless a preview is overriding it.
    pub fn sync_with(&mut self, visibility: &VisibilityState) {
        self.policy_visible = visibility.is_map_visible;
        if self.preview.is_none() {
            self.apply_policy_state();
        }
    }

    /// Forces the map visible for `duration` from `now`, then
    /// [`MapRenderer::tick`] reverts it to the policy state.
    ///
    /// Any duration is accepted; one too long to represent as a deadline
    /// simply never expires.
    pub fn start_preview(&mut self, duration: Duration, now: Instant) {
        self.preview = Some((now, duration));
        self.events.push(RenderEvent::PreviewStarted { duration });
        info!("Map preview activated");
        self.reveal();
    }

    /// Ends an expired preview. Returns `true` if one ended.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.preview {
            Some((started, duration)) if now.saturating_duration_since(started) >= duration => {
                self.preview = None;
                self.events.push(RenderEvent::PreviewEnded);
                info!("Map preview ended");
                self.apply_policy_state();
                true
            }
            _ => false,
        }
    }

    /// Shows the map for `duration` regardless of policy, then reverts.
    pub async fn preview_temporarily(&mut self, duration: Duration) {
        self.start_preview(duration, Instant::now());
        tokio::time::sleep(duration).await;
        self.tick(Instant::now());
    }

    /// Transition side effects since the last call.
    ///
    /// Events queue up until drained, so a long-lived renderer should call
    /// this after every batch of transitions.
    pub fn take_events(&mut self) -> Vec<RenderEvent> {
        std::mem::take(&mut self.events)
    }

    fn apply_policy_state(&mut self) {
        if self.policy_visible {
            self.reveal();
        } else {
            self.hide();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::VisibilityPolicy;

    fn region(id: &str, name: &str) -> GeographicRegion {
        GeographicRegion {
            region_id: id.to_string(),
            display_name: name.to_string(),
            polygons: Vec::new(),
        }
    }

    fn world() -> MapRenderer {
        let mut renderer = MapRenderer::new();
        renderer.initialize(vec![
            region("250", "France"),
            region("056", "Belgium"),
            region("840", ""),
            region("Kosovo", "Kosovo"),
        ]);
        renderer
    }

    fn visible_state() -> VisibilityState {
        VisibilityState {
            distinct_countries: 5,
            total_visits: 20,
            is_map_visible: true,
        }
    }

    fn hidden_state() -> VisibilityState {
        VisibilityState {
            distinct_countries: 1,
            total_visits: 1,
            is_map_visible: false,
        }
    }

    #[test]
    fn test_starts_hidden() {
        let renderer = MapRenderer::new();
        assert_eq!(renderer.state(), MapState::Hidden);
        assert!(renderer.tooltip().is_none());
    }

    #[test]
    fn test_reveal_is_idempotent() {
        let mut renderer = world();
        assert!(renderer.reveal());
        assert!(!renderer.reveal());
        assert_eq!(renderer.state(), MapState::Visible);
        assert_eq!(
            renderer.take_events(),
            vec![RenderEvent::Revealed {
                fade_in: REVEAL_FADE_IN
            }]
        );
    }

    #[test]
    fn test_hide_is_idempotent() {
        let mut renderer = world();
        assert!(!renderer.hide());
        renderer.reveal();
        renderer.take_events();
        assert!(renderer.hide());
        assert!(!renderer.hide());
        assert_eq!(renderer.take_events(), vec![RenderEvent::Hidden]);
    }

    #[test]
    fn test_apply_store_matches_across_schemes() {
        let mut renderer = world();
        let records: VisitRecords = [("FR", "France", 2), ("USA", "United States", 1)]
            .into_iter()
            .collect();
        renderer.apply_store(&records);

        assert_eq!(renderer.region("250").unwrap().style, RegionStyle::Visited);
        assert_eq!(renderer.region("US").unwrap().style, RegionStyle::Visited);
        assert_eq!(renderer.region("BEL").unwrap().style, RegionStyle::Default);
        assert_eq!(renderer.region("Kosovo").unwrap().style, RegionStyle::Default);
    }

    #[test]
    fn test_home_country_style_wins() {
        let mut renderer = world().with_home_country("BE");
        let records: VisitRecords = [("BE", "Belgium", 1)].into_iter().collect();
        renderer.apply_store(&records);
        assert_eq!(renderer.region("056").unwrap().style, RegionStyle::Home);
        assert_eq!(RegionStyle::Home.fill(), "#98f7ff");
    }

    #[test]
    fn test_hover_visited_region() {
        let mut renderer = world();
        let records: VisitRecords = [("BE", "Belgium", 1), ("FR", "France", 3)]
            .into_iter()
            .collect();

        assert_eq!(renderer.on_hover("056", &records), "Belgium: 1 visit");
        assert_eq!(renderer.on_hover("250", &records), "France: 3 visits");
        assert_eq!(renderer.tooltip(), Some("France: 3 visits"));
        renderer.on_leave();
        assert!(renderer.tooltip().is_none());
    }

    #[test]
    fn test_hover_name_fallbacks() {
        let mut renderer = world();
        let records: VisitRecords = [("US", "USA (recorded)", 4)].into_iter().collect();
        // Dataset has no name for 840, so the record's name is used
        assert_eq!(renderer.on_hover("840", &records), "USA (recorded): 4 visits");

        let empty = VisitRecords::new();
        assert_eq!(renderer.on_hover("840", &empty), "United States: 0 visits");
    }

    #[test]
    fn test_hover_unknown_region() {
        let mut renderer = world();
        let records = VisitRecords::new();
        assert_eq!(renderer.on_hover("999", &records), "Country 999: 0 visits");
        assert_eq!(renderer.on_hover("", &records), "Country : 0 visits");
    }

    #[test]
    fn test_sync_follows_policy() {
        let mut renderer = world();
        let policy = VisibilityPolicy::default();
        renderer.sync_with(&policy.evaluate(&VisitRecords::new()));
        assert!(!renderer.is_visible());

        renderer.sync_with(&visible_state());
        assert!(renderer.is_visible());

        // Only a reset drives the policy back to hidden
        renderer.sync_with(&hidden_state());
        assert!(!renderer.is_visible());
    }

    #[test]
    fn test_preview_reverts_to_hidden() {
        let mut renderer = world();
        renderer.sync_with(&hidden_state());
        let start = Instant::now();

        renderer.start_preview(Duration::from_secs(10), start);
        assert!(renderer.is_visible());
        assert!(renderer.is_previewing());

        // Policy changes during preview are remembered, not applied
        renderer.sync_with(&hidden_state());
        assert!(renderer.is_visible());

        assert!(!renderer.tick(start + Duration::from_secs(9)));
        assert!(renderer.is_visible());
        assert!(renderer.tick(start + Duration::from_secs(10)));
        assert!(!renderer.is_visible());
        assert!(!renderer.is_previewing());

        assert_eq!(
            renderer.take_events(),
            vec![
                RenderEvent::PreviewStarted {
                    duration: Duration::from_secs(10)
                },
                RenderEvent::Revealed {
                    fade_in: REVEAL_FADE_IN
                },
                RenderEvent::PreviewEnded,
                RenderEvent::Hidden,
            ]
        );
    }

    #[test]
    fn test_preview_keeps_visible_map_visible() {
        let mut renderer = world();
        renderer.sync_with(&visible_state());
        renderer.take_events();
        let start = Instant::now();

        renderer.start_preview(Duration::from_millis(50), start);
        renderer.tick(start + Duration::from_millis(50));

        assert!(renderer.is_visible());
        assert_eq!(
            renderer.take_events(),
            vec![
                RenderEvent::PreviewStarted {
                    duration: Duration::from_millis(50)
                },
                RenderEvent::PreviewEnded,
            ]
        );
    }

    #[test]
    fn test_unbounded_preview_never_expires() {
        let mut renderer = world();
        let start = Instant::now();
        renderer.start_preview(Duration::MAX, start);
        assert!(renderer.is_visible());
        assert!(!renderer.tick(start + Duration::from_secs(365 * 24 * 3600)));
        assert!(renderer.is_previewing());
    }

    #[tokio::test]
    async fn test_preview_temporarily_ends_by_itself() {
        let mut renderer = world();
        renderer.preview_temporarily(Duration::from_millis(20)).await;
        assert!(!renderer.is_visible());
        assert!(!renderer.is_previewing());
    }
}
