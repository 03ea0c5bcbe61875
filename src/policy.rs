//! Map visibility rule.
//!
//! The map is revealed once visits have come from enough distinct countries
//! *and* enough visits have accumulated overall. Both metrics only grow as
//! visits are recorded, so once the map is visible it stays visible until the
//! store is reset.

use log::info;

use crate::config::{Config, COUNTRY_THRESHOLD, VISIT_THRESHOLD};
use crate::storage::VisitRecords;

/// Two independent thresholds that must both be met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityPolicy {
    /// Minimum distinct countries
    pub country_threshold: usize,
    /// Minimum total visits
    pub visit_threshold: u64,
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self {
            country_threshold: COUNTRY_THRESHOLD,
            visit_threshold: VISIT_THRESHOLD,
        }
    }
}

/// Derived view of the store; computed on demand, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityState {
    /// Countries with at least one visit
    pub distinct_countries: usize,
    /// Visits across all countries
    pub total_visits: u64,
    /// Both thresholds met
    pub is_map_visible: bool,
}

impl VisibilityPolicy {
    /// Thresholds taken from the config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            country_threshold: config.country_threshold,
            visit_threshold: config.visit_threshold,
        }
    }

    /// Whether the map should be shown for `records`.
    pub fn should_show_map(&self, records: &VisitRecords) -> bool {
        self.evaluate(records).is_map_visible
    }

    /// Both metrics and the resulting visibility.
    pub fn evaluate(&self, records: &VisitRecords) -> VisibilityState {
        let distinct_countries = records.distinct_countries();
        let total_visits = records.total_visits();
        VisibilityState {
            distinct_countries,
            total_visits,
            is_map_visible: distinct_countries >= self.country_threshold
                && total_visits >= self.visit_threshold,
        }
    }

    /// Evaluates and logs progress toward both thresholds.
    pub fn evaluate_logged(&self, records: &VisitRecords) -> VisibilityState {
        let state = self.evaluate(records);
        info!(
            "Countries visited: {}/{} required | Total visits: {}/{} required",
            state.distinct_countries,
            self.country_threshold,
            state.total_visits,
            self.visit_threshold
        );
        state
    }

    /// Multi-line progress summary shown while previewing the map.
    pub fn status_text(&self, state: &VisibilityState) -> String {
        format!(
            "Current Status:\nCountries: {}/{} required\nTotal Visits: {}/{} required",
            state.distinct_countries,
            self.country_threshold,
            state.total_visits,
            self.visit_threshold
        )
    }
}

/// [`VisibilityPolicy::should_show_map`] with the default thresholds.
pub fn should_show_map(records: &VisitRecords) -> bool {
    VisibilityPolicy::default().should_show_map(records)
}
