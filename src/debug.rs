//! Hidden key-sequence trigger that seeds synthetic visits.
//!
//! Typing `m d m d` (case-insensitive) seeds the store with a preset that
//! crosses both visibility thresholds, then re-runs the evaluate/render path.
//! Keys other than the two sequence letters are ignored, so the trigger
//! always takes at least four deliberate presses.

use std::collections::VecDeque;

use log::info;

use crate::config::DEBUG_SEQUENCE;
use crate::policy::{VisibilityPolicy, VisibilityState};
use crate::render::MapRenderer;
use crate::storage::{KeyValueStorage, VisitRecordStore};

/// Preset written on activation: 6 countries, 21 visits.
pub const DEBUG_SEED: &[(&str, &str, u64)] = &[
    ("US", "United States", 6),
    ("FR", "France", 4),
    ("DE", "Germany", 5),
    ("GB", "United Kingdom", 3),
    ("CA", "Canada", 2),
    ("IT", "Italy", 1),
];

/// Larger showcase data set.
pub const DEMO_SEED: &[(&str, &str, u64)] = &[
    ("US", "United States", 42),
    ("GB", "United Kingdom", 28),
    ("FR", "France", 21),
    ("DE", "Germany", 18),
    ("CA", "Canada", 16),
    ("AU", "Australia", 14),
    ("JP", "Japan", 11),
    ("IN", "India", 9),
    ("BR", "Brazil", 8),
    ("CN", "China", 7),
    ("RU", "Russia", 5),
    ("ZA", "South Africa", 4),
    ("MX", "Mexico", 3),
    ("IT", "Italy", 6),
    ("ES", "Spain", 5),
];

/// Watches key presses for the debug sequence.
#[derive(Debug)]
pub struct DebugController {
    sequence: Vec<char>,
    recent: VecDeque<char>,
}

impl Default for DebugController {
    fn default() -> Self {
        Self::new(DEBUG_SEQUENCE)
    }
}

impl DebugController {
    /// Controller for a custom sequence; only its letters are tracked.
    pub fn new(sequence: &str) -> Self {
        let sequence: Vec<char> = sequence.chars().map(|c| c.to_ascii_lowercase()).collect();
        Self {
            recent: VecDeque::with_capacity(sequence.len()),
            sequence,
        }
    }

    /// Registers a key press. Returns `true` when it completes the sequence.
    pub fn press(&mut self, key: char) -> bool {
        let key = key.to_ascii_lowercase();
        if self.sequence.is_empty() || !self.sequence.contains(&key) {
            return false;
        }
        if self.recent.len() == self.sequence.len() {
            self.recent.pop_front();
        }
        self.recent.push_back(key);

        if self.recent.iter().eq(self.sequence.iter()) {
            self.recent.clear();
            true
        } else {
            false
        }
    }

    /// Seeds the preset and pushes the new state into the renderer.
    pub fn activate<S: KeyValueStorage>(
        &self,
        store: &mut VisitRecordStore<S>,
        policy: &VisibilityPolicy,
        renderer: &mut MapRenderer,
    ) -> VisibilityState {
        info!("Debug mode activated");
        store.seed(DEBUG_SEED.iter().copied());
        let records = store.get_all();
        let state = policy.evaluate_logged(&records);
        renderer.apply_store(&records);
        renderer.sync_with(&state);
        state
    }

    /// Feeds a key and activates on a completed sequence.
    pub fn handle_key<S: KeyValueStorage>(
        &mut self,
        key: char,
        store: &mut VisitRecordStore<S>,
        policy: &VisibilityPolicy,
        renderer: &mut MapRenderer,
    ) -> Option<VisibilityState> {
        self.press(key)
            .then(|| self.activate(store, policy, renderer))
    }
}
