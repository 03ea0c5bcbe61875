// storage/store.rs
// Typed visit store over a key/value backend

use log::{debug, warn};

use crate::config::{
    LEGACY_VISITED_COUNTRIES_KEY, LEGACY_VISITOR_DATA_KEY, SESSIONS_KEY, VISITOR_MAP_KEY,
};
use crate::country::{country_name, normalize_code};
use crate::error_handling::StorageError;
use crate::storage::backend::KeyValueStorage;
use crate::storage::migration::migrate_legacy_layout;
use crate::storage::models::{VisitRecord, VisitRecords};

/// Single source of truth for per-country visit counts.
///
/// All records live under one storage key, so every mutation is one
/// read-modify-write of that key followed by a single `set_item`. A failed
/// write leaves the previous value untouched.
///
/// The read-modify-write is not guarded against a second writer sharing the
/// same backend (two processes on one file); the last writer wins.
///
/// The `try_*` methods report storage failures; their plain counterparts log
/// the failure and degrade to a no-op, which is what the widget uses.
#[derive(Debug)]
pub struct VisitRecordStore<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> VisitRecordStore<S> {
    /// Wraps a backend, migrating a legacy two-key layout if one is found.
    pub fn open(mut storage: S) -> Self {
        if let Err(e) = migrate_legacy_layout(&mut storage) {
            warn!("Legacy visitor data could not be migrated: {e}");
        }
        Self { storage }
    }

    /// Underlying backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub(crate) fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Releases the backend.
    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Current records, or why they could not be read.
    pub fn try_get_all(&self) -> Result<VisitRecords, StorageError> {
        let Some(raw) = self.storage.get_item(VISITOR_MAP_KEY)? else {
            return Ok(VisitRecords::new());
        };
        let mut records: VisitRecords = serde_json::from_str(&raw)?;
        let dropped = records.retain_valid();
        if dropped > 0 {
            debug!("Ignoring {dropped} stored record(s) with a zero count");
        }
        Ok(records)
    }

    /// Current records; empty when storage is uninitialized or unreadable.
    pub fn get_all(&self) -> VisitRecords {
        self.try_get_all().unwrap_or_else(|e| {
            warn!("Visitor data unavailable: {e}");
            VisitRecords::new()
        })
    }

    /// Adds one visit for `code` (any scheme), creating the record if needed.
    ///
    /// An empty `name` falls back to the country table, then to the code.
    pub fn try_record_visit(&mut self, code: &str, name: &str) -> Result<VisitRecord, StorageError> {
        let canonical = normalize_code(code);
        if canonical.is_empty() {
            return Err(StorageError::InvalidCode(code.to_string()));
        }
        let name = display_name_for(&canonical, name);

        let mut records = self.try_get_all()?;
        let record = records.increment(canonical, name).clone();
        self.write(&records)?;
        Ok(record)
    }

    /// [`VisitRecordStore::try_record_visit`], logging failures.
    ///
    /// Returns the updated record, or `None` if nothing was written.
    pub fn record_visit(&mut self, code: &str, name: &str) -> Option<VisitRecord> {
        match self.try_record_visit(code, name) {
            Ok(record) => {
                debug!("Recorded visit from {code}: {} total", record.count);
                Some(record)
            }
            Err(e) => {
                warn!("Visit from {code:?} not recorded: {e}");
                None
            }
        }
    }

    /// Sets explicit counts for the given countries, leaving others untouched.
    pub fn try_seed<'a, I>(&mut self, seed: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = (&'a str, &'a str, u64)>,
    {
        let mut records = self.try_get_all()?;
        for (code, name, count) in seed {
            let canonical = normalize_code(code);
            if canonical.is_empty() {
                return Err(StorageError::InvalidCode(code.to_string()));
            }
            let name = display_name_for(&canonical, name);
            records.set(canonical, name, count);
        }
        self.write(&records)
    }

    /// [`VisitRecordStore::try_seed`], logging failures. Returns `true` on success.
    pub fn seed<'a, I>(&mut self, seed: I) -> bool
    where
        I: IntoIterator<Item = (&'a str, &'a str, u64)>,
    {
        match self.try_seed(seed) {
            Ok(()) => true,
            Err(e) => {
                warn!("Visitor data not seeded: {e}");
                false
            }
        }
    }

    /// Clears all visit data, including any legacy keys and counted sessions.
    ///
    /// Never called implicitly; accumulated visits survive page loads.
    pub fn try_reset(&mut self) -> Result<(), StorageError> {
        for key in [
            VISITOR_MAP_KEY,
            LEGACY_VISITOR_DATA_KEY,
            LEGACY_VISITED_COUNTRIES_KEY,
            SESSIONS_KEY,
        ] {
            self.storage.remove_item(key)?;
        }
        Ok(())
    }

    /// [`VisitRecordStore::try_reset`], logging failures. Returns `true` on success.
    pub fn reset(&mut self) -> bool {
        match self.try_reset() {
            Ok(()) => true,
            Err(e) => {
                warn!("Visitor data not reset: {e}");
                false
            }
        }
    }

    fn write(&mut self, records: &VisitRecords) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(records)?;
        self.storage.set_item(VISITOR_MAP_KEY, &serialized)
    }
}

fn display_name_for(canonical: &str, provided: &str) -> String {
    let provided = provided.trim();
    if !provided.is_empty() {
        return provided.to_string();
    }
    country_name(canonical)
        .map(str::to_string)
        .unwrap_or_else(|| canonical.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::policy::should_show_map;
    use crate::storage::backend::{FileStorage, MemoryStorage};
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn memory_store() -> VisitRecordStore<MemoryStorage> {
        VisitRecordStore::open(MemoryStorage::new())
    }

    #[test]
    fn test_first_visit_roundtrip() {
        let mut store = memory_store();
        store.record_visit("FR", "France");

        let expected: VisitRecords = [("FR", "France", 1)].into_iter().collect();
        assert_eq!(store.get_all(), expected);
    }

    // Mixed code schemes, casing and unknown codes for the same few countries
    const MIXED_CODES: &[&str] = &[
        "US", "USA", "840", "us", "FR", "fr", "FRA", "250", "DE", "JP", "BE", "BEL", "056", "XK",
        "zz",
    ];

    proptest! {
        #[test]
        fn test_totals_match_call_sequence(
            codes in prop::collection::vec(prop::sample::select(MIXED_CODES), 0..80)
        ) {
            let mut store = memory_store();
            let mut was_visible = false;

            for (calls, code) in codes.iter().enumerate() {
                prop_assert!(store.record_visit(code, "").is_some());

                let records = store.get_all();
                prop_assert_eq!(records.total_visits(), calls as u64 + 1);
                let visible = should_show_map(&records);
                prop_assert!(visible >= was_visible, "map hid again after {:?}", code);
                was_visible = visible;
            }

            let unique: HashSet<String> = codes.iter().map(|c| normalize_code(c)).collect();
            let records = store.get_all();
            prop_assert_eq!(records.distinct_countries(), unique.len());
            prop_assert_eq!(records.total_visits(), codes.len() as u64);
        }
    }

    #[test]
    fn test_empty_name_falls_back() {
        let mut store = memory_store();
        assert_eq!(store.record_visit("BEL", "").unwrap().name, "Belgium");
        assert_eq!(store.record_visit("XK", " ").unwrap().name, "XK");
    }

    #[test]
    fn test_empty_code_rejected() {
        let mut store = memory_store();
        assert!(matches!(
            store.try_record_visit("  ", "Nowhere"),
            Err(StorageError::InvalidCode(_))
        ));
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn test_disabled_storage_degrades_silently() {
        let mut store = VisitRecordStore::open(MemoryStorage::disabled());
        assert!(store.record_visit("FR", "France").is_none());
        assert!(store.get_all().is_empty());
        assert!(!store.seed([("US", "United States", 3)]));
        assert!(!store.reset());
    }

    #[test]
    fn test_quota_exceeded_keeps_previous_state() {
        let mut store = VisitRecordStore::open(MemoryStorage::with_quota(60));
        store.record_visit("FR", "France");
        assert!(store
            .record_visit("GB", "United Kingdom of Great Britain and Northern Ireland")
            .is_none());

        let records = store.get_all();
        assert_eq!(records.distinct_countries(), 1);
        assert_eq!(records.total_visits(), 1);
    }

    #[test]
    fn test_seed_overwrites_listed_codes_only() {
        let mut store = memory_store();
        store.record_visit("NL", "Netherlands");
        store.record_visit("US", "United States");

        assert!(store.seed([("US", "United States", 6), ("FR", "France", 4)]));

        let records = store.get_all();
        assert_eq!(records.get("NL").unwrap().count, 1);
        assert_eq!(records.get("US").unwrap().count, 6);
        assert_eq!(records.get("FR").unwrap().count, 4);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = memory_store();
        store.record_visit("FR", "France");
        store
            .storage_mut()
            .set_item(SESSIONS_KEY, r#"["abc"]"#)
            .unwrap();

        assert!(store.reset());
        assert!(store.get_all().is_empty());
        assert_eq!(store.storage().get_item(SESSIONS_KEY).unwrap(), None);
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("visits.json");

        let mut store = VisitRecordStore::open(FileStorage::new(&path));
        store.record_visit("DE", "Germany");
        drop(store);

        let mut reopened = VisitRecordStore::open(FileStorage::new(&path));
        assert_eq!(reopened.record_visit("DE", "Germany").unwrap().count, 2);
    }

    #[test]
    fn test_open_migrates_legacy_layout() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(
                LEGACY_VISITOR_DATA_KEY,
                r#"{"BE":{"name":"Belgium","count":1},"BEL":{"name":"Belgium","count":1}}"#,
            )
            .unwrap();
        storage
            .set_item(LEGACY_VISITED_COUNTRIES_KEY, r#"{"BE":true,"BEL":true}"#)
            .unwrap();

        let store = VisitRecordStore::open(storage);
        let records = store.get_all();
        assert_eq!(records.distinct_countries(), 1);
        assert_eq!(records.get("056").unwrap().count, 1);
    }
}
