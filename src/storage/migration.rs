// storage/migration.rs
// One-time conversion of the legacy two-key layout into the consolidated key

use std::collections::BTreeMap;

use log::{debug, info};
use serde::Deserialize;

use crate::config::{LEGACY_VISITED_COUNTRIES_KEY, LEGACY_VISITOR_DATA_KEY, VISITOR_MAP_KEY};
use crate::country::{country_name, normalize_code};
use crate::error_handling::StorageError;
use crate::storage::backend::KeyValueStorage;
use crate::storage::models::VisitRecords;

/// Legacy entries were written loosely; missing fields are tolerated here.
#[derive(Debug, Deserialize)]
struct LegacyRecord {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    count: Option<i64>,
}

/// Converts `visitorData` + `visitedCountries` into `visitorMap`.
///
/// The legacy writer stored one visit under several aliases of the same
/// country (`BE` and `BEL`), so aliases collapse onto the canonical code with
/// the largest count instead of being summed. Codes present only in the
/// membership set have no count and are dropped. Returns `true` when a
/// migration was performed.
pub(crate) fn migrate_legacy_layout<S: KeyValueStorage>(
    storage: &mut S,
) -> Result<bool, StorageError> {
    if storage.get_item(VISITOR_MAP_KEY)?.is_some() {
        return Ok(false);
    }

    let legacy_data = storage.get_item(LEGACY_VISITOR_DATA_KEY)?;
    let legacy_visited = storage.get_item(LEGACY_VISITED_COUNTRIES_KEY)?;
    if legacy_data.is_none() && legacy_visited.is_none() {
        return Ok(false);
    }

    let entries: BTreeMap<String, LegacyRecord> = match legacy_data.as_deref() {
        Some(raw) => serde_json::from_str(raw)?,
        None => BTreeMap::new(),
    };

    let mut merged: BTreeMap<String, (String, u64)> = BTreeMap::new();
    for (raw_code, entry) in entries {
        let count = match entry.count {
            Some(count) if count >= 1 => count as u64,
            _ => {
                debug!("Dropping legacy entry {raw_code:?} without a positive count");
                continue;
            }
        };
        let code = normalize_code(&raw_code);
        if code.is_empty() {
            continue;
        }
        let name = entry
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| country_name(&code).map(str::to_string))
            .unwrap_or_else(|| code.clone());
        merged
            .entry(code)
            .and_modify(|(_, existing)| *existing = (*existing).max(count))
            .or_insert((name, count));
    }

    if let Some(raw) = legacy_visited.as_deref() {
        let visited: BTreeMap<String, serde_json::Value> = serde_json::from_str(raw)?;
        let orphans = visited
            .keys()
            .filter(|code| !merged.contains_key(&normalize_code(code)))
            .count();
        if orphans > 0 {
            debug!("Dropping {orphans} legacy visited code(s) without visit counts");
        }
    }

    let records: VisitRecords = merged
        .into_iter()
        .map(|(code, (name, count))| (code, name, count))
        .collect();
    storage.set_item(VISITOR_MAP_KEY, &serde_json::to_string(&records)?)?;
    storage.remove_item(LEGACY_VISITOR_DATA_KEY)?;
    storage.remove_item(LEGACY_VISITED_COUNTRIES_KEY)?;

    info!(
        "Migrated legacy visitor data: {} countries, {} visits",
        records.distinct_countries(),
        records.total_visits()
    );
    Ok(true)
}
