// storage/models.rs
// Visit record types

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::country::normalize_code;

/// Visits recorded for one country.
///
/// Persisted as `{"name": "...", "count": n}` under the country's canonical
/// code. A record only exists once at least one visit has been recorded, so
/// `count` is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    /// Display name captured on the first visit
    pub name: String,
    /// Visits so far, never zero
    pub count: u64,
}

/// Mapping from canonical country code to its [`VisitRecord`].
///
/// Membership ("has this country visited?") is simply key presence; there is
/// no separate visited set to keep in sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitRecords(BTreeMap<String, VisitRecord>);

impl VisitRecords {
    /// Empty record set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for a code in any scheme (`"FR"`, `"FRA"`, `"250"`).
    pub fn get(&self, code: &str) -> Option<&VisitRecord> {
        self.0.get(&normalize_code(code))
    }

    /// Whether `code` (any scheme) has at least one visit.
    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Number of countries with a record.
    pub fn distinct_countries(&self) -> usize {
        self.0.len()
    }

    /// Sum of all visit counts.
    pub fn total_visits(&self) -> u64 {
        self.0
            .values()
            .fold(0u64, |acc, record| acc.saturating_add(record.count))
    }

    /// Whether no visit has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Records by canonical code, in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VisitRecord)> {
        self.0.iter().map(|(code, record)| (code.as_str(), record))
    }

    /// Adds one visit, creating the record on first sight.
    ///
    /// An existing record keeps the name it was created with.
    pub(crate) fn increment(&mut self, code: String, name: String) -> &VisitRecord {
        match self.0.entry(code) {
            Entry::Occupied(entry) => {
                let record = entry.into_mut();
                record.count = record.count.saturating_add(1);
                record
            }
            Entry::Vacant(entry) => entry.insert(VisitRecord { name, count: 1 }),
        }
    }

    /// Overwrites a record with an explicit count. Zero removes the record.
    pub(crate) fn set(&mut self, code: String, name: String, count: u64) {
        if count == 0 {
            self.0.remove(&code);
        } else {
            self.0.insert(code, VisitRecord { name, count });
        }
    }

    /// Drops entries that break the `count >= 1` invariant or have no key.
    pub(crate) fn retain_valid(&mut self) -> usize {
        let before = self.0.len();
        self.0.retain(|code, record| !code.is_empty() && record.count >= 1);
        before - self.0.len()
    }
}

/// Builds records from `(code, name, count)` triples; codes are normalized
/// and zero counts are skipped.
impl<C, N> FromIterator<(C, N, u64)> for VisitRecords
where
    C: AsRef<str>,
    N: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (C, N, u64)>>(iter: I) -> Self {
        let mut records = VisitRecords::new();
        for (code, name, count) in iter {
            records.set(normalize_code(code.as_ref()), name.into(), count);
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_creates_then_counts() {
        let mut records = VisitRecords::new();
        assert_eq!(records.increment("FR".into(), "France".into()).count, 1);
        assert_eq!(records.increment("FR".into(), "Frankreich".into()).count, 2);
        let fr = records.get("FR").unwrap();
        assert_eq!(fr.name, "France");
        assert_eq!(fr.count, 2);
    }

    #[test]
    fn test_get_accepts_any_scheme() {
        let records: VisitRecords = [("BE", "Belgium", 3)].into_iter().collect();
        assert_eq!(records.get("BEL").map(|r| r.count), Some(3));
        assert_eq!(records.get("056").map(|r| r.count), Some(3));
        assert!(records.contains("56"));
        assert!(!records.contains("NL"));
    }

    #[test]
    fn test_totals() {
        let records: VisitRecords = [("US", "United States", 6), ("FR", "France", 4)]
            .into_iter()
            .collect();
        assert_eq!(records.distinct_countries(), 2);
        assert_eq!(records.total_visits(), 10);
    }

    #[test]
    fn test_zero_count_is_not_a_record() {
        let records: VisitRecords = [("US", "United States", 0)].into_iter().collect();
        assert!(records.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let records: VisitRecords = [("FR", "France", 1)].into_iter().collect();
        let json = serde_json::to_string(&records).unwrap();
        assert_eq!(json, r#"{"FR":{"name":"France","count":1}}"#);
    }

    #[test]
    fn test_retain_valid_drops_zero_counts() {
        let mut records: VisitRecords =
            serde_json::from_str(r#"{"FR":{"name":"France","count":0},"DE":{"name":"Germany","count":2}}"#)
                .unwrap();
        assert_eq!(records.retain_valid(), 1);
        assert!(!records.contains("FR"));
        assert!(records.contains("DE"));
    }
}
