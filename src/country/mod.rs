//! Country code normalization.
//!
//! Visitor lookups report ISO alpha-2 codes, while world atlases key their
//! regions by ISO numeric codes (often zero-padded) or alpha-3 codes. Every
//! code entering the visit store or the renderer goes through
//! [`normalize_code`], so a single canonical alpha-2 key identifies a country
//! regardless of the scheme it arrived in.

mod table;

use std::collections::HashMap;
use std::sync::LazyLock;

use table::COUNTRIES;

/// A row of the ISO 3166-1 table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    /// Canonical key (ISO alpha-2)
    pub alpha2: &'static str,
    /// ISO alpha-3
    pub alpha3: &'static str,
    /// ISO numeric
    pub numeric: u16,
    /// English short name
    pub name: &'static str,
}

/// Every accepted spelling (alpha-2, alpha-3, unpadded numeric) -> table row.
static INDEX: LazyLock<HashMap<String, Country>> = LazyLock::new(|| {
    let mut index = HashMap::with_capacity(COUNTRIES.len() * 3);
    for &(alpha2, alpha3, numeric, name) in COUNTRIES {
        let country = Country {
            alpha2,
            alpha3,
            numeric,
            name,
        };
        index.insert(alpha2.to_string(), country);
        index.insert(alpha3.to_string(), country);
        index.insert(numeric.to_string(), country);
    }
    index
});

/// Trims and upper-cases a raw code; numeric codes lose their zero padding.
fn clean(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        let unpadded = trimmed.trim_start_matches('0');
        if unpadded.is_empty() {
            "0".to_string()
        } else {
            unpadded.to_string()
        }
    } else {
        trimmed.to_ascii_uppercase()
    }
}

/// Looks up a country by any supported code scheme.
pub fn lookup(raw: &str) -> Option<Country> {
    INDEX.get(&clean(raw)).copied()
}

/// Maps a country code in any scheme to its canonical key.
///
/// Known codes resolve to ISO alpha-2 (`"056"`, `"56"`, `"BEL"` and `"be"`
/// all become `"BE"`). Unknown codes are kept in their cleaned form so they
/// can still be recorded and matched against themselves.
pub fn normalize_code(raw: &str) -> String {
    match lookup(raw) {
        Some(country) => country.alpha2.to_string(),
        None => clean(raw),
    }
}

/// English short name for a code in any scheme.
pub fn country_name(raw: &str) -> Option<&'static str> {
    lookup(raw).map(|c| c.name)
}
