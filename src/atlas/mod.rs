//! World atlas loading.
//!
//! The atlas is read-only reference data: a TopoJSON topology, fetched once
//! from a URL or read from a local file, whose country geometries become the
//! map's [`GeographicRegion`]s.

mod topology;

use log::{debug, info};
use url::Url;

use crate::error_handling::AtlasError;

pub use topology::{Polygon, Position, Ring};
use topology::Topology;

/// One renderable country of the atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct GeographicRegion {
    /// Identifier as it appears in the dataset (numeric, alpha-2 or alpha-3)
    pub region_id: String,
    /// Name from the dataset's properties; may be empty
    pub display_name: String,
    /// Outline polygons in lon/lat degrees; empty for null geometries
    pub polygons: Vec<Polygon>,
}

/// Builds regions from TopoJSON text.
///
/// Geometries without an id fall back to their name, and to a positional
/// id when they have neither.
pub fn regions_from_topojson(json: &str, object: &str) -> Result<Vec<GeographicRegion>, AtlasError> {
    let topology = Topology::parse(json)?;
    let regions = topology
        .features(object)?
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            let display_name = feature.name.unwrap_or_default();
            let region_id = feature
                .id
                .or_else(|| (!display_name.is_empty()).then(|| display_name.clone()))
                .unwrap_or_else(|| format!("region-{index}"));
            GeographicRegion {
                region_id,
                display_name,
                polygons: feature.polygons,
            }
        })
        .collect();
    Ok(regions)
}

/// Loads the atlas from `source`, an `http(s)` URL or a local file path.
pub async fn load_atlas(
    client: &reqwest::Client,
    source: &str,
    object: &str,
) -> Result<Vec<GeographicRegion>, AtlasError> {
    let json = match Url::parse(source) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            debug!("Fetching atlas from {url}");
            let response = client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(AtlasError::Status(status.as_u16()));
            }
            response.text().await?
        }
        _ => {
            debug!("Reading atlas from {source}");
            tokio::fs::read_to_string(source).await?
        }
    };

    let regions = regions_from_topojson(&json, object)?;
    info!("Loaded {} regions from atlas", regions.len());
    Ok(regions)
}
