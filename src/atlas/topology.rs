//! TopoJSON topology decoding.
//!
//! A topology stores every boundary segment once in a shared `arcs` table;
//! geometries reference arcs by index, with a negative index `i` meaning arc
//! `!i` (that is `-i - 1`) traversed backwards. Quantized topologies carry a
//! `transform` and delta-encode each arc's positions.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error_handling::AtlasError;

/// A (longitude, latitude) position.
pub type Position = (f64, f64);
/// A closed ring of positions.
pub type Ring = Vec<Position>;
/// Outer ring followed by any holes.
pub type Polygon = Vec<Ring>;

#[derive(Debug, Deserialize)]
pub(crate) struct Topology {
    #[serde(default)]
    transform: Option<Transform>,
    objects: HashMap<String, GeometryObject>,
    #[serde(default)]
    arcs: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Properties {
    #[serde(default)]
    pub(crate) name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeometryObject {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    properties: Option<Properties>,
    #[serde(default)]
    arcs: Option<serde_json::Value>,
    #[serde(default)]
    geometries: Option<Vec<GeometryObject>>,
}

/// A decoded polygonal feature of the topology.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DecodedFeature {
    pub(crate) id: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) polygons: Vec<Polygon>,
}

impl Topology {
    pub(crate) fn parse(json: &str) -> Result<Self, AtlasError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decodes every polygonal geometry of the named object.
    ///
    /// Non-polygonal and null geometries still yield a feature (with no
    /// polygons) so their ids remain hoverable.
    pub(crate) fn features(&self, object: &str) -> Result<Vec<DecodedFeature>, AtlasError> {
        let root = self
            .objects
            .get(object)
            .ok_or_else(|| AtlasError::MissingObject(object.to_string()))?;

        let decoded_arcs = self.decode_arcs();
        let geometries: Vec<&GeometryObject> = match root.kind.as_deref() {
            Some("GeometryCollection") => root.geometries.iter().flatten().collect(),
            _ => vec![root],
        };

        geometries
            .into_iter()
            .map(|geometry| -> Result<DecodedFeature, AtlasError> {
                Ok(DecodedFeature {
                    id: geometry.id.as_ref().and_then(id_to_string),
                    name: geometry
                        .properties
                        .as_ref()
                        .and_then(|p| p.name.clone())
                        .filter(|n| !n.trim().is_empty()),
                    polygons: polygons_of(geometry, &decoded_arcs)?,
                })
            })
            .collect()
    }

    /// Absolute positions for every arc in the table.
    fn decode_arcs(&self) -> Vec<Vec<Position>> {
        self.arcs
            .iter()
            .map(|arc| {
                let mut x = 0.0;
                let mut y = 0.0;
                arc.iter()
                    .filter(|p| p.len() >= 2)
                    .map(|p| match self.transform {
                        Some(t) => {
                            x += p[0];
                            y += p[1];
                            (x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1])
                        }
                        None => (p[0], p[1]),
                    })
                    .collect()
            })
            .collect()
    }
}

fn id_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn polygons_of(
    geometry: &GeometryObject,
    arcs: &[Vec<Position>],
) -> Result<Vec<Polygon>, AtlasError> {
    let Some(raw) = geometry.arcs.clone() else {
        return Ok(Vec::new());
    };
    match geometry.kind.as_deref() {
        Some("Polygon") => {
            let rings: Vec<Vec<i64>> = serde_json::from_value(raw)?;
            Ok(vec![stitch_polygon(&rings, arcs)?])
        }
        Some("MultiPolygon") => {
            let polygons: Vec<Vec<Vec<i64>>> = serde_json::from_value(raw)?;
            polygons
                .iter()
                .map(|rings| stitch_polygon(rings, arcs))
                .collect()
        }
        _ => Ok(Vec::new()),
    }
}

fn stitch_polygon(rings: &[Vec<i64>], arcs: &[Vec<Position>]) -> Result<Polygon, AtlasError> {
    rings.iter().map(|ring| stitch_ring(ring, arcs)).collect()
}

/// Joins arcs end to end; each arc after the first starts where the previous
/// one ended, so its first position is skipped.
fn stitch_ring(indices: &[i64], arcs: &[Vec<Position>]) -> Result<Ring, AtlasError> {
    let mut ring: Ring = Vec::new();
    for &index in indices {
        let (arc_index, reversed) = if index < 0 {
            (!index, true)
        } else {
            (index, false)
        };
        let arc = usize::try_from(arc_index)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or(AtlasError::InvalidArc(index))?;

        let skip = usize::from(!ring.is_empty());
        if reversed {
            ring.extend(arc.iter().rev().skip(skip).copied());
        } else {
            ring.extend(arc.iter().skip(skip).copied());
        }
    }
    Ok(ring)
}
