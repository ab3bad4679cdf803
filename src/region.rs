//! Regions (ZIP codes, tracts, ...) and loading them from a GeoJSON
//! `FeatureCollection`.

use crate::error::AdjacencyError;
use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{Feature, GeoJson, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::path::Path;

/// Stable identifier of a region. Ordering is the lexicographic order of
/// the underlying string, which is also the order matrix indices follow.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        RegionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        RegionId(id.to_string())
    }
}

impl From<String> for RegionId {
    fn from(id: String) -> Self {
        RegionId(id)
    }
}

impl std::borrow::Borrow<str> for RegionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One areal unit of analysis.
#[derive(Debug, Clone)]
pub struct Region {
    pub id: RegionId,
    pub geometry: MultiPolygon<f64>,
    /// Grouping label such as the borough or county.
    pub group: Option<String>,
}

impl Region {
    pub fn new(id: impl Into<RegionId>, geometry: impl Into<MultiPolygon<f64>>) -> Self {
        Self {
            id: id.into(),
            geometry: geometry.into(),
            group: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// What to do when several features carry the same identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    /// Concatenate the polygons of every feature sharing an identifier.
    Merge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub id_property: String,
    pub group_property: Option<String>,
    pub duplicates: DuplicatePolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        // Column names of the NYC DOITT ZIP code boundary file
        Self {
            id_property: "ZIPCODE".to_string(),
            group_property: Some("COUNTY".to_string()),
            duplicates: DuplicatePolicy::Reject,
        }
    }
}

pub fn load_regions_from_path(
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<Vec<Region>, AdjacencyError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| AdjacencyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_regions(&raw, options)
}

/// Parses a GeoJSON `FeatureCollection` into regions sorted by identifier.
///
/// Any malformed feature aborts the whole load: adjacency cannot be inferred
/// for a region without a usable boundary.
pub fn load_regions(
    geojson: &str,
    options: &LoadOptions,
) -> Result<Vec<Region>, AdjacencyError> {
    let collection = match geojson.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => fc,
        _ => {
            return Err(AdjacencyError::geometry(
                "<input>",
                "expected a GeoJSON FeatureCollection",
            ));
        }
    };

    let mut by_id: BTreeMap<RegionId, Region> = BTreeMap::new();

    for (position, feature) in collection.features.iter().enumerate() {
        let region = region_from_feature(position, feature, options)?;

        match by_id.entry(region.id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(region);
            }
            Entry::Occupied(mut slot) => match options.duplicates {
                DuplicatePolicy::Reject => {
                    return Err(AdjacencyError::DuplicateIdentifier(region.id));
                }
                DuplicatePolicy::Merge => {
                    tracing::debug!("Merging duplicate feature for region {}", region.id);
                    let existing = slot.get_mut();
                    existing.geometry.0.extend(region.geometry.0);
                    if existing.group.is_none() {
                        existing.group = region.group;
                    }
                }
            },
        }
    }

    tracing::info!(
        "Loaded {} regions from {} features",
        by_id.len(),
        collection.features.len()
    );

    Ok(by_id.into_values().collect())
}

fn region_from_feature(
    position: usize,
    feature: &Feature,
    options: &LoadOptions,
) -> Result<Region, AdjacencyError> {
    let id = feature
        .property(&options.id_property)
        .and_then(property_to_string)
        .ok_or_else(|| {
            AdjacencyError::geometry(
                format!("<feature #{}>", position),
                format!("missing identifier property '{}'", options.id_property),
            )
        })?;

    let group = options
        .group_property
        .as_deref()
        .and_then(|name| feature.property(name))
        .and_then(property_to_string);

    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| AdjacencyError::geometry(&id, "feature has no geometry"))?;

    let polygons = match &geometry.value {
        geojson::Value::Polygon(rings) => vec![polygon_from_rings(&id, rings)?],
        geojson::Value::MultiPolygon(parts) => parts
            .iter()
            .map(|rings| polygon_from_rings(&id, rings))
            .collect::<Result<Vec<_>, _>>()?,
        other => {
            return Err(AdjacencyError::geometry(
                &id,
                format!("unsupported geometry type {}", value_kind(other)),
            ));
        }
    };

    if polygons.is_empty() {
        return Err(AdjacencyError::geometry(&id, "multipolygon has no members"));
    }

    Ok(Region {
        id: RegionId::new(id),
        geometry: MultiPolygon::new(polygons),
        group,
    })
}

fn value_kind(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn property_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(match (n.as_u64(), n.as_i64(), n.as_f64()) {
            (Some(u), _, _) => u.to_string(),
            (None, Some(i), _) => i.to_string(),
            // 10454.0 from shapefile conversions is still ZIP 10454
            (None, None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                (f as i64).to_string()
            }
            _ => n.to_string(),
        }),
        _ => None,
    }
}

fn polygon_from_rings(
    id: &str,
    rings: &[Vec<Vec<f64>>],
) -> Result<Polygon<f64>, AdjacencyError> {
    let mut rings = rings.iter().map(|ring| ring_to_linestring(id, ring));

    let exterior = match rings.next() {
        Some(ring) => ring?,
        None => return Err(AdjacencyError::geometry(id, "polygon has no exterior ring")),
    };
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;

    Ok(Polygon::new(exterior, interiors))
}

fn ring_to_linestring(id: &str, ring: &[Vec<f64>]) -> Result<LineString<f64>, AdjacencyError> {
    if ring.len() < 4 {
        return Err(AdjacencyError::geometry(
            id,
            format!("ring has {} positions, at least 4 required", ring.len()),
        ));
    }

    let coords = ring
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
            [_, _, ..] => Err(AdjacencyError::geometry(id, "non-finite coordinate")),
            _ => Err(AdjacencyError::geometry(
                id,
                "position has fewer than 2 ordinates",
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if coords.first() != coords.last() {
        return Err(AdjacencyError::geometry(id, "ring is not closed"));
    }

    Ok(LineString::new(coords))
}
