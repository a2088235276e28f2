//! GeoJSON reading operations.

use std::{fs, path::Path};

use anyhow::{anyhow, bail, ensure, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Map, Value};
use tracing::warn;

use crate::types::{MatchedVillage, VillageKey};

/// One feature with its attribute map and optional areal geometry.
#[derive(Debug, Clone)]
pub struct Feature {
    pub properties: Map<String, Value>,
    pub geometry: Option<MultiPolygon<f64>>,
}

impl Feature {
    /// Property as text, looked up case-insensitively. Numbers are
    /// stringified and `null` reads as an empty string.
    pub fn text(&self, name: &str) -> Option<String> {
        let value = self.properties.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)?;
        Some(match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }
}

/// Read all features of a FeatureCollection file.
pub fn read_geojson(path: &Path) -> Result<Vec<Feature>> {
    let bytes = fs::read(path)
        .with_context(|| format!("[io::geojson::read] Failed to read {}", path.display()))?;
    read_geojson_bytes(&bytes)
        .with_context(|| format!("[io::geojson::read] Invalid GeoJSON in {}", path.display()))
}

/// Read all features from GeoJSON bytes.
///
/// Polygon and MultiPolygon geometries are kept; a `null` geometry reads as
/// `None`; any other geometry type is an error.
pub fn read_geojson_bytes(bytes: &[u8]) -> Result<Vec<Feature>> {
    let value: Value = serde_json::from_slice(bytes).context("[io::geojson::read] Failed to parse GeoJSON bytes")?;
    ensure!(value["type"] == "FeatureCollection", "[io::geojson::read] Expected a FeatureCollection");

    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("[io::geojson::read] FeatureCollection has no features array"))?;

    features.iter().enumerate()
        .map(|(idx, feature)| {
            let properties = feature["properties"].as_object().cloned().unwrap_or_default();
            let geometry = parse_geometry(&feature["geometry"])
                .with_context(|| format!("[io::geojson::read] Feature {idx}: bad geometry"))?;
            Ok(Feature { properties, geometry })
        })
        .collect()
}

/// Parse a GeoJSON geometry object into a MultiPolygon.
pub fn parse_geometry(geometry: &Value) -> Result<Option<MultiPolygon<f64>>> {
    if geometry.is_null() { return Ok(None) }

    let coords = geometry["coordinates"].as_array()
        .ok_or_else(|| anyhow!("geometry has no coordinates"))?;
    match geometry["type"].as_str() {
        Some("Polygon") => Ok(Some(MultiPolygon(vec![parse_polygon(coords)?]))),
        Some("MultiPolygon") => coords.iter()
            .map(|polygon| {
                let rings = polygon.as_array().ok_or_else(|| anyhow!("polygon is not an array"))?;
                parse_polygon(rings)
            })
            .collect::<Result<Vec<_>>>()
            .map(|polygons| Some(MultiPolygon(polygons))),
        other => bail!("unsupported geometry type {other:?}"),
    }
}

/// `[exterior, hole, hole, ...]`
fn parse_polygon(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        ring.as_array().ok_or_else(|| anyhow!("ring is not an array")).and_then(|r| parse_ring(r))
    });
    let exterior = rings.next().ok_or_else(|| anyhow!("polygon has no exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// `[[x, y], [x, y], ...]`, closed if the source left it open.
fn parse_ring(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = coords.iter()
        .map(|pair| {
            let x = pair[0].as_f64().ok_or_else(|| anyhow!("coordinate x must be a number"))?;
            let y = pair[1].as_f64().ok_or_else(|| anyhow!("coordinate y must be a number"))?;
            Ok(Coord { x, y })
        })
        .collect::<Result<Vec<_>>>()?;

    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last { points.push(first) }
    }
    Ok(LineString(points))
}

/// Read a MatchedVillages layer back, e.g. to rerun the overlay alone.
pub fn read_matched_villages(path: &Path) -> Result<Vec<MatchedVillage>> {
    let mut villages = Vec::new();
    for (idx, feature) in read_geojson(path)?.into_iter().enumerate() {
        let Some(geometry) = feature.geometry.clone() else {
            warn!("[io::geojson::read] Feature {idx} of {} has no geometry; skipped", path.display());
            continue;
        };
        villages.push(matched_village(&feature, geometry)
            .with_context(|| format!("[io::geojson::read] Feature {idx} of {}", path.display()))?);
    }
    Ok(villages)
}

fn matched_village(feature: &Feature, geometry: MultiPolygon<f64>) -> Result<MatchedVillage> {
    let field = |name: &str| feature.text(name).ok_or_else(|| anyhow!("missing property {name}"));
    let count = field("num_beneficiaries")?;
    Ok(MatchedVillage {
        state: feature.text("state").unwrap_or_default(),
        key: VillageKey::new(field("district")?, field("block")?, field("village")?),
        beneficiary_count: count.parse()
            .with_context(|| format!("num_beneficiaries is not an integer: {count:?}"))?,
        geometry,
    })
}

#[cfg(test)]
mod tests {
    use geo::Area;

    use super::*;

    const LAYER: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"DISTRICT_N": "Angul", "code": 7},
             "geometry": {"type": "Polygon", "coordinates": [
                [[0,0],[4,0],[4,4],[0,4]],
                [[1,1],[1,2],[2,2],[2,1],[1,1]]
             ]}},
            {"type": "Feature", "properties": {"DISTRICT_N": null},
             "geometry": {"type": "MultiPolygon", "coordinates": [
                [[[0,0],[1,0],[1,1],[0,1],[0,0]]],
                [[[5,5],[6,5],[6,6],[5,6],[5,5]]]
             ]}},
            {"type": "Feature", "properties": {}, "geometry": null}
        ]
    }"#;

    #[test]
    fn polygons_and_multipolygons() {
        let features = read_geojson_bytes(LAYER.as_bytes()).unwrap();
        assert_eq!(features.len(), 3);

        let first = features[0].geometry.as_ref().unwrap();
        assert_eq!(first.0[0].interiors().len(), 1);
        assert_eq!(first.unsigned_area(), 15.0);

        assert_eq!(features[1].geometry.as_ref().unwrap().0.len(), 2);
        assert!(features[2].geometry.is_none());
    }

    #[test]
    fn properties_are_text() {
        let features = read_geojson_bytes(LAYER.as_bytes()).unwrap();
        assert_eq!(features[0].text("district_n").as_deref(), Some("Angul"));
        assert_eq!(features[0].text("CODE").as_deref(), Some("7"));
        assert_eq!(features[1].text("district_n").as_deref(), Some(""));
        assert_eq!(features[2].text("district_n"), None);
    }

    #[test]
    fn points_are_rejected() {
        let layer = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[0,0]}}]}"#;
        assert!(read_geojson_bytes(layer.as_bytes()).is_err());
    }

    #[test]
    fn matched_villages_without_geometry_are_skipped() {
        let layer = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"district":"anugul","block":"banarpal",
              "village":"kumursingha","num_beneficiaries":4},
             "geometry":{"type":"Polygon","coordinates":[[[0,0],[2,0],[2,2],[0,2],[0,0]]]}},
            {"type":"Feature","properties":{"district":"anugul","block":"banarpal",
              "village":"gudu","num_beneficiaries":1},"geometry":null}]}"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matched.geojson");
        fs::write(&path, layer).unwrap();

        let villages = read_matched_villages(&path).unwrap();
        assert_eq!(villages.len(), 1);
        assert_eq!(villages[0].key.village, "kumursingha");
        assert_eq!(villages[0].beneficiary_count, 4);
    }
}
