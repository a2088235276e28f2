//! GeoJSON writing operations.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use geo::{LineString, MultiPolygon, Polygon};
use serde_json::{json, Value};

use crate::types::{ClassPolygon, MatchedVillage, VillageKey, VillageLandStats};

fn ring_json(ring: &LineString<f64>) -> Value {
    Value::Array(ring.coords().map(|c| json!([c.x, c.y])).collect())
}

fn polygon_coords(polygon: &Polygon<f64>) -> Value {
    Value::Array(std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_json)
        .collect())
}

/// Standard GeoJSON Polygon geometry object.
pub fn polygon_json(polygon: &Polygon<f64>) -> Value {
    json!({ "type": "Polygon", "coordinates": polygon_coords(polygon) })
}

/// Standard GeoJSON MultiPolygon geometry object.
pub fn multipolygon_json(mp: &MultiPolygon<f64>) -> Value {
    let polygons: Vec<Value> = mp.0.iter().map(polygon_coords).collect();
    json!({ "type": "MultiPolygon", "coordinates": polygons })
}

fn feature(properties: Value, geometry: Value) -> Value {
    json!({ "type": "Feature", "properties": properties, "geometry": geometry })
}

fn to_bytes(features: Vec<Value>) -> Result<Vec<u8>> {
    let collection = json!({ "type": "FeatureCollection", "features": features });
    serde_json::to_vec(&collection).context("[io::geojson::write] Failed to serialize GeoJSON to bytes")
}

fn village_properties(village: &MatchedVillage) -> Value {
    json!({
        "state": village.state,
        "district": village.key.district,
        "block": village.key.block,
        "village": village.key.village,
        "num_beneficiaries": village.beneficiary_count,
    })
}

/// `matched_villages.geojson`
pub fn matched_villages_geojson(villages: &[MatchedVillage]) -> Result<Vec<u8>> {
    to_bytes(villages.iter()
        .map(|v| feature(village_properties(v), multipolygon_json(&v.geometry)))
        .collect())
}

/// `class_polygons.geojson`
pub fn class_polygons_geojson(polygons: &[ClassPolygon]) -> Result<Vec<u8>> {
    to_bytes(polygons.iter()
        .map(|p| feature(
            json!({
                "district": p.key.district,
                "block": p.key.block,
                "village": p.key.village,
                "land_type": p.land_type,
                "area_pixels": p.area_pixels,
            }),
            polygon_json(&p.geometry),
        ))
        .collect())
}

/// `village_landuse.geojson`: matched villages that have a stats row, with
/// the histogram attached.
pub fn village_landuse_geojson(villages: &[MatchedVillage], stats: &[VillageLandStats]) -> Result<Vec<u8>> {
    let by_key: BTreeMap<&VillageKey, &VillageLandStats> = stats.iter().map(|s| (&s.key, s)).collect();

    to_bytes(villages.iter()
        .filter_map(|village| {
            let stats = by_key.get(&village.key)?;
            let mut properties = village_properties(village);
            properties["land_stats"] = stats.land_stats_json().into();
            properties["total_pixels"] = stats.total_pixels.into();
            Some(feature(properties, multipolygon_json(&village.geometry)))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;
    use crate::io::geojson::{read_geojson_bytes, Feature};
    use crate::types::LandType;

    fn village() -> MatchedVillage {
        MatchedVillage {
            state: "Odisha".into(),
            key: VillageKey::new("angul", "banarpal", "x"),
            beneficiary_count: 4,
            geometry: MultiPolygon(vec![polygon![(x: 0., y: 0.), (x: 2., y: 0.), (x: 2., y: 2.), (x: 0., y: 2.)]]),
        }
    }

    #[test]
    fn matched_villages_schema() {
        let bytes = matched_villages_geojson(&[village()]).unwrap();
        let features: Vec<Feature> = read_geojson_bytes(&bytes).unwrap();
        let f = &features[0];
        assert_eq!(f.text("num_beneficiaries").as_deref(), Some("4"));
        assert_eq!(f.text("state").as_deref(), Some("Odisha"));
        assert_eq!(f.geometry.as_ref(), Some(&village().geometry));
    }

    #[test]
    fn class_polygon_land_type_is_snake_case() {
        let p = ClassPolygon {
            key: VillageKey::new("angul", "banarpal", "x"),
            land_type: LandType::WaterBodies,
            geometry: polygon![(x: 0., y: 0.), (x: 1., y: 0.), (x: 1., y: 1.), (x: 0., y: 1.)],
            area_pixels: 1,
        };
        let text = String::from_utf8(class_polygons_geojson(&[p]).unwrap()).unwrap();
        assert!(text.contains(r#""land_type":"water_bodies""#));
        assert!(text.contains(r#""type":"Polygon""#));
    }

    #[test]
    fn landuse_only_for_villages_with_stats() {
        let mut other = village();
        other.key.village = "y".into();
        let stats = vec![VillageLandStats::empty(village().key)];

        let bytes = village_landuse_geojson(&[village(), other], &stats).unwrap();
        let features = read_geojson_bytes(&bytes).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].text("land_stats").as_deref(), Some("{}"));
        assert_eq!(features[0].text("total_pixels").as_deref(), Some("0"));
    }
}
