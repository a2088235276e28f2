//! ESRI Shapefile reading.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{dbase::{FieldValue, Record}, PolygonRing, Reader, Shape};
use tracing::warn;

use super::boundaries::BoundaryRow;
use crate::config::ColumnAliases;

/// Read every polygon feature of a `.shp` file (with its `.dbf` sidecar).
pub(crate) fn read_shapefile_boundaries(path: &Path, columns: &ColumnAliases) -> Result<Vec<BoundaryRow>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?;

    let mut rows = Vec::new();
    for (idx, item) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = item.with_context(|| format!("[io::shp] Error reading feature {idx}"))?;
        let Some(geometry) = shape_to_geo(&shape) else {
            warn!("[io::shp] Feature {idx} of {} is not a polygon; skipped", path.display());
            continue;
        };
        let text = |aliases: &[String], field: &str| -> Result<String> {
            field_text(&record, aliases)
                .ok_or_else(|| anyhow!("[io::shp] Feature {idx}: missing {field} attribute (tried {})", aliases.join(", ")))
        };
        rows.push(BoundaryRow {
            source_index: idx,
            district: text(&columns.district, "district")?,
            block: text(&columns.block, "block")?,
            village: text(&columns.village, "village")?,
            geometry,
        });
    }
    Ok(rows)
}

/// Value of the first alias present in the record. dBase field names are
/// tried as given, lowercase and uppercase.
fn field_text(record: &Record, aliases: &[String]) -> Option<String> {
    aliases.iter()
        .flat_map(|alias| [alias.clone(), alias.to_lowercase(), alias.to_uppercase()])
        .find_map(|name| record.get(&name))
        .map(|value| match value {
            FieldValue::Character(s) => s.as_deref().unwrap_or_default().trim().to_string(),
            FieldValue::Memo(s) => s.trim().to_string(),
            FieldValue::Numeric(n) => n.map(|n| n.to_string()).unwrap_or_default(),
            FieldValue::Float(n) => n.map(|n| n.to_string()).unwrap_or_default(),
            FieldValue::Double(n) => n.to_string(),
            FieldValue::Integer(n) => n.to_string(),
            other => format!("{other:?}"),
        })
}

/// Polygon shapes as a MultiPolygon; `None` for any other shape type.
fn shape_to_geo(shape: &Shape) -> Option<MultiPolygon<f64>> {
    match shape {
        Shape::Polygon(p) => Some(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::PolygonM(p) => Some(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::PolygonZ(p) => Some(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        _ => None,
    }
}

/// Group rings in Shapefile order: each outer ring followed by its holes.
fn rings_to_geo<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> Coord<f64>) -> MultiPolygon<f64> {
    let line = |points: &[P]| LineString(points.iter().map(&xy).collect());

    let mut polygons = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes = Vec::new();

    for ring in rings {
        match ring {
            PolygonRing::Outer(points) => {
                if let Some(ext) = exterior.take() {
                    polygons.push(Polygon::new(ext, std::mem::take(&mut holes)));
                }
                exterior = Some(line(points));
            }
            PolygonRing::Inner(points) => holes.push(line(points)),
        }
    }
    if let Some(ext) = exterior {
        polygons.push(Polygon::new(ext, holes));
    }
    MultiPolygon(polygons)
}

#[cfg(test)]
mod tests {
    use shapefile::Point;

    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point> {
        vec![
            Point { x: x0, y: y0 },
            Point { x: x0, y: y0 + size },
            Point { x: x0 + size, y: y0 + size },
            Point { x: x0 + size, y: y0 },
            Point { x: x0, y: y0 },
        ]
    }

    #[test]
    fn rings_group_into_polygons() {
        let mut hole = square(1.0, 1.0, 1.0);
        hole.reverse();
        let rings = vec![
            PolygonRing::Outer(square(0.0, 0.0, 4.0)),
            PolygonRing::Inner(hole),
            PolygonRing::Outer(square(10.0, 10.0, 1.0)),
        ];
        let mp = rings_to_geo(&rings, |pt: &Point| Coord { x: pt.x, y: pt.y });
        assert_eq!(mp.0.len(), 2);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert!(mp.0[1].interiors().is_empty());
    }
}
