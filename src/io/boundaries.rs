use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use geo::MultiPolygon;
use tracing::{info, warn};

use super::{geojson, shp};
use crate::{
    common,
    config::ColumnAliases,
    names::NameNormalizer,
    types::{BoundaryPolygon, VillageKey},
};

/// A boundary feature with raw attribute values, before normalization.
#[derive(Debug, Clone)]
pub struct BoundaryRow {
    pub source_index: usize,
    pub district: String,
    pub block: String,
    pub village: String,
    pub geometry: MultiPolygon<f64>,
}

impl BoundaryRow {
    fn into_polygon(self, state: &str, normalizer: &NameNormalizer) -> BoundaryPolygon {
        let key = normalizer.key(&self.district, &self.block, &self.village);
        BoundaryPolygon {
            source_index: self.source_index,
            state: state.to_string(),
            raw: VillageKey::new(self.district, self.block, self.village),
            key,
            geometry: self.geometry,
        }
    }
}

/// Load boundary polygons from a shapefile, a zipped shapefile or GeoJSON,
/// and normalize their names.
pub fn load_boundaries(
    path: &Path,
    columns: &ColumnAliases,
    normalizer: &NameNormalizer,
    state: &str,
) -> Result<Vec<BoundaryPolygon>> {
    let rows = match common::extension_of(path).as_str() {
        "shp" => shp::read_shapefile_boundaries(path, columns)?,
        "zip" => {
            let dir = tempfile::tempdir().context("[io::boundaries] Failed to create temp dir")?;
            common::extract_zip(path, dir.path())?;
            let shp_path = common::find_file_with_extension(dir.path(), "shp")?;
            shp::read_shapefile_boundaries(&shp_path, columns)?
        }
        "geojson" | "json" => geojson_boundaries(path, columns)?,
        other => bail!("[io::boundaries] Unsupported boundary format {other:?}: {}", path.display()),
    };

    info!("[io::boundaries] Loaded {} boundary polygons from {}", rows.len(), path.display());
    Ok(rows.into_iter().map(|row| row.into_polygon(state, normalizer)).collect())
}

fn geojson_boundaries(path: &Path, columns: &ColumnAliases) -> Result<Vec<BoundaryRow>> {
    let features = geojson::read_geojson(path)?;
    let mut rows = Vec::with_capacity(features.len());

    for (idx, feature) in features.into_iter().enumerate() {
        let text = |aliases: &[String], field: &str| -> Result<String> {
            aliases.iter()
                .find_map(|alias| feature.text(alias))
                .map(|s| s.trim().to_string())
                .ok_or_else(|| anyhow!("[io::boundaries] Feature {idx}: missing {field} property (tried {})", aliases.join(", ")))
        };
        let (district, block, village) = (
            text(&columns.district, "district")?,
            text(&columns.block, "block")?,
            text(&columns.village, "village")?,
        );
        let Some(geometry) = feature.geometry else {
            warn!("[io::boundaries] Feature {idx} of {} has no geometry; skipped", path.display());
            continue;
        };
        rows.push(BoundaryRow { source_index: idx, district, block, village, geometry });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Write, path::PathBuf};

    use geo::Area;
    use shapefile::{
        dbase::{FieldName, FieldValue, Record, TableWriterBuilder},
        Point, Polygon, PolygonRing,
    };

    use super::*;

    /// Clockwise square ring, the shapefile convention for outer rings.
    fn ring(x0: f64, y0: f64, size: f64) -> Vec<Point> {
        vec![
            Point { x: x0, y: y0 },
            Point { x: x0, y: y0 + size },
            Point { x: x0 + size, y: y0 + size },
            Point { x: x0 + size, y: y0 },
            Point { x: x0, y: y0 },
        ]
    }

    /// Write `villages.shp` (+ `.shx`, `.dbf`) with upper-case dBase field names.
    fn write_shapefile(dir: &Path) -> PathBuf {
        let path = dir.join("villages.shp");
        let fields = TableWriterBuilder::new()
            .add_character_field(FieldName::try_from("DISTRICT_N").unwrap(), 50)
            .add_character_field(FieldName::try_from("BLOCK_NAME").unwrap(), 50)
            .add_character_field(FieldName::try_from("CENSUS_VIL").unwrap(), 50);

        let rows = [
            ("Anugul", "Banarpal", "Kumursingha", ring(0.0, 0.0, 2.0)),
            ("Balasore", "Remuna", "Gudu", ring(5.0, 5.0, 1.0)),
        ];
        let mut writer = shapefile::Writer::from_path(&path, fields).unwrap();
        for (district, block, village, points) in rows {
            let mut record = Record::default();
            record.insert("DISTRICT_N".to_string(), FieldValue::Character(Some(district.to_string())));
            record.insert("BLOCK_NAME".to_string(), FieldValue::Character(Some(block.to_string())));
            record.insert("CENSUS_VIL".to_string(), FieldValue::Character(Some(village.to_string())));
            writer.write_shape_and_record(&Polygon::new(PolygonRing::Outer(points)), &record).unwrap();
        }
        drop(writer);
        path
    }

    fn check_shapefile_polygons(polygons: &[BoundaryPolygon]) {
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[0].key, VillageKey::new("angul", "banarpal", "kumursingha"));
        assert_eq!(polygons[0].raw, VillageKey::new("Anugul", "Banarpal", "Kumursingha"));
        assert_eq!(polygons[0].geometry.unsigned_area(), 4.0);
        assert_eq!(polygons[1].key, VillageKey::new("baleswar", "remuna", "gudu"));
        assert_eq!(polygons[1].source_index, 1);
    }

    #[test]
    fn shapefile_fields_resolve_through_aliases() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_shapefile(dir.path());

        let polygons = load_boundaries(&path, &ColumnAliases::default(), &NameNormalizer::default(), "Odisha").unwrap();
        check_shapefile_polygons(&polygons);
    }

    #[test]
    fn zipped_shapefile_is_extracted_and_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let shp_dir = dir.path().join("shp");
        fs::create_dir(&shp_dir).unwrap();
        write_shapefile(&shp_dir);

        let zip_path = dir.path().join("villages.zip");
        {
            let mut zip = zip::ZipWriter::new(fs::File::create(&zip_path).unwrap());
            let options = zip::write::SimpleFileOptions::default();
            for ext in ["shp", "shx", "dbf"] {
                zip.start_file(format!("villages/villages.{ext}"), options).unwrap();
                zip.write_all(&fs::read(shp_dir.join(format!("villages.{ext}"))).unwrap()).unwrap();
            }
            zip.finish().unwrap();
        }

        let polygons = load_boundaries(&zip_path, &ColumnAliases::default(), &NameNormalizer::default(), "Odisha").unwrap();
        check_shapefile_polygons(&polygons);
    }

    #[test]
    fn shapefile_without_alias_fields_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_shapefile(dir.path());
        let columns = ColumnAliases { village: vec!["vill_name".into()], ..ColumnAliases::default() };

        let err = load_boundaries(&path, &columns, &NameNormalizer::default(), "Odisha").unwrap_err();
        assert!(format!("{err:#}").contains("village"));
    }

    #[test]
    fn geojson_boundaries_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("villages.geojson");
        std::fs::write(&path, r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"DISTRICT_N":"Anugul","BLOCK_NAME":" Banarpal ","CENSUS_VIL":"Kumur  Singha"},
             "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
            {"type":"Feature","properties":{"district_n":"Angul","block_name":"Banarpal","census_vil":"Empty"},
             "geometry":null}
        ]}"#).unwrap();

        let polygons = load_boundaries(&path, &ColumnAliases::default(), &NameNormalizer::default(), "Odisha").unwrap();
        assert_eq!(polygons.len(), 1);
        let p = &polygons[0];
        assert_eq!(p.key, VillageKey::new("angul", "banarpal", "kumur  singha"));
        assert_eq!(p.raw, VillageKey::new("Anugul", "Banarpal", "Kumur  Singha"));
        assert_eq!(p.state, "Odisha");
        assert_eq!(p.source_index, 0);
    }

    #[test]
    fn missing_attribute_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("villages.json");
        std::fs::write(&path, r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"district":"Angul","village":"X"},
             "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}}
        ]}"#).unwrap();

        let err = load_boundaries(&path, &ColumnAliases::default(), &NameNormalizer::default(), "Odisha").unwrap_err();
        assert!(format!("{err:#}").contains("block"));
    }

    #[test]
    fn unknown_format_is_rejected() {
        let path = Path::new("villages.kml");
        assert!(load_boundaries(path, &ColumnAliases::default(), &NameNormalizer::default(), "Odisha").is_err());
    }
}
