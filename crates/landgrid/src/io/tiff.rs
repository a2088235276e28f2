use std::{fs::File, io::{BufReader, Read, Seek}, path::Path};

use ndarray::Array2;
use tiff::{
    decoder::{Decoder, DecodingResult, Limits},
    tags::Tag,
    ColorType,
};

use crate::{affine::Affine, error::GridError, grid::Grid};

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GDAL_NODATA: u16 = 42113;

/// Read a single-band integer GeoTIFF from disk.
pub fn read_tiff_file(path: &Path) -> Result<Grid, GridError> {
    let file = File::open(path)
        .map_err(|source| GridError::Io { path: path.to_path_buf(), source })?;
    read_tiff(BufReader::new(file))
}

/// Read a single-band integer GeoTIFF from any seekable reader.
///
/// Georeferencing comes from `ModelTransformationTag` when present, otherwise
/// from `ModelPixelScaleTag` + `ModelTiepointTag`. The nodata sentinel is
/// taken from the `GDAL_NODATA` tag.
pub fn read_tiff<R: Read + Seek>(reader: R) -> Result<Grid, GridError> {
    let mut decoder = Decoder::new(reader)?.with_limits(Limits::unlimited());

    match decoder.colortype()? {
        ColorType::Gray(_) => {}
        other => return Err(GridError::Invalid(format!("expected a single-band raster, found {other:?}"))),
    }

    let (width, height) = decoder.dimensions()?;
    let (cols, rows) = (width as usize, height as usize);
    if cols == 0 || rows == 0 {
        return Err(GridError::Invalid("raster has zero width or height".into()));
    }

    let transform = read_transform(&mut decoder)?;
    let nodata = decoder.find_tag(Tag::from_u16_exhaustive(GDAL_NODATA))?
        .map(|value| value.into_string())
        .transpose()?
        .and_then(|text| super::parse_nodata(&text));

    let samples = widen(decoder.read_image()?)?;
    if samples.len() != rows * cols {
        return Err(GridError::Invalid(format!(
            "decoded {} samples, expected {rows}x{cols}", samples.len()
        )));
    }

    let data = Array2::from_shape_vec((rows, cols), samples)
        .map_err(|e| GridError::Invalid(e.to_string()))?;
    Ok(Grid::new(data, transform, nodata))
}

fn read_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Affine, GridError> {
    if let Some(value) = decoder.find_tag(Tag::from_u16_exhaustive(MODEL_TRANSFORMATION))? {
        let m = value.into_f64_vec()?;
        if m.len() < 8 {
            return Err(GridError::Invalid("ModelTransformationTag must hold 16 values".into()));
        }
        return Ok(Affine::new(m[0], m[1], m[3], m[4], m[5], m[7]));
    }

    let scale = decoder.find_tag(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE))?
        .map(|v| v.into_f64_vec())
        .transpose()?;
    let tiepoint = decoder.find_tag(Tag::from_u16_exhaustive(MODEL_TIEPOINT))?
        .map(|v| v.into_f64_vec())
        .transpose()?;

    match (scale, tiepoint) {
        (Some(scale), Some(tie)) if scale.len() >= 2 && tie.len() >= 6 => {
            let (sx, sy) = (scale[0], scale[1]);
            let (i, j, x, y) = (tie[0], tie[1], tie[3], tie[4]);
            Ok(Affine::north_up(x - i * sx, y + j * sy, sx, sy))
        }
        _ => Err(GridError::Invalid("missing GeoTIFF georeferencing tags".into())),
    }
}

/// Widen any integer sample buffer to `i64`.
fn widen(image: DecodingResult) -> Result<Vec<i64>, GridError> {
    Ok(match image {
        DecodingResult::U8(v) => v.into_iter().map(i64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(i64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(i64::from).collect(),
        DecodingResult::U64(v) => v.into_iter()
            .map(|x| i64::try_from(x).map_err(|_| GridError::Invalid(format!("sample {x} exceeds i64"))))
            .collect::<Result<_, _>>()?,
        DecodingResult::I8(v) => v.into_iter().map(i64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(i64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(i64::from).collect(),
        DecodingResult::I64(v) => v,
        _ => return Err(GridError::Invalid("floating-point samples cannot hold class codes".into())),
    })
}
