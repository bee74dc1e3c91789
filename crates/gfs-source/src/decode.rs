//! GRIB2 decoding of the 10 m wind components.

use std::io::Cursor;

use forecast_common::{FetchError, GridSpec, WindGrid};
use tracing::debug;

/// GRIB2 discipline 0 (meteorological), category 2 (momentum).
const MOMENTUM_CATEGORY: u8 = 2;
/// Parameter 2.2: u-component of wind.
const UGRD: u8 = 2;
/// Parameter 2.3: v-component of wind.
const VGRD: u8 = 3;

/// Decode a GRIB2 file holding one UGRD and one VGRD field into a grid.
///
/// Fields must be laid out north to south with longitude starting at 0°.
/// Missing values become `0.0`. A field with exactly one extra row (the
/// south pole row of the 0.25° GFS grid) has that row dropped to fit `spec`.
pub fn decode_wind_grid(bytes: &[u8], spec: GridSpec) -> Result<WindGrid, FetchError> {
    let grib_file = grib::from_reader(Cursor::new(bytes))
        .map_err(|e| FetchError::Decode(format!("invalid GRIB2 data: {e}")))?;

    let mut u: Option<Vec<f32>> = None;
    let mut v: Option<Vec<f32>> = None;

    for ((message, submessage), submsg) in grib_file.iter() {
        let prod_def = submsg.prod_def();
        let category = prod_def.parameter_category();
        let number = prod_def.parameter_number();
        debug!(
            message = message,
            submessage = submessage,
            category = ?category,
            number = ?number,
            "Inspecting GRIB2 field"
        );

        let slot = match (category, number) {
            (Some(MOMENTUM_CATEGORY), Some(UGRD)) if u.is_none() => &mut u,
            (Some(MOMENTUM_CATEGORY), Some(VGRD)) if v.is_none() => &mut v,
            _ => continue,
        };

        let decoder = grib::Grib2SubmessageDecoder::from(submsg)
            .map_err(|e| FetchError::Decode(format!("cannot decode field: {e}")))?;
        let values = decoder
            .dispatch()
            .map_err(|e| FetchError::Decode(format!("cannot unpack field: {e}")))?
            .map(|value| if value.is_nan() { 0.0 } else { value })
            .collect::<Vec<f32>>();
        *slot = Some(values);
    }

    let u = u.ok_or_else(|| FetchError::Decode("no UGRD field in file".to_string()))?;
    let v = v.ok_or_else(|| FetchError::Decode("no VGRD field in file".to_string()))?;

    let u = fit_rows(u, spec, "UGRD")?;
    let v = fit_rows(v, spec, "VGRD")?;

    WindGrid::from_components(spec, &u, &v).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Trim a field to `spec`, allowing a single trailing pole row.
fn fit_rows(mut values: Vec<f32>, spec: GridSpec, name: &str) -> Result<Vec<f32>, FetchError> {
    if values.len() == spec.len() {
        return Ok(values);
    }
    if values.len() == spec.len() + spec.width {
        values.truncate(spec.len());
        return Ok(values);
    }
    Err(FetchError::Decode(format!(
        "{name} has {} values, expected {} for a {}x{} grid",
        values.len(),
        spec.len(),
        spec.width,
        spec.height
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_rows_drops_pole_row() {
        let spec = GridSpec::new(3, 2);
        let values: Vec<f32> = (0..9).map(|i| i as f32).collect();
        let fitted = fit_rows(values, spec, "UGRD").unwrap();
        assert_eq!(fitted, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_fit_rows_rejects_other_sizes() {
        let spec = GridSpec::new(3, 2);
        assert!(fit_rows(vec![0.0; 6], spec, "UGRD").is_ok());
        assert!(fit_rows(vec![0.0; 7], spec, "UGRD").is_err());
        assert!(fit_rows(vec![0.0; 12], spec, "UGRD").is_err());
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = decode_wind_grid(b"not a grib file", GridSpec::new(2, 2)).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
