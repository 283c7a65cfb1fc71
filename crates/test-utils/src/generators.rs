//! Test data generators for creating synthetic grid records.
//!
//! These generators create predictable, verifiable data patterns in the
//! JSON record format the external loader produces (header + flat value
//! array), so crates can exercise record parsing and sampling end to end.

use serde_json::{json, Value};

/// Build a JSON grid record header.
///
/// Matches the loader's wire format: origin `(lo1, la1)`, deltas `(dx, dy)`,
/// dimensions `(nx, ny)`, reference time, forecast offset in hours, and the
/// producing center's numeric id.
pub fn record_header(lo1: f64, la1: f64, dx: f64, dy: f64, nx: usize, ny: usize) -> Value {
    json!({
        "lo1": lo1,
        "la1": la1,
        "dx": dx,
        "dy": dy,
        "nx": nx,
        "ny": ny,
        "refTime": "2024-01-15T00:00:00Z",
        "forecastTime": 0,
        "centerId": 7
    })
}

/// Build a scalar grid record from explicit values.
///
/// `None` entries become JSON `null`, the loader's "no value" marker.
pub fn scalar_record(
    lo1: f64,
    la1: f64,
    dx: f64,
    dy: f64,
    nx: usize,
    ny: usize,
    values: &[Option<f64>],
) -> Value {
    assert_eq!(values.len(), nx * ny, "record needs nx * ny values");
    json!({
        "header": record_header(lo1, la1, dx, dy, nx, ny),
        "data": values,
    })
}

/// Build a constant scalar record.
pub fn constant_scalar_record(nx: usize, ny: usize, value: f64) -> Value {
    let values = vec![Some(value); nx * ny];
    scalar_record(0.0, 90.0, 360.0 / nx as f64, 180.0 / (ny.max(2) - 1) as f64, nx, ny, &values)
}

/// Build a pair of u/v component records describing a uniform vector field.
pub fn uniform_vector_records(nx: usize, ny: usize, u: f64, v: f64) -> (Value, Value) {
    (
        constant_scalar_record(nx, ny, u),
        constant_scalar_record(nx, ny, v),
    )
}

/// Build a 1°-resolution globally wrapping scalar record (`nx = 360`), with
/// each cell holding its column index so seam continuity is easy to verify.
pub fn wrapping_scalar_record(ny: usize) -> Value {
    let nx = 360;
    let mut values = Vec::with_capacity(nx * ny);
    for _row in 0..ny {
        for col in 0..nx {
            values.push(Some(col as f64));
        }
    }
    scalar_record(0.0, 90.0, 1.0, 1.0, nx, ny, &values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_record_shape() {
        let rec = scalar_record(0.0, 0.0, 1.0, 1.0, 2, 2, &[Some(1.0), None, Some(3.0), Some(4.0)]);
        assert_eq!(rec["header"]["nx"], 2);
        assert_eq!(rec["data"][1], Value::Null);
        assert_eq!(rec["data"][3], 4.0);
    }

    #[test]
    fn test_wrapping_record_columns() {
        let rec = wrapping_scalar_record(3);
        assert_eq!(rec["header"]["nx"], 360);
        assert_eq!(rec["data"][0], 0.0);
        assert_eq!(rec["data"][359], 359.0);
        assert_eq!(rec["data"][360], 0.0); // second row starts over
    }
}
