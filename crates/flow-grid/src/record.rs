//! Decoded grid records as produced by the external loader.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// Header of one grid record.
///
/// Scan mode 0 is assumed: rows run north to south, columns west to east,
/// longitude increasing from `lo1` and latitude decreasing from `la1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridHeader {
    /// Longitude of the first grid point (degrees east).
    pub lo1: f64,
    /// Latitude of the first grid point (degrees north).
    pub la1: f64,
    /// Longitude spacing between grid points (degrees).
    pub dx: f64,
    /// Latitude spacing between grid points (degrees).
    pub dy: f64,
    /// Number of points west-east.
    pub nx: usize,
    /// Number of points north-south.
    pub ny: usize,
    /// Reference (analysis) time.
    pub ref_time: DateTime<Utc>,
    /// Forecast offset from the reference time, in hours.
    #[serde(default)]
    pub forecast_time: i64,
    /// Numeric id of the producing center.
    #[serde(default)]
    pub center_id: i32,
}

impl GridHeader {
    /// The time this record is valid for.
    pub fn valid_time(&self) -> DateTime<Utc> {
        self.ref_time + Duration::hours(self.forecast_time)
    }

    /// Human-readable attribution for the producing center.
    pub fn source(&self) -> &'static str {
        match self.center_id {
            -3 => "OSCAR / Earth & Space Research",
            7 => "GFS / NCEP / US National Weather Service",
            _ => "unknown center",
        }
    }
}

/// One decoded data record: header plus a flat value table in row-major
/// scan order. `None` entries mark cells with no value.
#[derive(Debug, Clone, Deserialize)]
pub struct GridRecord {
    pub header: GridHeader,
    pub data: Vec<Option<f64>>,
}

impl GridRecord {
    /// Parse a record from the loader's JSON form.
    pub fn from_json(value: serde_json::Value) -> GridResult<Self> {
        let record: GridRecord = serde_json::from_value(value)?;
        record.validate()?;
        Ok(record)
    }

    fn validate(&self) -> GridResult<()> {
        let expected = self.header.nx * self.header.ny;
        if self.data.len() != expected {
            return Err(GridError::DataLengthMismatch {
                expected,
                actual: self.data.len(),
            });
        }
        if self.header.dx == 0.0 || self.header.dy == 0.0 {
            return Err(GridError::DegenerateSpacing {
                dx: self.header.dx,
                dy: self.header.dy,
            });
        }
        Ok(())
    }
}

/// The valid time of the chronologically next or previous data layer.
///
/// Steps of ±1 move in 3-hour jumps; larger steps move in 24-hour jumps,
/// matching the cadence of GFS runs.
pub fn navigate_step(date: DateTime<Utc>, step: i32) -> DateTime<Utc> {
    let hours = match step {
        s if s > 1 => 24,
        s if s < -1 => -24,
        s => s as i64 * 3,
    };
    date + Duration::hours(hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header_json() -> serde_json::Value {
        json!({
            "lo1": 0.0, "la1": 90.0, "dx": 1.0, "dy": 1.0,
            "nx": 2, "ny": 2,
            "refTime": "2024-01-15T06:00:00Z",
            "forecastTime": 6,
            "centerId": 7
        })
    }

    #[test]
    fn test_parse_record() {
        let rec = GridRecord::from_json(json!({
            "header": header_json(),
            "data": [1.0, null, 3.0, 4.0],
        }))
        .unwrap();
        assert_eq!(rec.header.nx, 2);
        assert_eq!(rec.data[1], None);
        assert_eq!(rec.header.source(), "GFS / NCEP / US National Weather Service");
    }

    #[test]
    fn test_valid_time_applies_forecast_offset() {
        let rec = GridRecord::from_json(json!({
            "header": header_json(),
            "data": [1.0, 2.0, 3.0, 4.0],
        }))
        .unwrap();
        assert_eq!(
            rec.header.valid_time().to_rfc3339(),
            "2024-01-15T12:00:00+00:00"
        );
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = GridRecord::from_json(json!({
            "header": header_json(),
            "data": [1.0, 2.0],
        }))
        .unwrap_err();
        assert!(matches!(err, GridError::DataLengthMismatch { expected: 4, actual: 2 }));
    }

    #[test]
    fn test_navigate_step_cadence() {
        let t = "2024-01-15T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(navigate_step(t, 1) - t, Duration::hours(3));
        assert_eq!(navigate_step(t, -1) - t, Duration::hours(-3));
        assert_eq!(navigate_step(t, 10) - t, Duration::hours(24));
        assert_eq!(navigate_step(t, -10) - t, Duration::hours(-24));
    }
}
