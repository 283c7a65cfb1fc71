//! Immutable samplable grids with bilinear interpolation.

use crate::error::{GridError, GridResult};
use crate::geometry::GridGeometry;
use crate::record::{GridHeader, GridRecord};

/// An interpolated flow vector: components plus the Euclidean magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowVector {
    pub u: f64,
    pub v: f64,
    pub magnitude: f64,
}

impl FlowVector {
    pub fn new(u: f64, v: f64) -> Self {
        Self {
            u,
            v,
            magnitude: (u * u + v * v).sqrt(),
        }
    }
}

/// Anything that can produce an interpolated scalar at a geographic point.
///
/// This is the seam the field builder samples overlay quantities through:
/// plain scalar grids, vector grids (magnitude) and analytic composites all
/// implement it.
pub trait ScalarSampler: Send + Sync {
    fn sample_scalar(&self, lon: f64, lat: f64) -> Option<f64>;
}

/// Weighted sum of the four corner scalars of a unit cell.
fn bilinear_scalar(fx: f64, fy: f64, g00: f64, g10: f64, g01: f64, g11: f64) -> f64 {
    let rx = 1.0 - fx;
    let ry = 1.0 - fy;
    g00 * rx * ry + g10 * fx * ry + g01 * rx * fy + g11 * fx * fy
}

/// Bilinear interpolation of a vector cell, weighting each component
/// independently and deriving the magnitude from the result.
fn bilinear_vector(
    fx: f64,
    fy: f64,
    g00: (f64, f64),
    g10: (f64, f64),
    g01: (f64, f64),
    g11: (f64, f64),
) -> FlowVector {
    let rx = 1.0 - fx;
    let ry = 1.0 - fy;
    let (a, b, c, d) = (rx * ry, fx * ry, rx * fy, fx * fy);
    let u = g00.0 * a + g10.0 * b + g01.0 * c + g11.0 * d;
    let v = g00.1 * a + g10.1 * b + g01.1 * c + g11.1 * d;
    FlowVector::new(u, v)
}

/// Immutable wrapper over one scalar record.
///
/// For wrapping grids the first column is stored again as the last column
/// of every row, so the interpolation cell's right edge never needs a
/// modulo.
#[derive(Debug, Clone)]
pub struct ScalarGrid {
    header: GridHeader,
    geometry: GridGeometry,
    values: Vec<Option<f64>>,
}

impl ScalarGrid {
    pub fn from_record(record: GridRecord) -> GridResult<Self> {
        let geometry = GridGeometry::from_header(&record.header);
        let values = duplicate_wrap_column(&record.data, &geometry);
        Ok(Self {
            header: record.header,
            geometry,
            values,
        })
    }

    pub fn header(&self) -> &GridHeader {
        &self.header
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    fn corner(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.geometry.row_len() || j >= self.geometry.ny {
            return None;
        }
        self.values[j * self.geometry.row_len() + i]
    }

    /// Bilinear sample at a geographic coordinate.
    ///
    /// Returns `None` when any of the four surrounding corners is missing
    /// or out of range.
    pub fn sample(&self, lon: f64, lat: f64) -> Option<f64> {
        let cell = self.geometry.cell(lon, lat)?;
        let g00 = self.corner(cell.fi, cell.fj)?;
        let g10 = self.corner(cell.fi + 1, cell.fj)?;
        let g01 = self.corner(cell.fi, cell.fj + 1)?;
        let g11 = self.corner(cell.fi + 1, cell.fj + 1)?;
        Some(bilinear_scalar(cell.fx, cell.fy, g00, g10, g01, g11))
    }

    /// Visit every grid point with its geographic coordinate and value.
    pub fn for_each_point<F: FnMut(f64, f64, Option<f64>)>(&self, mut f: F) {
        for j in 0..self.geometry.ny {
            for i in 0..self.geometry.nx {
                let (lon, lat) = self.geometry.point(i, j);
                f(lon, lat, self.values[j * self.geometry.row_len() + i]);
            }
        }
    }
}

impl ScalarSampler for ScalarGrid {
    fn sample_scalar(&self, lon: f64, lat: f64) -> Option<f64> {
        self.sample(lon, lat)
    }
}

/// Immutable wrapper over a pair of u/v component records.
#[derive(Debug, Clone)]
pub struct VectorGrid {
    header: GridHeader,
    geometry: GridGeometry,
    values: Vec<Option<(f64, f64)>>,
}

impl VectorGrid {
    /// Combine u- and v-component records by positional index alignment.
    ///
    /// A cell where either component is missing becomes a hole.
    pub fn from_records(u_record: GridRecord, v_record: GridRecord) -> GridResult<Self> {
        let uh = &u_record.header;
        let vh = &v_record.header;
        if uh.nx != vh.nx || uh.ny != vh.ny || uh.lo1 != vh.lo1 || uh.la1 != vh.la1 {
            return Err(GridError::ComponentMismatch(format!(
                "u is {}x{} at ({}, {}), v is {}x{} at ({}, {})",
                uh.nx, uh.ny, uh.lo1, uh.la1, vh.nx, vh.ny, vh.lo1, vh.la1
            )));
        }

        let geometry = GridGeometry::from_header(uh);
        let combined: Vec<Option<(f64, f64)>> = u_record
            .data
            .iter()
            .zip(v_record.data.iter())
            .map(|(u, v)| match (u, v) {
                (Some(u), Some(v)) => Some((*u, *v)),
                _ => None,
            })
            .collect();
        let values = duplicate_wrap_column(&combined, &geometry);
        Ok(Self {
            header: u_record.header,
            geometry,
            values,
        })
    }

    pub fn header(&self) -> &GridHeader {
        &self.header
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    fn corner(&self, i: usize, j: usize) -> Option<(f64, f64)> {
        if i >= self.geometry.row_len() || j >= self.geometry.ny {
            return None;
        }
        self.values[j * self.geometry.row_len() + i]
    }

    /// Bilinear sample at a geographic coordinate.
    pub fn sample(&self, lon: f64, lat: f64) -> Option<FlowVector> {
        let cell = self.geometry.cell(lon, lat)?;
        let g00 = self.corner(cell.fi, cell.fj)?;
        let g10 = self.corner(cell.fi + 1, cell.fj)?;
        let g01 = self.corner(cell.fi, cell.fj + 1)?;
        let g11 = self.corner(cell.fi + 1, cell.fj + 1)?;
        Some(bilinear_vector(cell.fx, cell.fy, g00, g10, g01, g11))
    }
}

impl ScalarSampler for VectorGrid {
    fn sample_scalar(&self, lon: f64, lat: f64) -> Option<f64> {
        self.sample(lon, lat).map(|v| v.magnitude)
    }
}

/// Lay out row-major values, appending a copy of column 0 to each row when
/// the grid wraps.
fn duplicate_wrap_column<T: Copy>(data: &[T], geometry: &GridGeometry) -> Vec<T> {
    if !geometry.wraps {
        return data.to_vec();
    }
    let mut values = Vec::with_capacity(geometry.row_len() * geometry.ny);
    for row in data.chunks(geometry.nx) {
        values.extend_from_slice(row);
        values.push(row[0]);
    }
    values
}
