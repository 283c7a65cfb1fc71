//! Grid coordinate geometry: fractional indices and longitude wrap.

use flow_common::math::floor_mod;

use crate::record::GridHeader;

/// Fractional grid cell for a geographic coordinate.
///
/// `fi`/`fj` are the floor corner indices; `fx`/`fy` the offsets within the
/// unit cell, used as bilinear weights.
#[derive(Debug, Clone, Copy)]
pub struct CellIndex {
    pub fi: usize,
    pub fj: usize,
    pub fx: f64,
    pub fy: f64,
}

/// Coordinate layout of a rectangular lat/lon grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    /// Origin longitude (degrees east).
    pub lo1: f64,
    /// Origin latitude (degrees north).
    pub la1: f64,
    /// Longitude spacing (degrees).
    pub dx: f64,
    /// Latitude spacing (degrees).
    pub dy: f64,
    /// Number of points west-east.
    pub nx: usize,
    /// Number of points north-south.
    pub ny: usize,
    /// True when the grid covers the full circle of longitudes, in which
    /// case column 0 is logically duplicated as column `nx`.
    pub wraps: bool,
}

impl GridGeometry {
    pub fn from_header(header: &GridHeader) -> Self {
        Self {
            lo1: header.lo1,
            la1: header.la1,
            dx: header.dx,
            dy: header.dy,
            nx: header.nx,
            ny: header.ny,
            wraps: (header.nx as f64 * header.dx).floor() >= 360.0,
        }
    }

    /// Width of the backing row once the wrap column is duplicated.
    pub fn row_len(&self) -> usize {
        if self.wraps {
            self.nx + 1
        } else {
            self.nx
        }
    }

    /// Fractional column index for a longitude, wrapped into [0, 360).
    pub fn fractional_i(&self, lon: f64) -> f64 {
        floor_mod(lon - self.lo1, 360.0) / self.dx
    }

    /// Fractional row index for a latitude (increasing southward from la1).
    pub fn fractional_j(&self, lat: f64) -> f64 {
        (self.la1 - lat) / self.dy
    }

    /// Locate the unit cell around a geographic coordinate.
    ///
    /// Returns `None` when the floor corner falls outside the grid. For
    /// wrapping grids the duplicated last column means `fi + 1` is always a
    /// valid column index without a modulo; for non-wrapping grids the
    /// caller's corner lookup handles `fi + 1 == nx` as out of range.
    pub fn cell(&self, lon: f64, lat: f64) -> Option<CellIndex> {
        let i = self.fractional_i(lon);
        let j = self.fractional_j(lat);
        if !i.is_finite() || !j.is_finite() || j < 0.0 {
            return None;
        }
        let fi = i.floor();
        let fj = j.floor();
        if fi < 0.0 || fi as usize >= self.row_len() || fj as usize >= self.ny {
            return None;
        }
        Some(CellIndex {
            fi: fi as usize,
            fj: fj as usize,
            fx: i - fi,
            fy: j - fj,
        })
    }

    /// Geographic coordinate of grid point `(i, j)`, longitude normalized
    /// to [-180, 180).
    pub fn point(&self, i: usize, j: usize) -> (f64, f64) {
        let lon = floor_mod(180.0 + self.lo1 + i as f64 * self.dx, 360.0) - 180.0;
        let lat = self.la1 - j as f64 * self.dy;
        (lon, lat)
    }
}
