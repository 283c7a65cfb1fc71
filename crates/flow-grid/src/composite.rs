//! Composite grids combining several records analytically.

use crate::grid::{ScalarGrid, ScalarSampler, VectorGrid};

/// Wind power density: `0.5 * rho * |v|^3` over a wind grid and an air
/// density grid.
///
/// Each sub-grid is interpolated with the usual four-corner weighting and
/// the physical combination is applied to the interpolated values.
/// Interpolation and combination do not commute, so the combined quantity
/// is never interpolated directly.
#[derive(Debug, Clone)]
pub struct WindPowerGrid {
    wind: VectorGrid,
    air_density: ScalarGrid,
}

impl WindPowerGrid {
    pub fn new(wind: VectorGrid, air_density: ScalarGrid) -> Self {
        Self { wind, air_density }
    }

    /// Power density in W/m² at a geographic coordinate.
    pub fn sample(&self, lon: f64, lat: f64) -> Option<f64> {
        let m = self.wind.sample(lon, lat)?.magnitude;
        let rho = self.air_density.sample(lon, lat)?;
        Some(0.5 * rho * m * m * m)
    }

    pub fn wind(&self) -> &VectorGrid {
        &self.wind
    }
}

impl ScalarSampler for WindPowerGrid {
    fn sample_scalar(&self, lon: f64, lat: f64) -> Option<f64> {
        self.sample(lon, lat)
    }
}
