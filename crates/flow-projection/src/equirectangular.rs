//! Equirectangular (plate carrée) projection.

use crate::Projection;

/// Linear lon/lat to pixel mapping, centered on `lon0`.
///
/// The whole world maps to a rectangle of `360 * scale` by `180 * scale`
/// pixels around `translate`; scale is in pixels per degree.
#[derive(Debug, Clone)]
pub struct Equirectangular {
    lon0: f64,
    scale: f64,
    translate: (f64, f64),
}

impl Equirectangular {
    /// Projection filling a viewport width with the full circle of
    /// longitudes.
    pub fn fit(view_width: usize, view_height: usize, lon0: f64) -> Self {
        Self {
            lon0,
            scale: view_width as f64 / 360.0,
            translate: (view_width as f64 / 2.0, view_height as f64 / 2.0),
        }
    }

    pub fn new(lon0: f64, scale: f64, translate: (f64, f64)) -> Self {
        Self {
            lon0,
            scale,
            translate,
        }
    }

    /// Relative longitude wrapped into [-180, 180).
    fn wrap(&self, lon: f64) -> f64 {
        let d = lon - self.lon0;
        d - 360.0 * ((d + 180.0) / 360.0).floor()
    }
}

impl Projection for Equirectangular {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !(-90.0..=90.0).contains(&lat) {
            return None;
        }
        Some((
            self.translate.0 + self.wrap(lon) * self.scale,
            self.translate.1 - lat * self.scale,
        ))
    }

    fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let lon = (x - self.translate.0) / self.scale;
        let lat = -(y - self.translate.1) / self.scale;
        if !(-180.0..180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return None;
        }
        Some((lon + self.lon0, lat))
    }

    fn scale_bounds(&self) -> (f64, f64) {
        (self.scale * 0.25, self.scale * 4.0)
    }

    fn outline(&self) -> Vec<(f64, f64)> {
        let ((x0, y0), (x1, y1)) = self.extent();
        vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
    }

    fn extent(&self) -> ((f64, f64), (f64, f64)) {
        (
            (
                self.translate.0 - 180.0 * self.scale,
                self.translate.1 - 90.0 * self.scale,
            ),
            (
                self.translate.0 + 180.0 * self.scale,
                self.translate.1 + 90.0 * self.scale,
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_coords_approx_eq;

    #[test]
    fn test_identityish_mapping() {
        // Unit scale centered at the origin behaves as P(lon, lat) = (lon, -lat).
        let p = Equirectangular::new(0.0, 1.0, (0.0, 0.0));
        let (x, y) = p.forward(30.0, 40.0).unwrap();
        assert_coords_approx_eq!((x, y), (30.0, -40.0), 1e-12);
    }

    #[test]
    fn test_roundtrip() {
        let p = Equirectangular::fit(720, 360, 0.0);
        let (x, y) = p.forward(-123.5, 48.25).unwrap();
        let (lon, lat) = p.invert(x, y).unwrap();
        assert_coords_approx_eq!((lon, lat), (-123.5, 48.25), 1e-9);
    }

    #[test]
    fn test_longitude_wrap() {
        let p = Equirectangular::new(0.0, 1.0, (0.0, 0.0));
        let (x1, _) = p.forward(190.0, 0.0).unwrap();
        let (x2, _) = p.forward(-170.0, 0.0).unwrap();
        assert_coords_approx_eq!((x1, 0.0), (x2, 0.0), 1e-12);
    }

    #[test]
    fn test_invert_outside_world_rect() {
        let p = Equirectangular::fit(720, 360, 0.0);
        assert!(p.invert(-10.0, 100.0).is_none());
        assert!(p.invert(100.0, 500.0).is_none());
    }
}
