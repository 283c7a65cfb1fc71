//! Orthographic (globe-from-space) projection.

use std::f64::consts::PI;

use crate::Projection;

/// Number of polygon points used to approximate the spherical outline.
const OUTLINE_POINTS: usize = 360;

/// Orthographic projection of a sphere centered on (lon0, lat0), drawn at
/// pixel radius `scale` around the pixel `translate`.
#[derive(Debug, Clone)]
pub struct Orthographic {
    lon0: f64,
    lat0: f64,
    scale: f64,
    translate: (f64, f64),
    sin_lat0: f64,
    cos_lat0: f64,
}

impl Orthographic {
    /// Projection filling a viewport, centered on the given geographic
    /// coordinate. The sphere radius is 90% of the smaller view dimension.
    pub fn fit(view_width: usize, view_height: usize, lon0: f64, lat0: f64) -> Self {
        let scale = 0.9 * (view_width.min(view_height) as f64) / 2.0;
        Self::new(
            lon0,
            lat0,
            scale,
            (view_width as f64 / 2.0, view_height as f64 / 2.0),
        )
    }

    pub fn new(lon0: f64, lat0: f64, scale: f64, translate: (f64, f64)) -> Self {
        let lat0_rad = lat0.to_radians();
        Self {
            lon0,
            lat0,
            scale,
            translate,
            sin_lat0: lat0_rad.sin(),
            cos_lat0: lat0_rad.cos(),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn center(&self) -> (f64, f64) {
        (self.lon0, self.lat0)
    }
}

impl Projection for Orthographic {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let dlon = (lon - self.lon0).to_radians();
        let lat = lat.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_dlon, cos_dlon) = dlon.sin_cos();

        // Angular distance from the projection center; negative means the
        // point is on the far hemisphere.
        let cos_c = self.sin_lat0 * sin_lat + self.cos_lat0 * cos_lat * cos_dlon;
        if cos_c < 0.0 {
            return None;
        }

        let x = self.scale * cos_lat * sin_dlon;
        let y = self.scale * (self.cos_lat0 * sin_lat - self.sin_lat0 * cos_lat * cos_dlon);
        Some((self.translate.0 + x, self.translate.1 - y))
    }

    fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let px = (x - self.translate.0) / self.scale;
        let py = -(y - self.translate.1) / self.scale;
        let rho = (px * px + py * py).sqrt();
        if rho > 1.0 {
            return None;
        }
        if rho == 0.0 {
            return Some((self.lon0, self.lat0));
        }

        let c = rho.asin();
        let (sin_c, cos_c) = c.sin_cos();

        let lat = (cos_c * self.sin_lat0 + py * sin_c * self.cos_lat0 / rho).asin();
        let lon = self.lon0.to_radians()
            + (px * sin_c).atan2(rho * cos_c * self.cos_lat0 - py * sin_c * self.sin_lat0);
        Some((lon.to_degrees(), lat.to_degrees()))
    }

    fn scale_bounds(&self) -> (f64, f64) {
        (self.scale * 0.25, self.scale * 4.0)
    }

    fn outline(&self) -> Vec<(f64, f64)> {
        (0..OUTLINE_POINTS)
            .map(|i| {
                let theta = i as f64 / OUTLINE_POINTS as f64 * 2.0 * PI;
                (
                    self.translate.0 + self.scale * theta.cos(),
                    self.translate.1 + self.scale * theta.sin(),
                )
            })
            .collect()
    }

    fn extent(&self) -> ((f64, f64), (f64, f64)) {
        (
            (self.translate.0 - self.scale, self.translate.1 - self.scale),
            (self.translate.0 + self.scale, self.translate.1 + self.scale),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_coords_approx_eq;

    #[test]
    fn test_center_maps_to_translate() {
        let p = Orthographic::new(10.0, 20.0, 100.0, (320.0, 240.0));
        let (x, y) = p.forward(10.0, 20.0).unwrap();
        assert_coords_approx_eq!((x, y), (320.0, 240.0), 1e-9);
    }

    #[test]
    fn test_far_hemisphere_not_projected() {
        let p = Orthographic::new(0.0, 0.0, 100.0, (0.0, 0.0));
        assert!(p.forward(179.0, 0.0).is_none());
        assert!(p.forward(0.0, 0.0).is_some());
    }

    #[test]
    fn test_forward_invert_roundtrip() {
        let p = Orthographic::new(-30.0, 45.0, 200.0, (400.0, 300.0));
        for &(lon, lat) in &[(-30.0, 45.0), (-50.0, 30.0), (0.0, 80.0), (-30.0, -20.0)] {
            let (x, y) = p.forward(lon, lat).unwrap();
            let (lon2, lat2) = p.invert(x, y).unwrap();
            assert_coords_approx_eq!((lon2, lat2), (lon, lat), 1e-6);
        }
    }

    #[test]
    fn test_invert_outside_sphere() {
        let p = Orthographic::new(0.0, 0.0, 100.0, (200.0, 200.0));
        assert!(p.invert(350.0, 200.0).is_none());
        assert!(p.invert(200.0, 200.0).is_some());
    }

    #[test]
    fn test_north_pole_above_center_when_centered_on_equator() {
        let p = Orthographic::new(0.0, 0.0, 100.0, (200.0, 200.0));
        let (x, y) = p.forward(0.0, 90.0).unwrap();
        assert_coords_approx_eq!((x, y), (200.0, 100.0), 1e-9);
    }
}
