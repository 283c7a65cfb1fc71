//! Projection distortion sampling by finite differences.

use crate::Projection;

/// Angular step used for the finite-difference estimate.
/// 0.0000360° of latitude is roughly 4 meters.
pub const DISTORTION_STEP: f64 = 0.0000360;

/// Local distortion of a projection at the given point.
///
/// Adds a very small amount `h` to longitude and latitude to create two
/// short lines, projects both, and reads the diagonals as partial
/// derivatives `[dx/dlon, dy/dlon, dx/dlat, dy/dlat]` of the projection at
/// `(lon, lat)`. `(x, y)` must be `projection.forward(lon, lat)`.
///
/// The step is signed toward the equator and prime meridian so the probe
/// never leaves the projection's domain at its edges, and the longitude
/// derivatives carry a `cos(lat)` meridian scale factor (Snyder eq. 4-3)
/// so a degree of longitude shrinks toward the poles instead of pinching.
pub fn distortion(
    projection: &dyn Projection,
    lon: f64,
    lat: f64,
    x: f64,
    y: f64,
) -> Option<[f64; 4]> {
    let h_lon = if lon < 0.0 {
        DISTORTION_STEP
    } else {
        -DISTORTION_STEP
    };
    let h_lat = if lat < 0.0 {
        DISTORTION_STEP
    } else {
        -DISTORTION_STEP
    };

    let (px, py) = projection.forward(lon + h_lon, lat)?;
    let (qx, qy) = projection.forward(lon, lat + h_lat)?;

    let k = lat.to_radians().cos();

    Some([
        (px - x) / h_lon / k,
        (py - y) / h_lon / k,
        (qx - x) / h_lat,
        (qy - y) / h_lat,
    ])
}

/// Map a geographic vector (u, v) into screen space at `(x, y)`, scaled by
/// `scale`.
///
/// Returns `None` when the projection is not differentiable at the point
/// (a probe fell off the projected globe).
pub fn distort_vector(
    projection: &dyn Projection,
    lon: f64,
    lat: f64,
    x: f64,
    y: f64,
    scale: f64,
    u: f64,
    v: f64,
) -> Option<(f64, f64)> {
    let d = distortion(projection, lon, lat, x, y)?;
    let u = u * scale;
    let v = v * scale;
    Some((d[0] * u + d[2] * v, d[1] * u + d[3] * v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Equirectangular;
    use test_utils::{assert_approx_eq, assert_coords_approx_eq};

    #[test]
    fn test_identity_projection_identity_tensor() {
        // Unit-scale equirectangular at the equator is P(lon, lat) = (lon, -lat)
        // up to the screen's inverted y axis, so the tensor is the identity
        // with a sign flip on dy/dlat.
        let p = Equirectangular::new(0.0, 1.0, (0.0, 0.0));
        let (x, y) = p.forward(10.0, 0.0).unwrap();
        let d = distortion(&p, 10.0, 0.0, x, y).unwrap();
        assert_approx_eq!(d[0], 1.0, 1e-6);
        assert_approx_eq!(d[1], 0.0, 1e-6);
        assert_approx_eq!(d[2], 0.0, 1e-6);
        assert_approx_eq!(d[3], -1.0, 1e-6);
    }

    #[test]
    fn test_identity_projection_passes_vector_through() {
        let p = Equirectangular::new(0.0, 1.0, (0.0, 0.0));
        let (x, y) = p.forward(10.0, 0.0).unwrap();
        let (du, dv) = distort_vector(&p, 10.0, 0.0, x, y, 1.0, 3.0, 4.0).unwrap();
        // Screen y grows downward, so a northward v points up (-y).
        assert_coords_approx_eq!((du, dv), (3.0, -4.0), 1e-6);
    }

    #[test]
    fn test_meridian_scale_compensates_latitude() {
        // At 60°N a degree of longitude spans half the pixels it does at the
        // equator; the cos(lat) factor folds that back out of dx/dlon.
        let p = Equirectangular::new(0.0, 1.0, (0.0, 0.0));
        let (x, y) = p.forward(10.0, 60.0).unwrap();
        let d = distortion(&p, 10.0, 60.0, x, y).unwrap();
        assert_approx_eq!(d[0], 2.0, 1e-6);
    }
}
