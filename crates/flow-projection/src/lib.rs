//! Globe projections and projection-distortion sampling.
//!
//! Implements map projections from scratch without external dependencies.
//! Projections are fixed variants selected at construction; all of them
//! expose the same interface of forward map, inverse map, scale bounds and
//! boundary outline.

pub mod distortion;
pub mod equirectangular;
pub mod orthographic;

pub use distortion::{distort_vector, distortion, DISTORTION_STEP};
pub use equirectangular::Equirectangular;
pub use orthographic::Orthographic;

/// A globe projection between geographic and pixel coordinates.
///
/// Implementations are immutable after construction. `forward` returns
/// `None` for geographic points with no pixel image (e.g. the back
/// hemisphere of an orthographic globe); `invert` returns `None` for pixels
/// outside the projected globe.
pub trait Projection: Send + Sync {
    /// Map (lon, lat) in degrees to pixel (x, y).
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)>;

    /// Map pixel (x, y) back to (lon, lat) in degrees.
    fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)>;

    /// Minimum and maximum zoom scales for this projection.
    fn scale_bounds(&self) -> (f64, f64);

    /// The globe's outer boundary as a closed polygon in pixel space,
    /// suitable for scanline rasterization into a visibility mask.
    fn outline(&self) -> Vec<(f64, f64)>;

    /// Pixel-space rectangle enclosing the projected globe:
    /// (upper-left, lower-right).
    fn extent(&self) -> ((f64, f64), (f64, f64));
}
