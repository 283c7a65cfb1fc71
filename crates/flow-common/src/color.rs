//! RGBA color primitives.

/// An RGBA color, one byte per channel.
pub type Rgba = [u8; 4];

/// Fully transparent black, the "no overlay" pixel.
pub const TRANSPARENT_BLACK: Rgba = [0, 0, 0, 0];

/// Overlay transparency on the [0, 255] scale (40% opaque).
pub const OVERLAY_ALPHA: u8 = (0.4 * 255.0) as u8;

/// Linear interpolation between two RGB endpoints.
///
/// Captures the endpoints once so gradient scales can precompute their
/// per-segment interpolators.
#[derive(Debug, Clone, Copy)]
pub struct ColorInterpolator {
    start: [f64; 3],
    delta: [f64; 3],
}

impl ColorInterpolator {
    pub fn new(start: [u8; 3], end: [u8; 3]) -> Self {
        let s = [start[0] as f64, start[1] as f64, start[2] as f64];
        Self {
            start: s,
            delta: [
                end[0] as f64 - s[0],
                end[1] as f64 - s[1],
                end[2] as f64 - s[2],
            ],
        }
    }

    /// Color at fraction `i` in [0, 1], with the given alpha.
    pub fn at(&self, i: f64, alpha: u8) -> Rgba {
        [
            (self.start[0] + i * self.delta[0]).floor() as u8,
            (self.start[1] + i * self.delta[1]).floor() as u8,
            (self.start[2] + i * self.delta[2]).floor() as u8,
            alpha,
        ]
    }
}
