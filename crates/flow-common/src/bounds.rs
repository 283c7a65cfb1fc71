//! Pixel-space view bounds.

use serde::{Deserialize, Serialize};

/// A clamped, inclusive pixel rectangle within a viewport.
///
/// `x..=x_max` and `y..=y_max` are the pixel columns and rows a stage may
/// touch. Bounds are always clamped to the viewport at construction, so
/// consumers can index rasters without further range checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBounds {
    pub x: usize,
    pub y: usize,
    pub x_max: usize,
    pub y_max: usize,
}

impl ViewBounds {
    /// Clamp a raw rectangle (floating-point, possibly out of range) to the
    /// viewport `width` x `height`.
    ///
    /// `upper_left` and `lower_right` are pixel coordinates as produced by a
    /// projection's extent; non-finite values fall back to the full viewport.
    pub fn clamped(
        upper_left: (f64, f64),
        lower_right: (f64, f64),
        width: usize,
        height: usize,
    ) -> Self {
        let finite = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };

        let x = finite(upper_left.0, 0.0).floor().max(0.0) as usize;
        let y = finite(upper_left.1, 0.0).floor().max(0.0) as usize;
        let x_max = (finite(lower_right.0, width as f64).ceil() as usize).min(width - 1);
        let y_max = (finite(lower_right.1, height as f64).ceil() as usize).min(height - 1);

        Self {
            x,
            y,
            x_max: x_max.max(x),
            y_max: y_max.max(y),
        }
    }

    /// Bounds covering an entire viewport.
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            x: 0,
            y: 0,
            x_max: width.saturating_sub(1),
            y_max: height.saturating_sub(1),
        }
    }

    /// Width in pixels (inclusive bounds).
    pub fn width(&self) -> usize {
        self.x_max - self.x + 1
    }

    /// Height in pixels (inclusive bounds).
    pub fn height(&self) -> usize {
        self.y_max - self.y + 1
    }

    /// Check if a pixel lies within the bounds.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x as f64 && x <= self.x_max as f64 && y >= self.y as f64 && y <= self.y_max as f64
    }
}
