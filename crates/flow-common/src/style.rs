//! Color scales for overlay rasters and particle trails.

use std::f64::consts::TAU;

use crate::color::{ColorInterpolator, Rgba};
use crate::math::proportion;

/// Hue fraction at which the extended sinebow stops cycling and fades to
/// white instead.
const SINEBOW_BOUNDARY: f64 = 0.45;

/// Default gray increment between particle trail speed buckets.
pub const INTENSITY_SCALE_STEP: u8 = 10;

/// Color in a rainbow-like trefoil color space. Not quite HSV, but produces
/// a nice spectrum.
///
/// `hue` is in [0, 1]; `alpha` in [0, 255].
pub fn sinebow_color(hue: f64, alpha: u8) -> Rgba {
    // Map hue [0, 1] to radians [0, 5/6 tau]. A full rotation would map
    // hue 0 and hue 1 to the same color.
    let mut rad = hue * TAU * 5.0 / 6.0;
    rad *= 0.75; // increase frequency to 2/3 cycle per rad

    let s = rad.sin();
    let c = rad.cos();
    let r = ((-c).max(0.0) * 255.0).floor() as u8;
    let g = (s.max(0.0) * 255.0).floor() as u8;
    let b = (c.max(0.0).max(-s) * 255.0).floor() as u8;
    [r, g, b, alpha]
}

/// Sinebow color for `i <= 0.45`, fading to white above that.
///
/// Used for wind speed overlays, where the top of the range reads as a
/// washed-out "extreme" band.
pub fn extended_sinebow_color(i: f64, alpha: u8) -> Rgba {
    if i <= SINEBOW_BOUNDARY {
        sinebow_color(i / SINEBOW_BOUNDARY, alpha)
    } else {
        let end = sinebow_color(1.0, 0);
        let fade = ColorInterpolator::new([end[0], end[1], end[2]], [255, 255, 255]);
        fade.at((i - SINEBOW_BOUNDARY) / (1.0 - SINEBOW_BOUNDARY), alpha)
    }
}

/// A piecewise-linear gradient over `[value, rgb]` stops.
#[derive(Debug, Clone)]
pub struct SegmentedColorScale {
    points: Vec<f64>,
    ranges: Vec<(f64, f64)>,
    interpolators: Vec<ColorInterpolator>,
}

impl SegmentedColorScale {
    /// Build a scale from ordered `(value, [r, g, b])` stops.
    ///
    /// # Panics
    /// Panics if fewer than two stops are supplied.
    pub fn new(stops: &[(f64, [u8; 3])]) -> Self {
        assert!(stops.len() >= 2, "a gradient needs at least two stops");
        let mut points = Vec::new();
        let mut ranges = Vec::new();
        let mut interpolators = Vec::new();
        for pair in stops.windows(2) {
            points.push(pair[1].0);
            ranges.push((pair[0].0, pair[1].0));
            interpolators.push(ColorInterpolator::new(pair[0].1, pair[1].1));
        }
        Self {
            points,
            ranges,
            interpolators,
        }
    }

    /// Color for `point`, clamped to the scale's ends.
    pub fn gradient(&self, point: f64, alpha: u8) -> Rgba {
        let mut i = 0;
        while i < self.points.len() - 1 {
            if point <= self.points[i] {
                break;
            }
            i += 1;
        }
        let (low, high) = self.ranges[i];
        self.interpolators[i].at(proportion(point, low, high), alpha)
    }
}

/// How a product maps its interpolated scalar onto an overlay color.
#[derive(Debug, Clone)]
pub enum ColorScale {
    /// Sinebow spectrum over `[0, max]`.
    Sinebow { max: f64 },
    /// Extended sinebow (fade to white at the top) over `[0, max]`.
    ExtendedSinebow { max: f64 },
    /// Explicit gradient stops.
    Segmented(SegmentedColorScale),
}

impl ColorScale {
    pub fn gradient(&self, value: f64, alpha: u8) -> Rgba {
        match self {
            ColorScale::Sinebow { max } => sinebow_color(value.min(*max) / max, alpha),
            ColorScale::ExtendedSinebow { max } => {
                extended_sinebow_color(value.min(*max) / max, alpha)
            }
            ColorScale::Segmented(scale) => scale.gradient(value, alpha),
        }
    }
}

/// Grayscale ramp for particle trails, bucketed by speed.
///
/// Brighter trails mean faster flow. `index_for` maps a speed onto a bucket
/// index, monotonically and clamped to the last bucket.
#[derive(Debug, Clone)]
pub struct IntensityRamp {
    colors: Vec<Rgba>,
    max_intensity: f64,
}

impl IntensityRamp {
    /// Ramp from gray 85 to 255 in increments of `step`, saturating at
    /// `max_intensity` (the speed drawn with the brightest color).
    pub fn grayscale(step: u8, max_intensity: f64) -> Self {
        let mut colors = Vec::new();
        let mut j = 85u16;
        while j <= 255 {
            let v = j as u8;
            colors.push([v, v, v, 255]);
            j += step as u16;
        }
        Self {
            colors,
            max_intensity,
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color(&self, index: usize) -> Rgba {
        self.colors[index]
    }

    /// Bucket index for a speed: `floor(min(speed, max) / max * (len - 1))`.
    pub fn index_for(&self, speed: f64) -> usize {
        (speed.min(self.max_intensity) / self.max_intensity * (self.colors.len() - 1) as f64)
            .floor() as usize
    }
}
