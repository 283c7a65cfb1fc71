//! The published pixel field: distorted vectors plus the overlay raster.

use std::sync::{Arc, RwLock};

use flow_common::ViewBounds;
use rand::Rng;

/// Attempts at finding an animatable pixel before giving up and accepting
/// whatever position the last draw produced.
const MAX_RANDOMIZE_ATTEMPTS: usize = 30;

/// One field cell, stored densely per pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Cell {
    /// Off the projected globe, or the field has been released.
    Outside,
    /// On the globe but the source data has no value here.
    Hole,
    /// Screen-space motion per frame plus the geographic magnitude.
    Vector(f32, f32, f32),
}

/// Result of a field lookup at a pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldSample {
    Outside,
    Hole,
    Vector { u: f64, v: f64, magnitude: f64 },
}

/// An immutable snapshot of screen-space flow, one cell per visible pixel.
///
/// Lookups round fractional pixel coordinates to the nearest cell; the
/// builder already painted each computed value into a 2x2 block, so the
/// rounding error is at most one stride. [`Field::release`] frees the cell
/// table early (a field can be several megabytes); a released field answers
/// [`FieldSample::Outside`] everywhere.
#[derive(Debug)]
pub struct Field {
    width: usize,
    height: usize,
    bounds: ViewBounds,
    cells: RwLock<Vec<Cell>>,
    overlay: Arc<Vec<u8>>,
}

impl Field {
    pub(crate) fn new(
        width: usize,
        height: usize,
        bounds: ViewBounds,
        cells: Vec<Cell>,
        overlay: Vec<u8>,
    ) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            bounds,
            cells: RwLock::new(cells),
            overlay: Arc::new(overlay),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel rectangle the animation may touch.
    pub fn bounds(&self) -> ViewBounds {
        self.bounds
    }

    /// RGBA overlay raster, sized `width * height * 4`. The handle stays
    /// valid after [`Field::release`].
    pub fn overlay(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.overlay)
    }

    /// Look up the cell nearest to a fractional pixel coordinate.
    pub fn sample(&self, x: f64, y: f64) -> FieldSample {
        let xi = x.round();
        let yi = y.round();
        if xi < 0.0 || yi < 0.0 || xi >= self.width as f64 || yi >= self.height as f64 {
            return FieldSample::Outside;
        }
        let cells = self.cells.read().expect("field cell lock poisoned");
        match cells.get(yi as usize * self.width + xi as usize) {
            Some(Cell::Vector(u, v, m)) => FieldSample::Vector {
                u: *u as f64,
                v: *v as f64,
                magnitude: *m as f64,
            },
            Some(Cell::Hole) => FieldSample::Hole,
            _ => FieldSample::Outside,
        }
    }

    /// True when the pixel has animatable flow.
    pub fn is_defined(&self, x: f64, y: f64) -> bool {
        matches!(self.sample(x, y), FieldSample::Vector { .. })
    }

    /// True when the pixel lies on the globe, whether or not data exists
    /// there. Holes count as inside; only off-globe pixels do not.
    pub fn is_inside_boundary(&self, x: f64, y: f64) -> bool {
        !matches!(self.sample(x, y), FieldSample::Outside)
    }

    /// Move a particle to a random pixel within bounds, preferring one with
    /// defined flow.
    ///
    /// Rejection-samples up to a fixed attempt budget, then accepts the
    /// last position regardless. Fields dominated by holes (an ocean layer
    /// viewed over land) would otherwise spin forever.
    pub fn randomize<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, f64) {
        let mut x = self.bounds.x as f64;
        let mut y = self.bounds.y as f64;
        for _ in 0..MAX_RANDOMIZE_ATTEMPTS {
            x = rng.gen_range(self.bounds.x..=self.bounds.x_max) as f64;
            y = rng.gen_range(self.bounds.y..=self.bounds.y_max) as f64;
            if self.is_defined(x, y) {
                break;
            }
        }
        (x, y)
    }

    /// Drop the cell table, keeping only the overlay raster.
    ///
    /// Safe to call more than once. Subsequent lookups report
    /// [`FieldSample::Outside`].
    pub fn release(&self) {
        let mut cells = self.cells.write().expect("field cell lock poisoned");
        *cells = Vec::new();
    }

    /// True once [`Field::release`] has run.
    pub fn is_released(&self) -> bool {
        self.cells.read().expect("field cell lock poisoned").is_empty()
    }
}
