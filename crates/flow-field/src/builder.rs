//! Field construction: sample, distort and color every visible pixel.
//!
//! Columns are independent, so the default path fans them out across the
//! rayon pool and joins before publishing. [`BuildSession`] is the
//! single-threaded alternative for callers that must interleave building
//! with other work; it processes columns until a time budget runs out and
//! reports how far it got.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use flow_common::style::ColorScale;
use flow_common::{CancelToken, Rgba, ViewBounds, OVERLAY_ALPHA, TRANSPARENT_BLACK};
use flow_grid::grid::{ScalarSampler, VectorGrid};
use flow_projection::{distort_vector, Projection};

use crate::field::{Cell, Field, FieldSample};
use crate::mask::Mask;

/// Budget for one [`BuildSession::run_slice`] call at interactive frame
/// rates.
pub const MAX_SLICE_TIME: Duration = Duration::from_millis(100);

/// Columns and rows are walked on this stride; each computed value is
/// painted into a stride x stride block.
const STRIDE: usize = 2;

#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    /// Cancellation was requested before the build finished. No partial
    /// field is published.
    #[error("field build cancelled")]
    Cancelled,
    /// A column worker panicked.
    #[error("field build failed: {0}")]
    Failed(String),
}

/// Everything a field build needs, borrowed from the caller.
pub struct FieldSpec<'a> {
    pub projection: &'a dyn Projection,
    /// The vector grid that drives the animation.
    pub flow: &'a VectorGrid,
    /// Scalar source for the overlay raster. When absent the flow grid's
    /// magnitude is used instead.
    pub overlay: Option<&'a dyn ScalarSampler>,
    /// Color scale applied to the overlay scalar.
    pub scale: &'a ColorScale,
    /// Product velocity tuning; multiplied by the bounds height so the
    /// animation speed is independent of viewport size.
    pub velocity_scale: f64,
    /// Pixel rectangle to fill. Pixels outside stay [`FieldSample::Outside`].
    pub bounds: ViewBounds,
}

impl<'a> FieldSpec<'a> {
    fn screen_scale(&self) -> f64 {
        self.velocity_scale * self.bounds.height() as f64
    }

    fn columns(&self) -> Vec<usize> {
        (self.bounds.x..=self.bounds.x_max).step_by(STRIDE).collect()
    }
}

/// Interpolated results for one pixel column: `(y, cell, overlay color)`
/// per stride row.
type ColumnCells = Vec<(usize, Cell, Rgba)>;

/// Sample one column of visible pixels through the projection's inverse.
fn interpolate_column(spec: &FieldSpec<'_>, mask: &Mask, scale: f64, x: usize) -> ColumnCells {
    let mut out = Vec::new();
    let mut y = spec.bounds.y;
    while y <= spec.bounds.y_max {
        if mask.is_visible(x, y) {
            let (cell, color) = match spec.projection.invert(x as f64, y as f64) {
                Some((lon, lat)) => {
                    let cell = match spec.flow.sample(lon, lat) {
                        Some(v) => {
                            match distort_vector(
                                spec.projection,
                                lon,
                                lat,
                                x as f64,
                                y as f64,
                                scale,
                                v.u,
                                v.v,
                            ) {
                                Some((du, dv)) => {
                                    Cell::Vector(du as f32, dv as f32, v.magnitude as f32)
                                }
                                // Not differentiable here (globe edge).
                                None => Cell::Hole,
                            }
                        }
                        None => Cell::Hole,
                    };
                    let scalar = match spec.overlay {
                        Some(source) => source.sample_scalar(lon, lat),
                        None => spec.flow.sample_scalar(lon, lat),
                    };
                    let color = match scalar {
                        Some(value) => spec.scale.gradient(value, OVERLAY_ALPHA),
                        None => TRANSPARENT_BLACK,
                    };
                    (cell, color)
                }
                // The mask tests pixel centers while sampling uses corners,
                // so a pixel can be visible yet sit just off the globe. It
                // is still inside the boundary, hence a hole.
                None => (Cell::Hole, TRANSPARENT_BLACK),
            };
            out.push((y, cell, color));
        }
        y += STRIDE;
    }
    out
}

/// Paint one column's results into the cell table and overlay raster,
/// expanding each value to a stride x stride block. Pixels outside the
/// mask stay untouched, so hidden pixels never acquire a cell or a color.
fn commit_column(cells: &mut [Cell], mask: &mut Mask, x: usize, column: &ColumnCells) {
    let width = mask.width();
    for &(y, cell, color) in column {
        for dy in 0..STRIDE {
            for dx in 0..STRIDE {
                let (cx, cy) = (x + dx, y + dy);
                if mask.is_visible(cx, cy) {
                    cells[cy * width + cx] = cell;
                }
            }
        }
        mask.set_overlay_block(x, y, color);
    }
}

/// Build a field in parallel across the rayon pool.
///
/// Consumes the mask; its overlay raster ends up inside the returned field.
/// Cancellation is checked once per column. A cancelled build discards all
/// partial work and publishes nothing.
pub fn build(spec: &FieldSpec<'_>, mut mask: Mask, cancel: &CancelToken) -> Result<Field, BuildError> {
    let started = Instant::now();
    let (width, height) = (mask.width(), mask.height());
    let scale = spec.screen_scale();
    let columns = spec.columns();
    debug!(width, height, columns = columns.len(), "building field");

    let interpolated = catch_unwind(AssertUnwindSafe(|| {
        columns
            .par_iter()
            .map(|&x| {
                if cancel.is_cancelled() {
                    return Err(BuildError::Cancelled);
                }
                Ok((x, interpolate_column(spec, &mask, scale, x)))
            })
            .collect::<Result<Vec<_>, BuildError>>()
    }))
    .map_err(|payload| BuildError::Failed(panic_message(payload)))??;

    // Cancellation may have arrived after the last column check.
    if cancel.is_cancelled() {
        return Err(BuildError::Cancelled);
    }

    let mut cells = vec![Cell::Outside; width * height];
    for (x, column) in &interpolated {
        commit_column(&mut cells, &mut mask, *x, column);
    }

    debug!(elapsed_ms = started.elapsed().as_millis() as u64, "field ready");
    Ok(Field::new(width, height, spec.bounds, cells, mask.into_overlay()))
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "column worker panicked".to_string()
    }
}

/// Progress of a budgeted sequential build.
#[derive(Debug)]
pub enum BuildProgress {
    /// The time budget ran out; `fraction` of the columns are done.
    Yielded { fraction: f64 },
    /// All columns are done; the field is published.
    Complete(Field),
}

/// Single-threaded field build that cooperates with a caller's event loop.
///
/// Each [`run_slice`](BuildSession::run_slice) call processes columns until
/// the budget elapses, always finishing at least one so progress is
/// guaranteed even under a zero budget.
pub struct BuildSession<'a> {
    spec: FieldSpec<'a>,
    mask: Option<Mask>,
    cells: Vec<Cell>,
    cancel: CancelToken,
    columns: Vec<usize>,
    next: usize,
    scale: f64,
}

impl<'a> BuildSession<'a> {
    pub fn new(spec: FieldSpec<'a>, mask: Mask, cancel: CancelToken) -> Self {
        let cells = vec![Cell::Outside; mask.width() * mask.height()];
        let columns = spec.columns();
        let scale = spec.screen_scale();
        Self {
            spec,
            mask: Some(mask),
            cells,
            cancel,
            columns,
            next: 0,
            scale,
        }
    }

    /// Process columns until `budget` elapses or the build completes.
    ///
    /// Returns [`BuildError::Cancelled`] if cancellation was requested, or
    /// [`BuildError::Failed`] when called again after completion.
    pub fn run_slice(&mut self, budget: Duration) -> Result<BuildProgress, BuildError> {
        let mut mask = self
            .mask
            .take()
            .ok_or_else(|| BuildError::Failed("session already completed".to_string()))?;
        let started = Instant::now();

        while self.next < self.columns.len() {
            if self.cancel.is_cancelled() {
                return Err(BuildError::Cancelled);
            }
            let x = self.columns[self.next];
            let column = interpolate_column(&self.spec, &mask, self.scale, x);
            commit_column(&mut self.cells, &mut mask, x, &column);
            self.next += 1;

            if started.elapsed() >= budget && self.next < self.columns.len() {
                let fraction = self.next as f64 / self.columns.len() as f64;
                self.mask = Some(mask);
                return Ok(BuildProgress::Yielded { fraction });
            }
        }

        let (width, height) = (mask.width(), mask.height());
        let cells = std::mem::take(&mut self.cells);
        Ok(BuildProgress::Complete(Field::new(
            width,
            height,
            self.spec.bounds,
            cells,
            mask.into_overlay(),
        )))
    }
}
