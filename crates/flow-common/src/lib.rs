//! Common types and utilities shared across all flow-globe crates.

pub mod bounds;
pub mod cancel;
pub mod color;
pub mod math;
pub mod style;

pub use bounds::ViewBounds;
pub use cancel::CancelToken;
pub use color::{Rgba, OVERLAY_ALPHA, TRANSPARENT_BLACK};
pub use style::{ColorScale, IntensityRamp, SegmentedColorScale, INTENSITY_SCALE_STEP};
