//! Visibility mask and the interpolated, projection-corrected pixel field.
//!
//! [`mask::Mask`] rasterizes a projection's boundary outline into a
//! per-pixel visibility bitmap plus an RGBA overlay raster. The
//! [`builder`] walks every visible pixel on a 2-pixel stride, samples the
//! grids through the projection's inverse, applies distortion correction
//! and publishes an immutable [`field::Field`].

pub mod builder;
pub mod field;
pub mod mask;

pub use builder::{build, BuildError, BuildProgress, BuildSession, FieldSpec, MAX_SLICE_TIME};
pub use flow_common::CancelToken;
pub use field::{Field, FieldSample};
pub use mask::Mask;
