//! Grid records, bilinear sampling and the product catalog.
//!
//! A [`record::GridRecord`] is one decoded data record as the external
//! loader produces it. [`grid::ScalarGrid`] and [`grid::VectorGrid`] wrap
//! records into immutable, samplable grids with longitude wrap handling.
//! [`products`] describes how each supported quantity is colored, scaled
//! and animated.

pub mod composite;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod products;
pub mod record;

pub use composite::WindPowerGrid;
pub use error::{GridError, GridResult};
pub use geometry::GridGeometry;
pub use grid::{FlowVector, ScalarGrid, ScalarSampler, VectorGrid};
pub use record::{GridHeader, GridRecord};
