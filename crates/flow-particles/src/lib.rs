//! Particle advection over a flow field, drawn as fading trails.
//!
//! Each frame the [`simulator::Simulator`] evolves every particle one step
//! along the field, sorts the moved particles into speed buckets, and hands
//! the buckets to a [`simulator::TrailRenderer`] that dims the previous
//! frame and strokes the new segments on top.

pub mod simulator;

pub use simulator::{
    Particle, Simulator, SimulatorOptions, TrailRenderer, TrailSegment, MAX_PARTICLE_AGE,
    PARTICLE_MULTIPLIER, PARTICLE_REDUCTION, TRAIL_FADE,
};
