//! Single-slot cancellable task supervision.
//!
//! A [`TaskAgent`] owns at most one in-flight computation and its latest
//! successful value. Submitting new work supersedes whatever is running:
//! the old task's cancellation token trips, and when the old task
//! eventually finishes its result is dropped instead of published. This
//! is the backbone of the rendering pipeline, where a pan or a layer
//! switch makes every in-flight grid, field and animation stale at once.

pub mod agent;

pub use agent::{AgentEvent, AgentObserver, TaskAgent};
