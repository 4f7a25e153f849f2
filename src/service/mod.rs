//! Service layer: read-only reporting over the relay core.

pub mod liveness;

pub use liveness::{HealthReport, LivenessReporter};
