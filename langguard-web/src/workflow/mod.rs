//! Per-submission workflow
//!
//! The orchestrator in [`pipeline`] chains the stage services in `services`
//! and publishes progress on the event bus.

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineConfig, PipelineRequest};
