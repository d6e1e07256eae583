// core/src/flow/mod.rs

//! A small step pipeline used to run the order action chains.
//!
//! A [`Pipeline`] is an ordered list of named steps. Each step may carry a skip
//! condition and any number of `on` handlers. Handlers share one
//! [`ContextData`] and run strictly in order; the first error ends the run.

pub mod context_data;
pub mod control;
pub mod pipeline;
pub mod step;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use pipeline::{Handler, Pipeline};
pub use step::{SkipCondition, StepDef};
