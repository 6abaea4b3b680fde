// foodgram-core/src/pipeline/mod.rs

//! A small step pipeline engine. Each request-level operation of the service
//! is declared as named steps over one shared `ContextData<T>`.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;
pub mod registry;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use definition::{Handler, Pipeline, SkipCondition, StepDef};
pub use registry::PipelineRegistry;
