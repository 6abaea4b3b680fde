// foodgram-core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Faults of the pipeline engine itself, as opposed to the business errors
/// that step handlers return.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Type mismatch during pipeline dispatch (expected {expected_type})")]
  TypeMismatch { expected_type: String },

  #[error("No pipeline registered for context type {type_name}")]
  NotRegistered { type_name: String },

  #[error("Error in step handler. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },
}

impl From<AnyhowError> for PipelineError {
  fn from(err: AnyhowError) -> Self {
    PipelineError::HandlerError { source: err }
  }
}
