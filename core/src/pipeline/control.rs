// foodgram-core/src/pipeline/control.rs

//! Flow signals returned by step handlers and the outcome of a whole run.

/// Returned by a handler to decide whether the run goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt the run. No further handlers or steps execute.
  Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step that was not skipped ran to the end.
  Completed,
  /// A handler returned `PipelineControl::Stop`.
  Stopped,
}
