// foodgram-core/src/pipeline/execution.rs

use super::context_data::ContextData;
use super::control::{PipelineControl, PipelineResult};
use super::definition::Pipeline;
use crate::error::PipelineError;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Runs every step in declaration order against `ctx_data`.
  ///
  /// Returns the first handler error unchanged. A non-optional step without
  /// handlers fails with `PipelineError::HandlerMissing`, converted into `Err`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      pipeline_context_data_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(
        Level::DEBUG,
        "pipeline_step",
        step_name = step_name,
        step_index = step_idx
      );

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(Level::DEBUG, step_name, "Step skipped by its skip condition.");
          continue;
        }
      }

      let handlers = match self.on.get(step_name) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ if step_def.optional => {
          event!(Level::DEBUG, step_name, "Optional step has no handlers, skipping.");
          continue;
        }
        _ => {
          event!(Level::ERROR, step_name, "Non-optional step has no handlers.");
          return Err(Err::from(PipelineError::HandlerMissing {
            step_name: step_def.name.clone(),
          }));
        }
      };

      for handler_fn in handlers {
        // Span guards are not Send, so the span is attached to the future instead.
        match handler_fn(ctx_data.clone()).instrument(step_span.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            event!(Level::INFO, step_name, "Pipeline stopped by a handler.");
            return Ok(PipelineResult::Stopped);
          }
          Err(e) => {
            event!(Level::DEBUG, step_name, error = %e, "Step handler failed.");
            return Err(e);
          }
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }
}
