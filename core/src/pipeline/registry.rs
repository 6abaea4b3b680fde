// foodgram-core/src/pipeline/registry.rs

//! `PipelineRegistry<AppErr>`: one pipeline per context data type, looked up
//! by `TypeId` when a context is run.

use super::context_data::ContextData;
use super::control::PipelineResult;
use super::definition::Pipeline;
use crate::error::PipelineError;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, instrument, Level};

#[async_trait]
trait ErasedPipeline<AppErr>: Send + Sync
where
  AppErr: std::error::Error + Send + Sync + 'static,
{
  /// `ctx_obj` must hold a `ContextData<TData>` for the wrapped pipeline.
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, AppErr>;
}

struct PipelineWrapper<TData, HandlerErr, AppErr>
where
  TData: 'static + Send + Sync,
  HandlerErr: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  pipeline: Arc<Pipeline<TData, HandlerErr>>,
  _phantom_app_err: PhantomData<fn() -> AppErr>,
}

#[async_trait]
impl<TData, HandlerErr, AppErr> ErasedPipeline<AppErr> for PipelineWrapper<TData, HandlerErr, AppErr>
where
  TData: 'static + Send + Sync,
  HandlerErr: std::error::Error + From<PipelineError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<HandlerErr> + From<PipelineError> + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, AppErr> {
    let typed_ctx = match ctx_obj.downcast::<ContextData<TData>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<ContextData<TData>>().to_string();
        event!(Level::ERROR, %expected_type, "Context object type mismatch.");
        return Err(AppErr::from(PipelineError::TypeMismatch { expected_type }));
      }
    };
    self.pipeline.run(typed_ctx).await.map_err(AppErr::from)
  }
}

/// Registry of the pipelines an application runs.
///
/// `AppErr` is what `run` returns; it must absorb both the handler error of
/// every registered pipeline and the engine's own `PipelineError`.
pub struct PipelineRegistry<AppErr = PipelineError>
where
  AppErr: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  registry: RwLock<HashMap<TypeId, Arc<dyn ErasedPipeline<AppErr>>>>,
}

impl<AppErr> PipelineRegistry<AppErr>
where
  AppErr: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      registry: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `pipeline` for contexts of type `ContextData<TData>`,
  /// replacing any earlier registration for the same type.
  pub fn register_pipeline<TData, HandlerErr>(&self, pipeline: Pipeline<TData, HandlerErr>)
  where
    TData: 'static + Send + Sync,
    HandlerErr: std::error::Error + From<PipelineError> + Send + Sync + 'static,
    AppErr: From<HandlerErr>,
  {
    event!(
      Level::DEBUG,
      tdata_type = %std::any::type_name::<TData>(),
      steps = ?pipeline.step_names(),
      "Registering pipeline."
    );
    let wrapper = PipelineWrapper::<TData, HandlerErr, AppErr> {
      pipeline: Arc::new(pipeline),
      _phantom_app_err: PhantomData,
    };
    self.registry.write().insert(TypeId::of::<TData>(), Arc::new(wrapper));
  }

  pub fn is_registered<TData: 'static>(&self) -> bool {
    self.registry.read().contains_key(&TypeId::of::<TData>())
  }

  /// Runs the pipeline registered for `TData`.
  #[instrument(
    name = "PipelineRegistry::run",
    skip_all,
    fields(tdata_type = %std::any::type_name::<TData>())
  )]
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, AppErr>
  where
    TData: 'static + Send + Sync,
  {
    let runner = {
      let reg = self.registry.read();
      reg.get(&TypeId::of::<TData>()).cloned()
    };
    let runner = runner.ok_or_else(|| {
      let type_name = std::any::type_name::<TData>().to_string();
      event!(Level::ERROR, %type_name, "No pipeline registered for context type.");
      AppErr::from(PipelineError::NotRegistered { type_name })
    })?;

    runner.run_erased(Box::new(ctx_data)).await
  }
}

impl<AppErr> Default for PipelineRegistry<AppErr>
where
  AppErr: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
