// tests/registry_tests.rs
mod common;

use common::*;
use foodgram::{ContextData, Pipeline, PipelineControl, PipelineRegistry, PipelineResult};
use serial_test::serial;

#[derive(Clone, Debug, Default)]
struct OtherContext {
  touched: bool,
}

#[tokio::test]
#[serial]
async fn test_registry_dispatches_by_context_type() {
  setup_tracing();
  let registry = PipelineRegistry::<TestError>::new();

  let mut main_pipeline = Pipeline::<TestContext, TestError>::new(&[("main", false, None)]);
  main_pipeline.on_root("main", create_simple_handler("main", "M"));
  registry.register_pipeline(main_pipeline);

  let mut other_pipeline = Pipeline::<OtherContext, TestError>::new(&[("other", false, None)]);
  other_pipeline.on_root("other", |ctx: ContextData<OtherContext>| {
    Box::pin(async move {
      ctx.write().touched = true;
      Ok::<_, TestError>(PipelineControl::Continue)
    })
  });
  registry.register_pipeline(other_pipeline);

  assert!(registry.is_registered::<TestContext>());
  assert!(registry.is_registered::<OtherContext>());

  let main_ctx = ContextData::new(TestContext::default());
  assert_eq!(registry.run(main_ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(main_ctx.read().message, "M");

  let other_ctx = ContextData::new(OtherContext::default());
  registry.run(other_ctx.clone()).await.unwrap();
  assert!(other_ctx.read().touched);
}

#[tokio::test]
#[serial]
async fn test_registry_reports_unregistered_context_type() {
  setup_tracing();
  let registry = PipelineRegistry::<TestError>::new();
  let result = registry.run(ContextData::new(OtherContext::default())).await;
  match result.unwrap_err() {
    TestError::Engine(s) => assert!(s.contains("NotRegistered")),
    other => panic!("Expected TestError::Engine(NotRegistered), got {other:?}"),
  }
}

#[tokio::test]
#[serial]
async fn test_registry_passes_handler_errors_through() {
  setup_tracing();
  let registry = PipelineRegistry::<TestError>::new();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("boom", false, None)]);
  pipeline.on_root("boom", create_failing_handler("boom", "registry failure"));
  registry.register_pipeline(pipeline);

  let result = registry.run(ContextData::new(TestContext::default())).await;
  assert_eq!(result.unwrap_err(), TestError::Handler("registry failure".to_string()));
}

#[tokio::test]
#[serial]
async fn test_reregistering_replaces_the_pipeline() {
  setup_tracing();
  let registry = PipelineRegistry::<TestError>::new();

  let mut first = Pipeline::<TestContext, TestError>::new(&[("s", false, None)]);
  first.on_root("s", create_simple_handler("s", "first"));
  registry.register_pipeline(first);

  let mut second = Pipeline::<TestContext, TestError>::new(&[("s", false, None)]);
  second.on_root("s", create_simple_handler("s", "second"));
  registry.register_pipeline(second);

  let ctx = ContextData::new(TestContext::default());
  registry.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().message, "second");
}
