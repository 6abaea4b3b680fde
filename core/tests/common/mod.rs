// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper.

use foodgram::{ContextData, InMemoryStore, PipelineControl, PipelineError, RecipeId, UserId};
use tracing::Level;

// --- Pipeline test context ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Pipeline engine error: {0}")]
  Engine(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<PipelineError> for TestError {
  fn from(e: PipelineError) -> Self {
    TestError::Engine(format!("{e:?}"))
  }
}

pub fn create_simple_handler(
  step_name: &'static str,
  message_to_append: &'static str,
) -> impl Fn(ContextData<TestContext>) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<PipelineControl, TestError>> + Send>>
     + Send
     + Sync
     + 'static {
  move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.message.push_str(message_to_append);
      guard.steps_executed.push(step_name.to_string());
      if guard.should_stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  }
}

pub fn create_failing_handler(
  step_name: &'static str,
  error_message: &'static str,
) -> impl Fn(ContextData<TestContext>) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<PipelineControl, TestError>> + Send>>
     + Send
     + Sync
     + 'static {
  move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Handler(error_message.to_string()))
    })
  }
}

// --- Store fixtures ---

/// The cart from the end-to-end scenario: recipe A (Flour 200 g, Sugar 50 g)
/// then recipe B (Flour 100 g, Egg 2 pcs).
pub struct BakingFixture {
  pub store: InMemoryStore,
  pub user: UserId,
  pub recipe_a: RecipeId,
  pub recipe_b: RecipeId,
}

pub fn baking_fixture() -> BakingFixture {
  let store = InMemoryStore::new();
  let user = store.add_user();
  let flour = store.add_ingredient("Flour", "g");
  let sugar = store.add_ingredient("Sugar", "g");
  let egg = store.add_ingredient("Egg", "pcs");
  let recipe_a = store.add_recipe(&[(flour, 200), (sugar, 50)]);
  let recipe_b = store.add_recipe(&[(flour, 100), (egg, 2)]);
  BakingFixture {
    store,
    user,
    recipe_a,
    recipe_b,
  }
}

// --- Tracing setup, once per test binary ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
