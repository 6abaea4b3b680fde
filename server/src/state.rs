// foodgram_server/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use foodgram::{PipelineRegistry, RelationStore, ShoppingListSource};
use sqlx::PgPool;
use std::sync::Arc;

/// Storage the pipelines run against: `PgStore` in the service, the core's
/// in-memory store in tests.
pub trait DomainStore: ShoppingListSource + RelationStore {}

impl<T: ShoppingListSource + RelationStore + ?Sized> DomainStore for T {}

#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub pipelines: Arc<PipelineRegistry<AppError>>,
  pub config: Arc<AppConfig>,
  pub store: Arc<dyn DomainStore>,
  /// Loaded from `PDF_FONT_PATH` at startup.
  pub pdf_font: Option<Arc<Vec<u8>>>,
}

#[cfg(test)]
pub mod test_support {
  use super::*;
  use sqlx::postgres::PgPoolOptions;
  use std::time::Duration;

  /// State over `store` with every pipeline registered. The pool never
  /// connects; anything that reaches it fails fast.
  pub fn state_with_store(store: Arc<dyn DomainStore>) -> AppState {
    let config = AppConfig::from_lookup(|name| match name {
      "DATABASE_URL" => Some("postgres://foodgram@127.0.0.1:1/foodgram".to_string()),
      _ => None,
    })
    .unwrap();
    let db_pool = PgPoolOptions::new()
      .acquire_timeout(Duration::from_millis(200))
      .connect_lazy(&config.database_url)
      .unwrap();
    let pipelines = Arc::new(PipelineRegistry::<AppError>::new());
    crate::pipelines::register_all_pipelines(&pipelines);
    AppState {
      db_pool,
      pipelines,
      config: Arc::new(config),
      store,
      pdf_font: None,
    }
  }
}
