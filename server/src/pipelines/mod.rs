// foodgram_server/src/pipelines/mod.rs

//! Defines and registers every pipeline the service runs.

use crate::errors::AppError;
use foodgram::PipelineRegistry;

pub mod contexts;

pub mod recipe_pipeline;
pub mod relation_pipeline;
pub mod shopping_list_pipeline;
pub mod signup_pipeline;

/// Registers all pipelines. Called once at startup.
pub fn register_all_pipelines(registry: &PipelineRegistry<AppError>) {
  tracing::info!("Registering pipelines...");

  signup_pipeline::register_signup_pipeline(registry);
  signup_pipeline::register_set_password_pipeline(registry);
  relation_pipeline::register_relation_pipeline(registry);
  recipe_pipeline::register_recipe_write_pipeline(registry);
  shopping_list_pipeline::register_shopping_list_pipeline(registry);

  tracing::info!("All application pipelines registered.");
}
