// foodgram_server/src/main.rs

mod config;
mod db;
mod errors;
mod models;
mod pipelines;
mod services;
mod state;
mod web;

use crate::config::AppConfig;
use crate::db::PgStore;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::IdentityHeader;

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use foodgram::PipelineRegistry;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting Foodgram server...");

  let result = run().await;
  if let Err(e) = &result {
    tracing::error!(error = ?e, "Server exited with an error.");
  }
  result
}

async fn run() -> anyhow::Result<()> {
  let app_config = Arc::new(AppConfig::from_env().context("Configuration error")?);

  let db_pool = PgPoolOptions::new()
    .max_connections(app_config.database_max_connections)
    .connect(&app_config.database_url)
    .await
    .context("Database connection error")?;
  tracing::info!("Successfully connected to the database.");

  if app_config.run_migrations {
    sqlx::migrate!("./migrations")
      .run(&db_pool)
      .await
      .context("Database migration failed")?;
    tracing::info!("Database migrations applied.");
  }

  if app_config.seed_db {
    db::seed::seed_db(&db_pool, app_config.seed_ingredients_path.as_deref())
      .await
      .context("Database seeding failed")?;
  }

  let pdf_font = match &app_config.pdf_font_path {
    Some(path) => {
      let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Could not read PDF font {}", path.display()))?;
      tracing::info!(path = %path.display(), "Loaded PDF font.");
      Some(Arc::new(bytes))
    }
    None => {
      tracing::warn!("PDF_FONT_PATH is not set; shopping lists with non-Latin labels cannot be rendered.");
      None
    }
  };

  let pipelines = Arc::new(PipelineRegistry::<AppError>::new());
  pipelines::register_all_pipelines(&pipelines);

  let app_state = AppState {
    db_pool: db_pool.clone(),
    pipelines,
    config: app_config.clone(),
    store: Arc::new(PgStore::new(db_pool)),
    pdf_font,
  };
  let identity_header = IdentityHeader(app_config.identity_header.clone());

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .app_data(actix_data::Data::new(identity_header.clone()))
      .configure(web::configure_app_routes)
      .wrap(tracing_actix_web::TracingLogger::default())
  })
  .bind(&server_address)
  .with_context(|| format!("Could not bind {}", server_address))?
  .run()
  .await?;
  Ok(())
}
