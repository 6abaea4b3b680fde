// foodgram_server/src/pipelines/shopping_list_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::ShoppingListCtxData;
use crate::services::pdf_render;
use foodgram::{build_shopping_list, ContextData, Pipeline, PipelineControl, PipelineRegistry};
use tracing::{error, info, instrument};

pub fn register_shopping_list_pipeline(registry: &PipelineRegistry<AppError>) {
  let mut p = Pipeline::<ShoppingListCtxData, AppError>::new(&[
    ("collect_cart", false, None),
    ("render_document", false, None),
  ]);
  p.on_root("collect_cart", collect_cart);
  p.on_root("render_document", render_document);

  registry.register_pipeline(p);
  tracing::info!("Shopping list pipeline registered.");
}

#[instrument(name = "shopping_list_step::collect_cart", skip(ctx_data), err(Display))]
async fn collect_cart(ctx_data: ContextData<ShoppingListCtxData>) -> Result<PipelineControl, AppError> {
  let (store, user_id) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.user_id)
  };
  let lines = build_shopping_list(store.as_ref(), user_id).await?;
  info!(%user_id, line_count = lines.len(), "Shopping list collected.");
  ctx_data.write().lines = lines;
  Ok(PipelineControl::Continue)
}

/// Rendering is CPU-bound and runs on the blocking pool.
#[instrument(name = "shopping_list_step::render_document", skip(ctx_data), err(Display))]
async fn render_document(ctx_data: ContextData<ShoppingListCtxData>) -> Result<PipelineControl, AppError> {
  let (lines, font) = {
    let guard = ctx_data.read();
    (guard.lines.clone(), guard.app_state.pdf_font.clone())
  };

  let document = tokio::task::spawn_blocking(move || {
    pdf_render::render_shopping_list(&lines, font.as_ref().map(|bytes| bytes.as_slice()))
  })
  .await
  .map_err(|join_err| {
    error!(error = %join_err, "PDF rendering task failed.");
    AppError::Internal(format!("PDF rendering task failed: {}", join_err))
  })??;

  ctx_data.write().document = Some(document);
  Ok(PipelineControl::Continue)
}
