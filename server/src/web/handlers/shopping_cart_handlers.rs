// foodgram_server/src/web/handlers/shopping_cart_handlers.rs

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use foodgram::{ContextData, PipelineResult};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::ShoppingListCtxData;
use crate::services::pdf_render::DOCUMENT_FILENAME;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

/// The caller's cart as an aggregated PDF shopping list.
#[instrument(name = "handler::download_shopping_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn download_shopping_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let ctx = ContextData::new(ShoppingListCtxData {
    app_state: app_state.get_ref().clone(),
    user_id: auth_user.user_id,
    lines: Vec::new(),
    document: None,
  });

  match app_state.pipelines.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let document = ctx.write().document.take().ok_or_else(|| {
        warn!("Shopping list pipeline completed without a document.");
        AppError::Internal("Shopping list was not rendered.".to_string())
      })?;
      info!(bytes = document.len(), "Shopping list document ready.");
      Ok(
        HttpResponse::Ok()
          .content_type("application/pdf")
          .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(DOCUMENT_FILENAME.to_string())],
          })
          .body(document),
      )
    }
    PipelineResult::Stopped => Err(AppError::Internal(
      "Shopping list download was halted by an internal step.".to_string(),
    )),
  }
}
