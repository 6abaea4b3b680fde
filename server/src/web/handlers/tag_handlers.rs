// foodgram_server/src/web/handlers/tag_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Tag;
use crate::state::AppState;

#[instrument(name = "handler::list_tags", skip(app_state))]
pub async fn list_tags_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let tags: Vec<Tag> = sqlx::query_as("SELECT id, name, color, slug FROM tags ORDER BY name")
    .fetch_all(&app_state.db_pool)
    .await?;
  Ok(HttpResponse::Ok().json(tags))
}

#[instrument(name = "handler::get_tag", skip(app_state, path), fields(tag_id = %path.as_ref()))]
pub async fn get_tag_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  let tag_id = path.into_inner();
  let tag: Option<Tag> = sqlx::query_as("SELECT id, name, color, slug FROM tags WHERE id = $1")
    .bind(tag_id)
    .fetch_optional(&app_state.db_pool)
    .await?;
  match tag {
    Some(tag) => Ok(HttpResponse::Ok().json(tag)),
    None => {
      warn!("Tag with ID {} not found.", tag_id);
      Err(AppError::NotFound(format!("Tag with ID {} not found.", tag_id)))
    }
  }
}
