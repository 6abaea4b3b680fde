// foodgram_server/src/web/handlers/ingredient_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Ingredient;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct IngredientQuery {
  /// Case-insensitive name prefix.
  pub name: Option<String>,
}

#[instrument(name = "handler::list_ingredients", skip(app_state))]
pub async fn list_ingredients_handler(
  app_state: web::Data<AppState>,
  query: web::Query<IngredientQuery>,
) -> Result<HttpResponse, AppError> {
  let prefix = query.into_inner().name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
  let ingredients: Vec<Ingredient> = match prefix {
    Some(prefix) => {
      // LIKE wildcards in the prefix are matched literally.
      let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
      sqlx::query_as(
        "SELECT id, name, measurement_unit FROM ingredients \
         WHERE lower(name) LIKE lower($1) || '%' ORDER BY name",
      )
      .bind(escaped)
      .fetch_all(&app_state.db_pool)
      .await?
    }
    None => {
      sqlx::query_as("SELECT id, name, measurement_unit FROM ingredients ORDER BY name")
        .fetch_all(&app_state.db_pool)
        .await?
    }
  };
  debug!(ingredient_count = ingredients.len(), "Ingredients listed.");
  Ok(HttpResponse::Ok().json(ingredients))
}

#[instrument(name = "handler::get_ingredient", skip(app_state, path), fields(ingredient_id = %path.as_ref()))]
pub async fn get_ingredient_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let ingredient_id = path.into_inner();
  let ingredient: Option<Ingredient> =
    sqlx::query_as("SELECT id, name, measurement_unit FROM ingredients WHERE id = $1")
      .bind(ingredient_id)
      .fetch_optional(&app_state.db_pool)
      .await?;
  ingredient.map(|i| HttpResponse::Ok().json(i)).ok_or_else(|| {
    warn!("Ingredient with ID {} not found.", ingredient_id);
    AppError::NotFound(format!("Ingredient with ID {} not found.", ingredient_id))
  })
}
