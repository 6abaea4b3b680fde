// foodgram_server/src/web/handlers/recipe_handlers.rs

use actix_web::{web, HttpResponse};
use foodgram::{ContextData, Page, PipelineResult, RecipeDraft, Viewer};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::db;
use crate::db::recipes::RecipeFilters;
use crate::errors::AppError;
use crate::pipelines::contexts::{RecipeWriteCtxData, RecipeWriteMode};
use crate::state::AppState;
use crate::web::extractors::{AuthenticatedUser, MaybeUser, QueryPairs};

/// Reads listing filters. The favorite and cart flags only apply to an
/// authenticated viewer.
fn recipe_filters(query: &QueryPairs, viewer: Viewer) -> Result<RecipeFilters, AppError> {
  let user_id = viewer.user_id();
  Ok(RecipeFilters {
    author: query.parse_opt::<Uuid>("author")?,
    tags: query.all("tags").into_iter().filter(|t| !t.is_empty()).collect(),
    favorited_by: user_id.filter(|_| query.flag("is_favorited")),
    in_cart_of: user_id.filter(|_| query.flag("is_in_shopping_cart")),
  })
}

#[instrument(name = "handler::list_recipes", skip(app_state, query, viewer))]
pub async fn list_recipes_handler(
  app_state: web::Data<AppState>,
  query: QueryPairs,
  viewer: MaybeUser,
) -> Result<HttpResponse, AppError> {
  let page_req = query.page_request(app_state.config.default_page_size)?;
  let filters = recipe_filters(&query, viewer.0)?;
  let pool = &app_state.db_pool;

  let count = db::recipes::count_recipes(pool, &filters).await?;
  page_req.ensure_in_range(count)?;
  let rows = db::recipes::list_recipes(pool, &filters, page_req).await?;
  let views = db::recipes::recipe_views(pool, viewer.0, rows).await?;

  let base_url = &app_state.config.app_base_url;
  let page = Page::new(views, count, page_req, |p, l| query.page_link(base_url, "/api/recipes", p, l));
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::get_recipe", skip(app_state, path, viewer), fields(recipe_id = %path.as_ref()))]
pub async fn get_recipe_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  viewer: MaybeUser,
) -> Result<HttpResponse, AppError> {
  let view = db::recipes::recipe_view(&app_state.db_pool, viewer.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(view))
}

/// Runs the write pipeline and returns the id of the saved recipe.
async fn write_recipe(
  app_state: &AppState,
  actor: Uuid,
  mode: RecipeWriteMode,
  draft: RecipeDraft,
) -> Result<Uuid, AppError> {
  let ctx = ContextData::new(RecipeWriteCtxData {
    app_state: app_state.clone(),
    actor,
    mode,
    draft: Some(draft),
    valid: None,
    recipe_id: None,
  });

  match app_state.pipelines.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let recipe_id = ctx.read().recipe_id;
      recipe_id.ok_or_else(|| {
        warn!("Recipe pipeline completed but no recipe id was set in context.");
        AppError::Internal("Recipe write completed without a result.".to_string())
      })
    }
    PipelineResult::Stopped => Err(AppError::Internal(
      "Recipe write was halted by an internal step.".to_string(),
    )),
  }
}

#[instrument(name = "handler::create_recipe", skip(app_state, req_payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn create_recipe_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RecipeDraft>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let recipe_id = write_recipe(&app_state, auth_user.user_id, RecipeWriteMode::Create, req_payload.into_inner()).await?;
  let view = db::recipes::recipe_view(&app_state.db_pool, Viewer::User(auth_user.user_id), recipe_id).await?;
  info!(%recipe_id, "Recipe created.");
  Ok(HttpResponse::Created().json(view))
}

#[instrument(name = "handler::update_recipe", skip(app_state, path, req_payload, auth_user), fields(user_id = %auth_user.user_id, recipe_id = %path.as_ref()))]
pub async fn update_recipe_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<RecipeDraft>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let mode = RecipeWriteMode::Update(path.into_inner());
  let recipe_id = write_recipe(&app_state, auth_user.user_id, mode, req_payload.into_inner()).await?;
  let view = db::recipes::recipe_view(&app_state.db_pool, Viewer::User(auth_user.user_id), recipe_id).await?;
  Ok(HttpResponse::Ok().json(view))
}

/// Removes a recipe. Links, favorites and cart entries go with it.
#[instrument(name = "handler::delete_recipe", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id, recipe_id = %path.as_ref()))]
pub async fn delete_recipe_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let recipe_id = path.into_inner();
  let pool = &app_state.db_pool;
  db::recipes::fetch_owned_recipe(pool, recipe_id, auth_user.user_id).await?;

  let deleted = sqlx::query("DELETE FROM recipes WHERE id = $1 AND author_id = $2")
    .bind(recipe_id)
    .bind(auth_user.user_id)
    .execute(pool)
    .await?;
  if deleted.rows_affected() == 0 {
    return Err(AppError::NotFound(format!("Recipe with ID {} not found.", recipe_id)));
  }
  info!(%recipe_id, "Recipe deleted.");
  Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn user_flags_are_ignored_for_anonymous_viewers() {
    let query = QueryPairs::parse("is_favorited=1&is_in_shopping_cart=1&tags=lunch&tags=").unwrap();
    let filters = recipe_filters(&query, Viewer::Anonymous).unwrap();
    assert_eq!(filters.favorited_by, None);
    assert_eq!(filters.in_cart_of, None);
    assert_eq!(filters.tags, vec!["lunch".to_string()]);
  }

  #[test]
  fn user_flags_scope_to_the_viewer() {
    let user_id = Uuid::new_v4();
    let author = Uuid::new_v4();
    let query = QueryPairs::parse(&format!("author={}&is_favorited=1", author)).unwrap();
    let filters = recipe_filters(&query, Viewer::User(user_id)).unwrap();
    assert_eq!(filters.author, Some(author));
    assert_eq!(filters.favorited_by, Some(user_id));
    assert_eq!(filters.in_cart_of, None);
  }

  #[test]
  fn malformed_author_is_a_validation_error() {
    let query = QueryPairs::parse("author=someone").unwrap();
    assert!(matches!(recipe_filters(&query, Viewer::Anonymous), Err(AppError::Validation(_))));
  }
}
