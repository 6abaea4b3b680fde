// foodgram_server/src/web/handlers/relation_handlers.rs

//! Add/remove endpoints of the three toggle relations.

use actix_web::{web, HttpResponse};
use foodgram::{ContextData, Membership, PipelineResult, RelationKind, ToggleAction, Viewer};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::RecipeShort;
use crate::pipelines::contexts::RelationCtxData;
use crate::state::AppState;
use crate::web::extractors::{AuthenticatedUser, QueryPairs};

/// Runs the toggle pipeline and returns the resulting membership.
async fn run_toggle(
  app_state: &AppState,
  kind: RelationKind,
  action: ToggleAction,
  actor: Uuid,
  target: Uuid,
) -> Result<Membership, AppError> {
  let ctx = ContextData::new(RelationCtxData {
    app_state: app_state.clone(),
    kind,
    action,
    actor,
    target,
    membership: None,
  });

  match app_state.pipelines.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let membership = ctx.read().membership;
      membership.ok_or_else(|| {
        warn!("Relation pipeline completed without a membership result.");
        AppError::Internal("Toggle completed without a result.".to_string())
      })
    }
    PipelineResult::Stopped => Err(AppError::Internal("Toggle was halted by an internal step.".to_string())),
  }
}

async fn add_recipe_relation(
  app_state: &AppState,
  kind: RelationKind,
  user_id: Uuid,
  recipe_id: Uuid,
) -> Result<HttpResponse, AppError> {
  run_toggle(app_state, kind, ToggleAction::Add, user_id, recipe_id).await?;
  let recipe = db::recipes::fetch_recipe(&app_state.db_pool, recipe_id).await?;
  info!(%kind, %recipe_id, "Recipe added.");
  Ok(HttpResponse::Created().json(RecipeShort::from(recipe)))
}

async fn remove_relation(
  app_state: &AppState,
  kind: RelationKind,
  user_id: Uuid,
  target: Uuid,
) -> Result<HttpResponse, AppError> {
  run_toggle(app_state, kind, ToggleAction::Remove, user_id, target).await?;
  info!(%kind, %target, "Relation removed.");
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::add_favorite", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id, recipe_id = %path.as_ref()))]
pub async fn add_favorite_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  add_recipe_relation(&app_state, RelationKind::Favorite, auth_user.user_id, path.into_inner()).await
}

#[instrument(name = "handler::remove_favorite", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id, recipe_id = %path.as_ref()))]
pub async fn remove_favorite_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  remove_relation(&app_state, RelationKind::Favorite, auth_user.user_id, path.into_inner()).await
}

#[instrument(name = "handler::add_to_shopping_cart", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id, recipe_id = %path.as_ref()))]
pub async fn add_to_shopping_cart_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  add_recipe_relation(&app_state, RelationKind::ShoppingCart, auth_user.user_id, path.into_inner()).await
}

#[instrument(name = "handler::remove_from_shopping_cart", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id, recipe_id = %path.as_ref()))]
pub async fn remove_from_shopping_cart_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  remove_relation(&app_state, RelationKind::ShoppingCart, auth_user.user_id, path.into_inner()).await
}

/// Follows an author and returns them with their newest recipes.
#[instrument(name = "handler::subscribe", skip(app_state, path, query, auth_user), fields(user_id = %auth_user.user_id, author_id = %path.as_ref()))]
pub async fn subscribe_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  query: QueryPairs,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let author_id = path.into_inner();
  let recipes_limit = query.parse_opt::<u32>("recipes_limit")?;
  run_toggle(&app_state, RelationKind::Follow, ToggleAction::Add, auth_user.user_id, author_id).await?;

  let pool = &app_state.db_pool;
  let author = db::users::fetch_user(pool, author_id).await?;
  let mut results =
    db::recipes::authors_with_recipes(pool, Viewer::User(auth_user.user_id), vec![author], recipes_limit).await?;
  let body = results
    .pop()
    .ok_or_else(|| AppError::Internal("Subscribed author could not be loaded.".to_string()))?;
  info!(%author_id, "Subscribed.");
  Ok(HttpResponse::Created().json(body))
}

#[instrument(name = "handler::unsubscribe", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id, author_id = %path.as_ref()))]
pub async fn unsubscribe_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  remove_relation(&app_state, RelationKind::Follow, auth_user.user_id, path.into_inner()).await
}

#[cfg(test)]
mod tests {
  use crate::state::test_support::state_with_store;
  use crate::web::configure_app_routes;
  use actix_web::{http::StatusCode, test, web, App};
  use foodgram::{InMemoryStore, RelationKind, RelationStore};
  use std::sync::Arc;

  macro_rules! app_over {
    ($store:expr) => {
      test::init_service(
        App::new()
          .app_data(web::Data::new(state_with_store($store.clone())))
          .configure(configure_app_routes),
      )
      .await
    };
  }

  #[actix_web::test]
  async fn unsubscribe_returns_no_content_then_conflict() {
    let store = Arc::new(InMemoryStore::new());
    let user = store.add_user();
    let author = store.add_user();
    store.insert(RelationKind::Follow, user, author).await.unwrap();
    let app = app_over!(store);

    let req = test::TestRequest::delete()
      .uri(&format!("/api/users/{}/subscribe", author))
      .insert_header(("X-User-ID", user.to_string()))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.relation_count(RelationKind::Follow, user, author), 0);

    let req = test::TestRequest::delete()
      .uri(&format!("/api/users/{}/subscribe", author))
      .insert_header(("X-User-ID", user.to_string()))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "You are not subscribed to this user.");
  }

  #[actix_web::test]
  async fn subscribing_to_oneself_is_rejected() {
    let store = Arc::new(InMemoryStore::new());
    let user = store.add_user();
    let app = app_over!(store);

    for req in [test::TestRequest::post(), test::TestRequest::get()] {
      let req = req
        .uri(&format!("/api/users/{}/subscribe", user))
        .insert_header(("X-User-ID", user.to_string()))
        .to_request();
      let resp = test::call_service(&app, req).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
      let body: serde_json::Value = test::read_body_json(resp).await;
      assert_eq!(body["error"], "You cannot subscribe to yourself.");
    }
  }

  #[actix_web::test]
  async fn removing_from_cart_and_favorites() {
    let store = Arc::new(InMemoryStore::new());
    let user = store.add_user();
    let recipe = store.add_recipe(&[]);
    store.insert(RelationKind::ShoppingCart, user, recipe).await.unwrap();
    let app = app_over!(store);

    let req = test::TestRequest::delete()
      .uri(&format!("/api/recipes/{}/shopping_cart", recipe))
      .insert_header(("X-User-ID", user.to_string()))
      .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    assert!(store.cart_entries(user).is_empty());

    let req = test::TestRequest::delete()
      .uri(&format!("/api/recipes/{}/favorite", recipe))
      .insert_header(("X-User-ID", user.to_string()))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Recipe is not in favorites.");
  }

  #[actix_web::test]
  async fn toggles_require_an_identity() {
    let store = Arc::new(InMemoryStore::new());
    let recipe = store.add_recipe(&[]);
    let app = app_over!(store);

    let req = test::TestRequest::post()
      .uri(&format!("/api/recipes/{}/favorite", recipe))
      .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::delete()
      .uri(&format!("/api/recipes/{}/shopping_cart", recipe))
      .insert_header(("X-User-ID", "not-a-uuid"))
      .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
  }
}
