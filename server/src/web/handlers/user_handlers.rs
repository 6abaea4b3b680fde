// foodgram_server/src/web/handlers/user_handlers.rs

use actix_web::{web, HttpResponse};
use foodgram::{ContextData, Page, PipelineResult, Viewer};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::user::USER_COLUMNS;
use crate::models::{User, UserView};
use crate::pipelines::contexts::{SetPasswordCtxData, SignupCtxData};
use crate::state::AppState;
use crate::web::extractors::{AuthenticatedUser, MaybeUser, QueryPairs};

#[derive(Deserialize, Debug)]
pub struct SignupRequestPayload {
  pub email: String,
  pub username: String,
  pub first_name: String,
  pub last_name: String,
  pub password: String,
}

#[derive(Deserialize)]
pub struct SetPasswordPayload {
  pub current_password: String,
  pub new_password: String,
}

#[instrument(
    name = "handler::signup",
    skip(app_state, req_payload),
    fields(req_email = %req_payload.email, req_username = %req_payload.username)
)]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SignupRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx = ContextData::new(SignupCtxData {
    app_state: app_state.get_ref().clone(),
    email: payload.email,
    username: payload.username,
    first_name: payload.first_name,
    last_name: payload.last_name,
    password: payload.password,
    created_user: None,
  });

  match app_state.pipelines.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let user = ctx.write().created_user.take().ok_or_else(|| {
        warn!("Signup pipeline completed but no user was set in context.");
        AppError::Internal("Signup completed without creating a user.".to_string())
      })?;
      info!("Signup successful. User ID: {}", user.id);
      Ok(HttpResponse::Created().json(UserView::new(user, false)))
    }
    PipelineResult::Stopped => Err(AppError::Internal(
      "Signup process was halted by an internal step.".to_string(),
    )),
  }
}

#[instrument(name = "handler::list_users", skip(app_state, query, viewer))]
pub async fn list_users_handler(
  app_state: web::Data<AppState>,
  query: QueryPairs,
  viewer: MaybeUser,
) -> Result<HttpResponse, AppError> {
  let page_req = query.page_request(app_state.config.default_page_size)?;
  let pool = &app_state.db_pool;

  let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(pool).await?;
  page_req.ensure_in_range(count)?;

  let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY username LIMIT $1 OFFSET $2");
  let users: Vec<User> = sqlx::query_as(&sql)
    .bind(page_req.limit_i64())
    .bind(page_req.offset())
    .fetch_all(pool)
    .await
    .map_err(|e| {
      error!("Failed to fetch users from database: {}", e);
      AppError::Sqlx(e)
    })?;
  let views = db::users::user_views(pool, viewer.0, users).await?;

  let base_url = &app_state.config.app_base_url;
  let page = Page::new(views, count, page_req, |p, l| query.page_link(base_url, "/api/users", p, l));
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::get_user", skip(app_state, path, viewer), fields(user_id = %path.as_ref()))]
pub async fn get_user_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  viewer: MaybeUser,
) -> Result<HttpResponse, AppError> {
  let view = db::users::user_view(&app_state.db_pool, viewer.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(name = "handler::me", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn me_handler(app_state: web::Data<AppState>, auth_user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  let viewer = Viewer::User(auth_user.user_id);
  let view = db::users::user_view(&app_state.db_pool, viewer, auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(name = "handler::set_password", skip(app_state, req_payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn set_password_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SetPasswordPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx = ContextData::new(SetPasswordCtxData {
    app_state: app_state.get_ref().clone(),
    user_id: auth_user.user_id,
    current_password: payload.current_password,
    new_password: payload.new_password,
    stored_hash: None,
  });

  match app_state.pipelines.run(ctx).await? {
    PipelineResult::Completed => Ok(HttpResponse::NoContent().finish()),
    PipelineResult::Stopped => Err(AppError::Internal(
      "Password change was halted by an internal step.".to_string(),
    )),
  }
}

/// Authors the caller follows, each with their newest recipes.
#[instrument(name = "handler::subscriptions", skip(app_state, query, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn subscriptions_handler(
  app_state: web::Data<AppState>,
  query: QueryPairs,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let page_req = query.page_request(app_state.config.default_page_size)?;
  let recipes_limit = query.parse_opt::<u32>("recipes_limit")?;
  let pool = &app_state.db_pool;

  let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE user_id = $1")
    .bind(auth_user.user_id)
    .fetch_one(pool)
    .await?;
  page_req.ensure_in_range(count)?;

  let authors: Vec<User> = sqlx::query_as(
    "SELECT u.* FROM follows f JOIN users u ON u.id = f.author_id \
     WHERE f.user_id = $1 ORDER BY f.id LIMIT $2 OFFSET $3",
  )
  .bind(auth_user.user_id)
  .bind(page_req.limit_i64())
  .bind(page_req.offset())
  .fetch_all(pool)
  .await?;

  let results =
    db::recipes::authors_with_recipes(pool, Viewer::User(auth_user.user_id), authors, recipes_limit).await?;
  let base_url = &app_state.config.app_base_url;
  let page = Page::new(results, count, page_req, |p, l| {
    query.page_link(base_url, "/api/users/subscriptions", p, l)
  });
  Ok(HttpResponse::Ok().json(page))
}
