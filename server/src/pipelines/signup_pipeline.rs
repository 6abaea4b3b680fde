// foodgram_server/src/pipelines/signup_pipeline.rs

//! Registration and password change.

use crate::db;
use crate::errors::AppError;
use crate::models::user::USER_COLUMNS;
use crate::models::User;
use crate::pipelines::contexts::{SetPasswordCtxData, SignupCtxData};
use crate::services::auth_service::{self, MIN_PASSWORD_LEN};
use foodgram::{ContextData, Pipeline, PipelineControl, PipelineRegistry, ValidationErrors};
use tracing::{event, info, instrument, warn, Level};
use uuid::Uuid;

const MAX_EMAIL_LEN: usize = 254;
const MAX_NAME_LEN: usize = 150;

pub fn register_signup_pipeline(registry: &PipelineRegistry<AppError>) {
  let mut p = Pipeline::<SignupCtxData, AppError>::new(&[
    ("validate_signup_input", false, None),
    ("check_existing_user_signup", false, None),
    ("create_user_in_db", false, None),
  ]);
  p.on_root("validate_signup_input", validate_signup_input);
  p.on_root("check_existing_user_signup", check_existing_user);
  p.on_root("create_user_in_db", create_user_in_db);

  registry.register_pipeline(p);
  tracing::info!("Sign-up pipeline registered.");
}

pub fn register_set_password_pipeline(registry: &PipelineRegistry<AppError>) {
  let mut p = Pipeline::<SetPasswordCtxData, AppError>::new(&[
    ("load_current_hash", false, None),
    ("verify_current_password", false, None),
    ("store_new_hash", false, None),
  ]);
  p.on_root("load_current_hash", load_current_hash);
  p.on_root("verify_current_password", verify_current_password);
  p.on_root("store_new_hash", store_new_hash);

  registry.register_pipeline(p);
  tracing::info!("Set-password pipeline registered.");
}

fn check_name_field(errors: &mut ValidationErrors, field: &str, value: &str) {
  if value.trim().is_empty() {
    errors.add(field, "This field may not be blank.");
  } else if value.chars().count() > MAX_NAME_LEN {
    errors.add(field, format!("Ensure this field has no more than {} characters.", MAX_NAME_LEN));
  }
}

/// Field checks for a registration request, all reported at once.
pub fn signup_field_errors(email: &str, username: &str, first_name: &str, last_name: &str, password: &str) -> ValidationErrors {
  let mut errors = ValidationErrors::new();

  let email = email.trim();
  if email.is_empty() || !email.contains('@') {
    errors.add("email", "Enter a valid email address.");
  } else if email.chars().count() > MAX_EMAIL_LEN {
    errors.add("email", format!("Ensure this field has no more than {} characters.", MAX_EMAIL_LEN));
  }

  check_name_field(&mut errors, "username", username);
  if !username
    .chars()
    .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'))
  {
    errors.add(
      "username",
      "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters.",
    );
  }
  check_name_field(&mut errors, "first_name", first_name);
  check_name_field(&mut errors, "last_name", last_name);

  if password.chars().count() < MIN_PASSWORD_LEN {
    errors.add(
      "password",
      format!("Password must be at least {} characters long.", MIN_PASSWORD_LEN),
    );
  }
  errors
}

#[instrument(name = "signup_step::validate_input", skip(ctx_data), err(Display))]
async fn validate_signup_input(ctx_data: ContextData<SignupCtxData>) -> Result<PipelineControl, AppError> {
  let errors = {
    let guard = ctx_data.read();
    signup_field_errors(
      &guard.email,
      &guard.username,
      &guard.first_name,
      &guard.last_name,
      &guard.password,
    )
  };
  errors.into_result(PipelineControl::Continue).map_err(AppError::from)
}

#[instrument(name = "signup_step::check_existing_user", skip(ctx_data), err(Display))]
async fn check_existing_user(ctx_data: ContextData<SignupCtxData>) -> Result<PipelineControl, AppError> {
  let (email, username, pool) = {
    let guard = ctx_data.read();
    (guard.email.trim().to_string(), guard.username.clone(), guard.app_state.db_pool.clone())
  };

  let (email_taken, username_taken): (bool, bool) = sqlx::query_as(
    "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1)), \
            EXISTS(SELECT 1 FROM users WHERE username = $2)",
  )
  .bind(&email)
  .bind(&username)
  .fetch_one(&pool)
  .await
  .map_err(|e| {
    event!(Level::ERROR, error = %e, "Database error while checking for existing user.");
    AppError::Sqlx(e)
  })?;

  let mut errors = ValidationErrors::new();
  if email_taken {
    errors.add("email", "A user with that email already exists.");
  }
  if username_taken {
    errors.add("username", "A user with that username already exists.");
  }
  if !errors.is_empty() {
    warn!(%email, %username, "Signup attempt with taken credentials.");
  }
  errors.into_result(PipelineControl::Continue).map_err(AppError::from)
}

#[instrument(name = "signup_step::create_user", skip(ctx_data), err(Display))]
async fn create_user_in_db(ctx_data: ContextData<SignupCtxData>) -> Result<PipelineControl, AppError> {
  let (email, username, first_name, last_name, password, pool) = {
    let guard = ctx_data.read();
    (
      guard.email.trim().to_string(),
      guard.username.clone(),
      guard.first_name.trim().to_string(),
      guard.last_name.trim().to_string(),
      guard.password.clone(),
      guard.app_state.db_pool.clone(),
    )
  };

  let password_hash = auth_service::hash_password(&password)?;
  let sql = format!(
    "INSERT INTO users (id, email, username, first_name, last_name, password_hash) \
     VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
  );
  let new_user: User = sqlx::query_as(&sql)
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(&username)
    .bind(&first_name)
    .bind(&last_name)
    .bind(password_hash)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
      if db::is_unique_violation(&e) {
        // Lost a race with a concurrent registration.
        warn!(%email, %username, "Unique violation while creating user.");
        AppError::validation("email", "A user with that email or username already exists.")
      } else {
        event!(Level::ERROR, error = %e, "Database error while creating user.");
        AppError::Sqlx(e)
      }
    })?;

  info!("User created successfully: ID={}, Username={}", new_user.id, new_user.username);
  ctx_data.write().created_user = Some(new_user);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "set_password_step::load_current_hash", skip(ctx_data), err(Display))]
async fn load_current_hash(ctx_data: ContextData<SetPasswordCtxData>) -> Result<PipelineControl, AppError> {
  let (user_id, pool) = {
    let guard = ctx_data.read();
    (guard.user_id, guard.app_state.db_pool.clone())
  };
  let user = db::users::fetch_user(&pool, user_id).await?;
  ctx_data.write().stored_hash = Some(user.password_hash);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "set_password_step::verify_current_password", skip(ctx_data), err(Display))]
async fn verify_current_password(ctx_data: ContextData<SetPasswordCtxData>) -> Result<PipelineControl, AppError> {
  let (stored_hash, current_password) = {
    let guard = ctx_data.read();
    (guard.stored_hash.clone(), guard.current_password.clone())
  };
  let stored_hash =
    stored_hash.ok_or_else(|| AppError::Internal("Password hash was not loaded before verification.".to_string()))?;

  if !auth_service::verify_password(&stored_hash, &current_password)? {
    warn!("Password change rejected: current password does not match.");
    return Err(AppError::validation("current_password", "Wrong password."));
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "set_password_step::store_new_hash", skip(ctx_data), err(Display))]
async fn store_new_hash(ctx_data: ContextData<SetPasswordCtxData>) -> Result<PipelineControl, AppError> {
  let (user_id, new_password, pool) = {
    let guard = ctx_data.read();
    (guard.user_id, guard.new_password.clone(), guard.app_state.db_pool.clone())
  };

  let new_hash = auth_service::hash_password(&new_password).map_err(|e| match e {
    AppError::Validation(errors) => AppError::Validation(ValidationErrors::single(
      "new_password",
      errors.fields().first().map(|f| f.message.clone()).unwrap_or_default(),
    )),
    other => other,
  })?;

  sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
    .bind(new_hash)
    .bind(user_id)
    .execute(&pool)
    .await?;
  info!(%user_id, "Password changed.");
  Ok(PipelineControl::Continue)
}
