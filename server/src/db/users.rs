// foodgram_server/src/db/users.rs

use crate::errors::{AppError, Result};
use crate::models::user::USER_COLUMNS;
use crate::models::{User, UserView};
use foodgram::Viewer;
use sqlx::PgPool;
use std::collections::HashSet;
use tracing::{error, warn};
use uuid::Uuid;

pub async fn fetch_user(pool: &PgPool, user_id: Uuid) -> Result<User> {
  let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
  let user: Option<User> = sqlx::query_as(&sql)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
      error!("Database error while fetching user {}: {}", user_id, e);
      AppError::Sqlx(e)
    })?;
  user.ok_or_else(|| {
    warn!("User with ID {} not found.", user_id);
    AppError::NotFound(format!("User with ID {} not found.", user_id))
  })
}

/// Which of `author_ids` the viewer follows. Empty for an anonymous viewer.
pub async fn followed_among(pool: &PgPool, viewer: Viewer, author_ids: &[Uuid]) -> Result<HashSet<Uuid>> {
  let Some(user_id) = viewer.user_id() else {
    return Ok(HashSet::new());
  };
  let ids: Vec<Uuid> = sqlx::query_scalar("SELECT author_id FROM follows WHERE user_id = $1 AND author_id = ANY($2)")
    .bind(user_id)
    .bind(author_ids)
    .fetch_all(pool)
    .await?;
  Ok(ids.into_iter().collect())
}

/// Builds views for `users`, computing `is_subscribed` for the viewer.
pub async fn user_views(pool: &PgPool, viewer: Viewer, users: Vec<User>) -> Result<Vec<UserView>> {
  let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
  let followed = followed_among(pool, viewer, &ids).await?;
  Ok(
    users
      .into_iter()
      .map(|u| {
        let is_subscribed = viewer.flag(|_| followed.contains(&u.id));
        UserView::new(u, is_subscribed)
      })
      .collect(),
  )
}

pub async fn user_view(pool: &PgPool, viewer: Viewer, user_id: Uuid) -> Result<UserView> {
  let user = fetch_user(pool, user_id).await?;
  let mut views = user_views(pool, viewer, vec![user]).await?;
  views
    .pop()
    .ok_or_else(|| AppError::Internal("User view could not be built.".to_string()))
}
