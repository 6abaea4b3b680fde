// foodgram_server/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const USER_COLUMNS: &str = "id, email, username, first_name, last_name, password_hash, created_at, updated_at";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
  pub id: Uuid,
  pub email: String,
  pub username: String,
  pub first_name: String,
  pub last_name: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A user as seen by a viewer.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
  pub id: Uuid,
  pub email: String,
  pub username: String,
  pub first_name: String,
  pub last_name: String,
  pub is_subscribed: bool,
}

impl UserView {
  pub fn new(user: User, is_subscribed: bool) -> Self {
    Self {
      id: user.id,
      email: user.email,
      username: user.username,
      first_name: user.first_name,
      last_name: user.last_name,
      is_subscribed,
    }
  }
}
