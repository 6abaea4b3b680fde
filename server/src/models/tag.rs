// foodgram_server/src/models/tag.rs

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Tag {
  pub id: Uuid,
  pub name: String,
  /// `#RRGGBB`
  pub color: String,
  pub slug: String,
}
