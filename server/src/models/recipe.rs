// foodgram_server/src/models/recipe.rs

use super::ingredient::RecipeIngredientView;
use super::tag::Tag;
use super::user::UserView;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const RECIPE_COLUMNS: &str = "id, author_id, name, image, text, cooking_time, published_at";

#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
  pub id: Uuid,
  pub author_id: Uuid,
  pub name: String,
  pub image: String,
  pub text: String,
  pub cooking_time: i32,
  pub published_at: DateTime<Utc>,
}

/// Full recipe with its viewer-dependent flags.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeView {
  pub id: Uuid,
  pub tags: Vec<Tag>,
  pub author: UserView,
  pub ingredients: Vec<RecipeIngredientView>,
  pub is_favorited: bool,
  pub is_in_shopping_cart: bool,
  pub name: String,
  pub image: String,
  pub text: String,
  pub cooking_time: i32,
  pub published_at: DateTime<Utc>,
}

/// Compact form used in favorite/cart responses and subscription listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecipeShort {
  pub id: Uuid,
  pub name: String,
  pub image: String,
  pub cooking_time: i32,
}

impl From<RecipeRow> for RecipeShort {
  fn from(row: RecipeRow) -> Self {
    Self {
      id: row.id,
      name: row.name,
      image: row.image,
      cooking_time: row.cooking_time,
    }
  }
}

/// A followed author with (a prefix of) their recipes.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorWithRecipes {
  #[serde(flatten)]
  pub author: UserView,
  pub recipes: Vec<RecipeShort>,
  pub recipes_count: i64,
}
