// foodgram-core/src/domain/models.rs

//! Storage-independent records the domain logic reads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;
pub type RecipeId = Uuid;
pub type IngredientId = Uuid;
pub type TagId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
  pub id: IngredientId,
  pub name: String,
  pub measurement_unit: String,
}

/// "Recipe is in this user's shopping cart."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CartEntry {
  pub user_id: UserId,
  pub recipe_id: RecipeId,
}

/// One ingredient requirement of a recipe. `amount` is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeIngredientLine {
  pub recipe_id: RecipeId,
  pub ingredient_id: IngredientId,
  pub amount: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FollowEdge {
  pub user_id: UserId,
  pub author_id: UserId,
}

/// One merged row of a shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedLine {
  pub label: String,
  pub total_amount: i64,
}

impl AggregatedLine {
  pub fn label_for(name: &str, measurement_unit: &str) -> String {
    format!("{name} ({measurement_unit})")
  }

  /// The text line written into the downloadable document.
  pub fn display_line(&self) -> String {
    format!("- {} - {}", self.label, self.total_amount)
  }
}
