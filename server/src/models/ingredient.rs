// foodgram_server/src/models/ingredient.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
  pub id: Uuid,
  pub name: String,
  pub measurement_unit: String,
}

impl From<Ingredient> for foodgram::Ingredient {
  fn from(row: Ingredient) -> Self {
    foodgram::Ingredient {
      id: row.id,
      name: row.name,
      measurement_unit: row.measurement_unit,
    }
  }
}

/// An ingredient line of a recipe, joined with the ingredient record.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecipeIngredientView {
  pub id: Uuid,
  pub name: String,
  pub measurement_unit: String,
  pub amount: i32,
}
