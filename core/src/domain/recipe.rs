// foodgram-core/src/domain/recipe.rs

//! Validation of recipe submissions (create and update).

use super::error::{DomainResult, ValidationErrors};
use super::models::{IngredientId, TagId};
use serde::Deserialize;
use std::collections::HashSet;

pub const MAX_NAME_LEN: usize = 200;
pub const MIN_POSITIVE: i32 = 1;
/// Upper bound of the small-integer columns (amount, cooking time).
pub const MAX_SMALL_INT: i32 = 32_767;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IngredientAmount {
  pub id: IngredientId,
  pub amount: i32,
}

/// A recipe as submitted. `tags` and `ingredients` are optional here so a
/// missing field can be reported instead of failing deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeDraft {
  pub name: String,
  pub text: String,
  pub image: String,
  pub cooking_time: i32,
  #[serde(default)]
  pub tags: Option<Vec<TagId>>,
  #[serde(default)]
  pub ingredients: Option<Vec<IngredientAmount>>,
}

/// A draft that passed validation. Tags are de-duplicated and ingredient ids
/// are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRecipe {
  pub name: String,
  pub text: String,
  pub image: String,
  pub cooking_time: i32,
  pub tags: Vec<TagId>,
  pub ingredients: Vec<IngredientAmount>,
}

impl RecipeDraft {
  /// Collects every violation rather than stopping at the first one.
  pub fn validate(self) -> DomainResult<ValidRecipe> {
    let mut errors = ValidationErrors::new();

    let name = self.name.trim().to_string();
    if name.is_empty() {
      errors.add("name", "This field may not be blank.");
    } else if name.chars().count() > MAX_NAME_LEN {
      errors.add("name", format!("Ensure this field has no more than {MAX_NAME_LEN} characters."));
    }
    if self.text.trim().is_empty() {
      errors.add("text", "This field may not be blank.");
    }
    if self.image.trim().is_empty() {
      errors.add("image", "This field may not be blank.");
    }
    if !(MIN_POSITIVE..=MAX_SMALL_INT).contains(&self.cooking_time) {
      errors.add(
        "cooking_time",
        format!("Cooking time must be between {MIN_POSITIVE} and {MAX_SMALL_INT} minutes."),
      );
    }

    let tags = match self.tags {
      None => {
        errors.add("tags", "This field is required.");
        Vec::new()
      }
      Some(tags) if tags.is_empty() => {
        errors.add("tags", "At least one tag is required.");
        Vec::new()
      }
      Some(tags) => {
        let mut seen = HashSet::new();
        tags.into_iter().filter(|t| seen.insert(*t)).collect()
      }
    };

    let ingredients = match self.ingredients {
      None => {
        errors.add("ingredients", "This field is required.");
        Vec::new()
      }
      Some(items) if items.is_empty() => {
        errors.add("ingredients", "At least one ingredient is required.");
        Vec::new()
      }
      Some(items) => {
        let mut seen = HashSet::new();
        for item in &items {
          if !(MIN_POSITIVE..=MAX_SMALL_INT).contains(&item.amount) {
            errors.add(
              "ingredients",
              format!(
                "Amount of ingredient {} must be between {MIN_POSITIVE} and {MAX_SMALL_INT}.",
                item.id
              ),
            );
          }
          if !seen.insert(item.id) {
            errors.add("ingredients", format!("Ingredient {} is listed more than once.", item.id));
          }
        }
        items
      }
    };

    errors.into_result(ValidRecipe {
      name,
      text: self.text,
      image: self.image,
      cooking_time: self.cooking_time,
      tags,
      ingredients,
    })
  }
}

/// Reports ids from `requested` that are missing in `known`, under `field`.
pub fn check_known_ids(field: &str, requested: &[uuid::Uuid], known: &[uuid::Uuid]) -> DomainResult<()> {
  let known: HashSet<_> = known.iter().collect();
  let mut errors = ValidationErrors::new();
  for id in requested.iter().filter(|id| !known.contains(id)) {
    errors.add(field, format!("Unknown id {id}."));
  }
  errors.into_result(())
}
