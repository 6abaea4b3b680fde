// foodgram-core/src/store/mod.rs

//! The persistence collaborator as seen by the domain: two narrow async
//! traits, plus an in-memory implementation.

pub mod memory;

use crate::domain::models::{Ingredient, IngredientId, RecipeId, UserId};
use crate::domain::relation::RelationKind;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::InMemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
  /// An insert hit a uniqueness constraint.
  #[error("unique constraint violated")]
  UniqueViolation,

  #[error("storage backend failure: {0}")]
  Backend(#[source] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read access needed to build a user's shopping list.
#[async_trait]
pub trait ShoppingListSource: Send + Sync {
  /// Recipe ids in the user's cart, in insertion order.
  async fn cart_recipe_ids(&self, user_id: UserId) -> StoreResult<Vec<RecipeId>>;

  /// `(ingredient_id, amount)` pairs of a recipe, in stored order.
  async fn ingredient_lines(&self, recipe_id: RecipeId) -> StoreResult<Vec<(IngredientId, i32)>>;

  async fn ingredient(&self, ingredient_id: IngredientId) -> StoreResult<Option<Ingredient>>;
}

/// Link tables governed by the toggle state machine.
#[async_trait]
pub trait RelationStore: Send + Sync {
  /// Whether the target row (user or recipe, per `kind`) exists.
  async fn target_exists(&self, kind: RelationKind, target: Uuid) -> StoreResult<bool>;

  async fn exists(&self, kind: RelationKind, actor: UserId, target: Uuid) -> StoreResult<bool>;

  /// Fails with `StoreError::UniqueViolation` when the pair is already present.
  async fn insert(&self, kind: RelationKind, actor: UserId, target: Uuid) -> StoreResult<()>;

  /// Returns the number of rows removed.
  async fn delete(&self, kind: RelationKind, actor: UserId, target: Uuid) -> StoreResult<u64>;
}
