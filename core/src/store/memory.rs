// foodgram-core/src/store/memory.rs

//! In-memory store used by tests and benchmarks. Mirrors the uniqueness and
//! ordering behavior the PostgreSQL store provides.

use super::{RelationStore, ShoppingListSource, StoreError, StoreResult};
use crate::domain::models::{CartEntry, FollowEdge, Ingredient, IngredientId, RecipeId, RecipeIngredientLine, UserId};
use crate::domain::relation::RelationKind;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
  users: HashSet<UserId>,
  recipes: HashSet<RecipeId>,
  ingredients: HashMap<IngredientId, Ingredient>,
  lines: Vec<RecipeIngredientLine>,
  /// Every relation row, in insertion order.
  relations: Vec<(RelationKind, UserId, Uuid)>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
  state: RwLock<State>,
}

impl InMemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_user(&self) -> UserId {
    let id = Uuid::new_v4();
    self.state.write().users.insert(id);
    id
  }

  pub fn add_ingredient(&self, name: &str, measurement_unit: &str) -> IngredientId {
    let id = Uuid::new_v4();
    self.state.write().ingredients.insert(
      id,
      Ingredient {
        id,
        name: name.to_string(),
        measurement_unit: measurement_unit.to_string(),
      },
    );
    id
  }

  /// Adds a recipe with its `(ingredient_id, amount)` lines in order.
  pub fn add_recipe(&self, lines: &[(IngredientId, i32)]) -> RecipeId {
    let recipe_id = Uuid::new_v4();
    let mut state = self.state.write();
    state.recipes.insert(recipe_id);
    state.lines.extend(lines.iter().map(|&(ingredient_id, amount)| RecipeIngredientLine {
      recipe_id,
      ingredient_id,
      amount,
    }));
    recipe_id
  }

  /// Removes a recipe and, like a cascading foreign key, every line and
  /// favorite/cart row pointing at it.
  pub fn delete_recipe(&self, recipe_id: RecipeId) {
    let mut state = self.state.write();
    state.recipes.remove(&recipe_id);
    state.lines.retain(|l| l.recipe_id != recipe_id);
    state
      .relations
      .retain(|(kind, _, target)| *kind == RelationKind::Follow || *target != recipe_id);
  }

  pub fn cart_entries(&self, user_id: UserId) -> Vec<CartEntry> {
    self
      .state
      .read()
      .relations
      .iter()
      .filter(|(kind, actor, _)| *kind == RelationKind::ShoppingCart && *actor == user_id)
      .map(|&(_, user_id, recipe_id)| CartEntry { user_id, recipe_id })
      .collect()
  }

  /// Authors `user_id` follows, oldest subscription first.
  pub fn follow_edges(&self, user_id: UserId) -> Vec<FollowEdge> {
    self
      .state
      .read()
      .relations
      .iter()
      .filter(|(kind, actor, _)| *kind == RelationKind::Follow && *actor == user_id)
      .map(|&(_, user_id, author_id)| FollowEdge { user_id, author_id })
      .collect()
  }

  pub fn relation_count(&self, kind: RelationKind, actor: UserId, target: Uuid) -> usize {
    self
      .state
      .read()
      .relations
      .iter()
      .filter(|row| **row == (kind, actor, target))
      .count()
  }
}

#[async_trait]
impl ShoppingListSource for InMemoryStore {
  async fn cart_recipe_ids(&self, user_id: UserId) -> StoreResult<Vec<RecipeId>> {
    Ok(self.cart_entries(user_id).into_iter().map(|e| e.recipe_id).collect())
  }

  async fn ingredient_lines(&self, recipe_id: RecipeId) -> StoreResult<Vec<(IngredientId, i32)>> {
    Ok(
      self
        .state
        .read()
        .lines
        .iter()
        .filter(|l| l.recipe_id == recipe_id)
        .map(|l| (l.ingredient_id, l.amount))
        .collect(),
    )
  }

  async fn ingredient(&self, ingredient_id: IngredientId) -> StoreResult<Option<Ingredient>> {
    Ok(self.state.read().ingredients.get(&ingredient_id).cloned())
  }
}

#[async_trait]
impl RelationStore for InMemoryStore {
  async fn target_exists(&self, kind: RelationKind, target: Uuid) -> StoreResult<bool> {
    let state = self.state.read();
    Ok(match kind {
      RelationKind::Follow => state.users.contains(&target),
      RelationKind::Favorite | RelationKind::ShoppingCart => state.recipes.contains(&target),
    })
  }

  async fn exists(&self, kind: RelationKind, actor: UserId, target: Uuid) -> StoreResult<bool> {
    Ok(self.relation_count(kind, actor, target) > 0)
  }

  async fn insert(&self, kind: RelationKind, actor: UserId, target: Uuid) -> StoreResult<()> {
    let mut state = self.state.write();
    if state.relations.contains(&(kind, actor, target)) {
      return Err(StoreError::UniqueViolation);
    }
    state.relations.push((kind, actor, target));
    Ok(())
  }

  async fn delete(&self, kind: RelationKind, actor: UserId, target: Uuid) -> StoreResult<u64> {
    let mut state = self.state.write();
    let before = state.relations.len();
    state.relations.retain(|row| *row != (kind, actor, target));
    Ok((before - state.relations.len()) as u64)
  }
}
