// foodgram_server/src/db/mod.rs

//! PostgreSQL access: the domain storage traits, shared read queries and
//! startup seeding.

pub mod recipes;
pub mod seed;
pub mod users;

use async_trait::async_trait;
use foodgram::{
  Ingredient, IngredientId, RecipeId, RelationKind, RelationStore, ShoppingListSource, StoreError, StoreResult,
  UserId,
};
use sqlx::PgPool;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::models;

/// The domain storage traits over a connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

/// Unique-constraint violations become `StoreError::UniqueViolation`,
/// anything else is a backend failure.
pub fn store_error(err: sqlx::Error) -> StoreError {
  match err {
    sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::UniqueViolation,
    other => {
      error!(error = %other, "Database error in store operation.");
      StoreError::Backend(other.into())
    }
  }
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
  matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[async_trait]
impl ShoppingListSource for PgStore {
  async fn cart_recipe_ids(&self, user_id: UserId) -> StoreResult<Vec<RecipeId>> {
    sqlx::query_scalar("SELECT recipe_id FROM shopping_cart WHERE user_id = $1 ORDER BY id")
      .bind(user_id)
      .fetch_all(&self.pool)
      .await
      .map_err(store_error)
  }

  async fn ingredient_lines(&self, recipe_id: RecipeId) -> StoreResult<Vec<(IngredientId, i32)>> {
    sqlx::query_as("SELECT ingredient_id, amount FROM recipe_ingredients WHERE recipe_id = $1 ORDER BY position")
      .bind(recipe_id)
      .fetch_all(&self.pool)
      .await
      .map_err(store_error)
  }

  async fn ingredient(&self, ingredient_id: IngredientId) -> StoreResult<Option<Ingredient>> {
    let row: Option<models::Ingredient> =
      sqlx::query_as("SELECT id, name, measurement_unit FROM ingredients WHERE id = $1")
        .bind(ingredient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
    Ok(row.map(Into::into))
  }
}

// Table and column names come from the static relation descriptors.
#[async_trait]
impl RelationStore for PgStore {
  async fn target_exists(&self, kind: RelationKind, target: Uuid) -> StoreResult<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", kind.descriptor().target_table);
    sqlx::query_scalar(&sql)
      .bind(target)
      .fetch_one(&self.pool)
      .await
      .map_err(store_error)
  }

  async fn exists(&self, kind: RelationKind, actor: UserId, target: Uuid) -> StoreResult<bool> {
    let desc = kind.descriptor();
    let sql = format!(
      "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1 AND {} = $2)",
      desc.table, desc.actor_column, desc.target_column
    );
    sqlx::query_scalar(&sql)
      .bind(actor)
      .bind(target)
      .fetch_one(&self.pool)
      .await
      .map_err(store_error)
  }

  #[instrument(name = "PgStore::insert", skip(self), err(Display))]
  async fn insert(&self, kind: RelationKind, actor: UserId, target: Uuid) -> StoreResult<()> {
    let desc = kind.descriptor();
    let sql = format!(
      "INSERT INTO {} ({}, {}) VALUES ($1, $2)",
      desc.table, desc.actor_column, desc.target_column
    );
    sqlx::query(&sql)
      .bind(actor)
      .bind(target)
      .execute(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(())
  }

  #[instrument(name = "PgStore::delete", skip(self), err(Display))]
  async fn delete(&self, kind: RelationKind, actor: UserId, target: Uuid) -> StoreResult<u64> {
    let desc = kind.descriptor();
    let sql = format!(
      "DELETE FROM {} WHERE {} = $1 AND {} = $2",
      desc.table, desc.actor_column, desc.target_column
    );
    let result = sqlx::query(&sql)
      .bind(actor)
      .bind(target)
      .execute(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(result.rows_affected())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use sqlx::error::{DatabaseError, ErrorKind};
  use std::error::Error as StdError;
  use std::fmt;

  /// What the driver reports for a failed constraint.
  #[derive(Debug)]
  struct ConstraintError {
    unique: bool,
  }

  impl fmt::Display for ConstraintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.message())
    }
  }

  impl StdError for ConstraintError {}

  impl DatabaseError for ConstraintError {
    fn message(&self) -> &str {
      if self.unique {
        "duplicate key value violates unique constraint \"favorites_user_id_recipe_id_key\""
      } else {
        "new row violates check constraint \"follows_check\""
      }
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
      self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
      self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
      self
    }

    fn kind(&self) -> ErrorKind {
      if self.unique {
        ErrorKind::UniqueViolation
      } else {
        ErrorKind::CheckViolation
      }
    }
  }

  #[test]
  fn unique_violations_map_to_the_store_conflict() {
    let err = sqlx::Error::Database(Box::new(ConstraintError { unique: true }));
    assert!(is_unique_violation(&err));
    assert!(matches!(store_error(err), StoreError::UniqueViolation));
  }

  #[test]
  fn other_failures_are_backend_errors() {
    let err = sqlx::Error::Database(Box::new(ConstraintError { unique: false }));
    assert!(!is_unique_violation(&err));
    assert!(matches!(store_error(err), StoreError::Backend(_)));
    assert!(matches!(store_error(sqlx::Error::PoolTimedOut), StoreError::Backend(_)));
  }
}
