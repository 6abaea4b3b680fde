// foodgram_server/src/db/seed.rs

//! Startup seeding of the catalog: default tags and an ingredient list.

use crate::errors::{AppError, Result};
use serde::Deserialize;
use sqlx::PgPool;
use std::path::Path;
use tracing::{info, instrument};
use uuid::Uuid;

const DEFAULT_TAGS: [(&str, &str, &str); 3] = [
  ("Breakfast", "#E26C2D", "breakfast"),
  ("Lunch", "#49B64E", "lunch"),
  ("Dinner", "#8775D2", "dinner"),
];

#[derive(Debug, Deserialize)]
struct IngredientSeed {
  name: String,
  measurement_unit: String,
}

fn parse_ingredients(raw: &str) -> Result<Vec<IngredientSeed>> {
  serde_json::from_str(raw).map_err(|e| AppError::Config(format!("Invalid ingredient seed file: {}", e)))
}

/// Inserts the default tags and, when `ingredients_path` is given, every
/// ingredient from that JSON file that is not present yet.
#[instrument(name = "db::seed", skip(pool))]
pub async fn seed_db(pool: &PgPool, ingredients_path: Option<&Path>) -> Result<()> {
  let mut tx = pool.begin().await?;

  for (name, color, slug) in DEFAULT_TAGS {
    sqlx::query("INSERT INTO tags (id, name, color, slug) VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING")
      .bind(Uuid::new_v4())
      .bind(name)
      .bind(color)
      .bind(slug)
      .execute(&mut *tx)
      .await?;
  }

  let mut inserted = 0u64;
  if let Some(path) = ingredients_path {
    let raw = tokio::fs::read_to_string(path)
      .await
      .map_err(|e| AppError::Config(format!("Cannot read ingredient seed file {}: {}", path.display(), e)))?;
    for item in parse_ingredients(&raw)? {
      let result = sqlx::query(
        "INSERT INTO ingredients (id, name, measurement_unit) SELECT $1, $2, $3 \
         WHERE NOT EXISTS (SELECT 1 FROM ingredients WHERE name = $2 AND measurement_unit = $3)",
      )
      .bind(Uuid::new_v4())
      .bind(&item.name)
      .bind(&item.measurement_unit)
      .execute(&mut *tx)
      .await?;
      inserted += result.rows_affected();
    }
  }

  tx.commit().await?;
  info!(ingredients_inserted = inserted, "Database seeded.");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_the_ingredient_file_format() {
    let items = parse_ingredients(r#"[{"name": "flour", "measurement_unit": "g"}, {"name": "egg", "measurement_unit": "pcs"}]"#)
      .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].measurement_unit, "pcs");
  }

  #[test]
  fn malformed_file_is_a_config_error() {
    assert!(matches!(parse_ingredients("{not json"), Err(AppError::Config(_))));
  }
}
