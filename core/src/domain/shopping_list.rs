// foodgram-core/src/domain/shopping_list.rs

//! Shopping list aggregation over the recipes in a user's cart.
//!
//! Lines are merged by their display key `(name, measurement_unit)`, not by
//! ingredient id: two ingredient records with the same name and unit end up
//! on one line. Groups come out in the order their key was first seen.

use super::models::{AggregatedLine, UserId};
use crate::store::{ShoppingListSource, StoreResult};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Builds the shopping list of `user_id`. An empty cart gives an empty list.
#[instrument(name = "shopping_list::build", skip_all, fields(user_id = %user_id), err(Display))]
pub async fn build_shopping_list<S>(source: &S, user_id: UserId) -> StoreResult<Vec<AggregatedLine>>
where
  S: ShoppingListSource + ?Sized,
{
  let recipe_ids = source.cart_recipe_ids(user_id).await?;
  let mut aggregator = ShoppingListAggregator::default();

  for recipe_id in recipe_ids {
    for (ingredient_id, amount) in source.ingredient_lines(recipe_id).await? {
      match source.ingredient(ingredient_id).await? {
        Some(ingredient) => aggregator.add(&ingredient.name, &ingredient.measurement_unit, amount),
        None => debug!(%recipe_id, %ingredient_id, "Ingredient line references a missing ingredient, skipped."),
      }
    }
  }

  let lines = aggregator.finish();
  debug!(line_count = lines.len(), "Shopping list aggregated.");
  Ok(lines)
}

/// Order-preserving sum of amounts keyed by `(name, measurement_unit)`.
#[derive(Debug, Default)]
pub struct ShoppingListAggregator {
  positions: HashMap<(String, String), usize>,
  lines: Vec<AggregatedLine>,
}

impl ShoppingListAggregator {
  pub fn add(&mut self, name: &str, measurement_unit: &str, amount: i32) {
    let key = (name.to_string(), measurement_unit.to_string());
    match self.positions.get(&key) {
      Some(&idx) => self.lines[idx].total_amount += i64::from(amount),
      None => {
        self.positions.insert(key, self.lines.len());
        self.lines.push(AggregatedLine {
          label: AggregatedLine::label_for(name, measurement_unit),
          total_amount: i64::from(amount),
        });
      }
    }
  }

  pub fn finish(self) -> Vec<AggregatedLine> {
    self.lines
  }
}
