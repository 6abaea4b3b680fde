// foodgram_server/src/pipelines/recipe_pipeline.rs

//! Recipe create and update. Both take a full draft; an update replaces the
//! tag links and ingredient lines wholesale.

use crate::db;
use crate::errors::AppError;
use crate::pipelines::contexts::{RecipeWriteCtxData, RecipeWriteMode};
use foodgram::domain::recipe::check_known_ids;
use foodgram::{ContextData, DomainError, Pipeline, PipelineControl, PipelineRegistry, SkipCondition, ValidRecipe};
use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

pub fn register_recipe_write_pipeline(registry: &PipelineRegistry<AppError>) {
  let creating: SkipCondition<RecipeWriteCtxData> = Arc::new(|ctx: ContextData<RecipeWriteCtxData>| {
    let mode = ctx.read().mode;
    mode == RecipeWriteMode::Create
  });

  let mut p = Pipeline::<RecipeWriteCtxData, AppError>::new(&[
    ("check_authorship", false, Some(creating)),
    ("validate_draft", false, None),
    ("check_references", false, None),
    ("persist_recipe", false, None),
  ]);
  p.on_root("check_authorship", check_authorship);
  p.on_root("validate_draft", validate_draft);
  p.on_root("check_references", check_references);
  p.on_root("persist_recipe", persist_recipe);

  registry.register_pipeline(p);
  tracing::info!("Recipe write pipeline registered.");
}

#[instrument(name = "recipe_step::check_authorship", skip(ctx_data), err(Display))]
async fn check_authorship(ctx_data: ContextData<RecipeWriteCtxData>) -> Result<PipelineControl, AppError> {
  let (pool, mode, actor) = {
    let guard = ctx_data.read();
    (guard.app_state.db_pool.clone(), guard.mode, guard.actor)
  };
  if let RecipeWriteMode::Update(recipe_id) = mode {
    db::recipes::fetch_owned_recipe(&pool, recipe_id, actor).await?;
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "recipe_step::validate_draft", skip(ctx_data), err(Display))]
async fn validate_draft(ctx_data: ContextData<RecipeWriteCtxData>) -> Result<PipelineControl, AppError> {
  let draft = ctx_data
    .write()
    .draft
    .take()
    .ok_or_else(|| AppError::Internal("Recipe draft missing from pipeline context.".to_string()))?;
  let valid = draft.validate()?;
  ctx_data.write().valid = Some(valid);
  Ok(PipelineControl::Continue)
}

fn valid_recipe(ctx_data: &ContextData<RecipeWriteCtxData>) -> Result<ValidRecipe, AppError> {
  ctx_data
    .read()
    .valid
    .clone()
    .ok_or_else(|| AppError::Internal("Validated recipe missing from pipeline context.".to_string()))
}

/// Every referenced tag and ingredient must exist.
#[instrument(name = "recipe_step::check_references", skip(ctx_data), err(Display))]
async fn check_references(ctx_data: ContextData<RecipeWriteCtxData>) -> Result<PipelineControl, AppError> {
  let pool = ctx_data.read().app_state.db_pool.clone();
  let recipe = valid_recipe(&ctx_data)?;
  let ingredient_ids: Vec<Uuid> = recipe.ingredients.iter().map(|i| i.id).collect();

  let known_tags: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM tags WHERE id = ANY($1)")
    .bind(&recipe.tags)
    .fetch_all(&pool)
    .await?;
  let known_ingredients: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM ingredients WHERE id = ANY($1)")
    .bind(&ingredient_ids)
    .fetch_all(&pool)
    .await?;

  let tag_check = check_known_ids("tags", &recipe.tags, &known_tags);
  let ingredient_check = check_known_ids("ingredients", &ingredient_ids, &known_ingredients);
  match (tag_check, ingredient_check) {
    (Ok(()), Ok(())) => Ok(PipelineControl::Continue),
    (Err(DomainError::Validation(mut errors)), Err(DomainError::Validation(more))) => {
      for e in more.fields() {
        errors.add(&e.field, e.message.clone());
      }
      Err(AppError::Validation(errors))
    }
    (Err(e), _) | (_, Err(e)) => Err(e.into()),
  }
}

async fn write_links(tx: &mut Transaction<'_, Postgres>, recipe_id: Uuid, recipe: &ValidRecipe) -> Result<(), AppError> {
  sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) SELECT $1, UNNEST($2::UUID[])")
    .bind(recipe_id)
    .bind(&recipe.tags)
    .execute(&mut **tx)
    .await?;

  let ids: Vec<Uuid> = recipe.ingredients.iter().map(|i| i.id).collect();
  let positions: Vec<i32> = (0..recipe.ingredients.len() as i32).collect();
  let amounts: Vec<i32> = recipe.ingredients.iter().map(|i| i.amount).collect();
  sqlx::query(
    "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, position, amount) \
     SELECT $1, t.ingredient_id, t.position, t.amount \
     FROM UNNEST($2::UUID[], $3::INT[], $4::INT[]) AS t(ingredient_id, position, amount)",
  )
  .bind(recipe_id)
  .bind(&ids)
  .bind(&positions)
  .bind(&amounts)
  .execute(&mut **tx)
  .await?;
  Ok(())
}

/// Writes the recipe row, its tags and its ingredient lines in one
/// transaction.
#[instrument(name = "recipe_step::persist_recipe", skip(ctx_data), err(Display))]
async fn persist_recipe(ctx_data: ContextData<RecipeWriteCtxData>) -> Result<PipelineControl, AppError> {
  let (pool, mode, actor) = {
    let guard = ctx_data.read();
    (guard.app_state.db_pool.clone(), guard.mode, guard.actor)
  };
  let recipe = valid_recipe(&ctx_data)?;

  let mut tx = pool.begin().await?;
  let recipe_id = match mode {
    RecipeWriteMode::Create => {
      let recipe_id = Uuid::new_v4();
      sqlx::query(
        "INSERT INTO recipes (id, author_id, name, image, text, cooking_time) VALUES ($1, $2, $3, $4, $5, $6)",
      )
      .bind(recipe_id)
      .bind(actor)
      .bind(&recipe.name)
      .bind(&recipe.image)
      .bind(&recipe.text)
      .bind(recipe.cooking_time)
      .execute(&mut *tx)
      .await?;
      recipe_id
    }
    RecipeWriteMode::Update(recipe_id) => {
      let updated = sqlx::query(
        "UPDATE recipes SET name = $1, image = $2, text = $3, cooking_time = $4 WHERE id = $5 AND author_id = $6",
      )
      .bind(&recipe.name)
      .bind(&recipe.image)
      .bind(&recipe.text)
      .bind(recipe.cooking_time)
      .bind(recipe_id)
      .bind(actor)
      .execute(&mut *tx)
      .await?;
      if updated.rows_affected() == 0 {
        // Deleted between the authorship check and the write.
        return Err(AppError::NotFound(format!("Recipe with ID {} not found.", recipe_id)));
      }
      sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;
      sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;
      recipe_id
    }
  };
  write_links(&mut tx, recipe_id, &recipe).await?;
  tx.commit().await?;

  debug!(tag_count = recipe.tags.len(), line_count = recipe.ingredients.len(), "Recipe links written.");
  info!(%recipe_id, ?mode, "Recipe saved.");
  ctx_data.write().recipe_id = Some(recipe_id);
  Ok(PipelineControl::Continue)
}
