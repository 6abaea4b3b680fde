// foodgram_server/src/db/recipes.rs

//! Recipe reads: filtered listing and assembly of viewer-dependent views.

use crate::db::users;
use crate::errors::{AppError, Result};
use crate::models::recipe::RECIPE_COLUMNS;
use crate::models::user::USER_COLUMNS;
use crate::models::{AuthorWithRecipes, RecipeIngredientView, RecipeRow, RecipeShort, RecipeView, Tag, User};
use foodgram::{PageRequest, RelationKind, Viewer};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

/// Listing filters. The user-scoped ones are only set for an authenticated
/// viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilters {
  pub author: Option<Uuid>,
  /// Tag slugs; a recipe matches when it carries any of them.
  pub tags: Vec<String>,
  pub favorited_by: Option<Uuid>,
  pub in_cart_of: Option<Uuid>,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &RecipeFilters) {
  qb.push(" WHERE TRUE");
  if let Some(author) = filters.author {
    qb.push(" AND r.author_id = ").push_bind(author);
  }
  if !filters.tags.is_empty() {
    qb.push(
      " AND EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
       WHERE rt.recipe_id = r.id AND t.slug = ANY(",
    )
    .push_bind(filters.tags.clone())
    .push("))");
  }
  if let Some(user_id) = filters.favorited_by {
    qb.push(" AND EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
      .push_bind(user_id)
      .push(")");
  }
  if let Some(user_id) = filters.in_cart_of {
    qb.push(" AND EXISTS (SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = ")
      .push_bind(user_id)
      .push(")");
  }
}

#[instrument(name = "db::count_recipes", skip(pool))]
pub async fn count_recipes(pool: &PgPool, filters: &RecipeFilters) -> Result<i64> {
  let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM recipes r");
  push_filters(&mut qb, filters);
  let count = qb.build_query_scalar::<i64>().fetch_one(pool).await?;
  Ok(count)
}

/// One page of recipes, newest first.
#[instrument(name = "db::list_recipes", skip(pool))]
pub async fn list_recipes(pool: &PgPool, filters: &RecipeFilters, page: PageRequest) -> Result<Vec<RecipeRow>> {
  let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {RECIPE_COLUMNS} FROM recipes r"));
  push_filters(&mut qb, filters);
  qb.push(" ORDER BY r.published_at DESC, r.id LIMIT ")
    .push_bind(page.limit_i64())
    .push(" OFFSET ")
    .push_bind(page.offset());
  let rows = qb.build_query_as::<RecipeRow>().fetch_all(pool).await?;
  debug!(row_count = rows.len(), "Recipes page fetched.");
  Ok(rows)
}

pub async fn fetch_recipe(pool: &PgPool, recipe_id: Uuid) -> Result<RecipeRow> {
  let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1");
  let row: Option<RecipeRow> = sqlx::query_as(&sql)
    .bind(recipe_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
      error!("Database error while fetching recipe {}: {}", recipe_id, e);
      AppError::Sqlx(e)
    })?;
  row.ok_or_else(|| {
    warn!("Recipe with ID {} not found.", recipe_id);
    AppError::NotFound(format!("Recipe with ID {} not found.", recipe_id))
  })
}

/// The recipe, provided `user_id` is its author.
pub async fn fetch_owned_recipe(pool: &PgPool, recipe_id: Uuid, user_id: Uuid) -> Result<RecipeRow> {
  let recipe = fetch_recipe(pool, recipe_id).await?;
  if recipe.author_id != user_id {
    warn!(%recipe_id, %user_id, author_id = %recipe.author_id, "Non-author tried to change a recipe.");
    return Err(AppError::Forbidden("Only the author can change this recipe.".to_string()));
  }
  Ok(recipe)
}

/// Which of `recipe_ids` are in the viewer's favorites or cart.
async fn marked_among(pool: &PgPool, kind: RelationKind, viewer: Viewer, recipe_ids: &[Uuid]) -> Result<HashSet<Uuid>> {
  let Some(user_id) = viewer.user_id() else {
    return Ok(HashSet::new());
  };
  let desc = kind.descriptor();
  let sql = format!(
    "SELECT {target} FROM {table} WHERE {actor} = $1 AND {target} = ANY($2)",
    target = desc.target_column,
    table = desc.table,
    actor = desc.actor_column,
  );
  let ids: Vec<Uuid> = sqlx::query_scalar(&sql)
    .bind(user_id)
    .bind(recipe_ids)
    .fetch_all(pool)
    .await?;
  Ok(ids.into_iter().collect())
}

#[derive(FromRow)]
struct TagLink {
  recipe_id: Uuid,
  #[sqlx(flatten)]
  tag: Tag,
}

#[derive(FromRow)]
struct IngredientLink {
  recipe_id: Uuid,
  #[sqlx(flatten)]
  line: RecipeIngredientView,
}

/// Builds full views for `rows`, keeping their order.
#[instrument(name = "db::recipe_views", skip_all, fields(recipe_count = rows.len()))]
pub async fn recipe_views(pool: &PgPool, viewer: Viewer, rows: Vec<RecipeRow>) -> Result<Vec<RecipeView>> {
  if rows.is_empty() {
    return Ok(Vec::new());
  }
  let recipe_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
  let author_ids: Vec<Uuid> = rows.iter().map(|r| r.author_id).collect::<HashSet<_>>().into_iter().collect();

  let user_sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");
  let authors: Vec<User> = sqlx::query_as(&user_sql).bind(&author_ids).fetch_all(pool).await?;
  let authors: HashMap<Uuid, _> = users::user_views(pool, viewer, authors)
    .await?
    .into_iter()
    .map(|v| (v.id, v))
    .collect();

  let tag_links: Vec<TagLink> = sqlx::query_as(
    "SELECT rt.recipe_id, t.id, t.name, t.color, t.slug FROM recipe_tags rt \
     JOIN tags t ON t.id = rt.tag_id WHERE rt.recipe_id = ANY($1) ORDER BY t.name",
  )
  .bind(&recipe_ids)
  .fetch_all(pool)
  .await?;
  let mut tags: HashMap<Uuid, Vec<Tag>> = HashMap::new();
  for link in tag_links {
    tags.entry(link.recipe_id).or_default().push(link.tag);
  }

  let ingredient_links: Vec<IngredientLink> = sqlx::query_as(
    "SELECT ri.recipe_id, i.id, i.name, i.measurement_unit, ri.amount FROM recipe_ingredients ri \
     JOIN ingredients i ON i.id = ri.ingredient_id WHERE ri.recipe_id = ANY($1) ORDER BY ri.position",
  )
  .bind(&recipe_ids)
  .fetch_all(pool)
  .await?;
  let mut ingredients: HashMap<Uuid, Vec<RecipeIngredientView>> = HashMap::new();
  for link in ingredient_links {
    ingredients.entry(link.recipe_id).or_default().push(link.line);
  }

  let favorited = marked_among(pool, RelationKind::Favorite, viewer, &recipe_ids).await?;
  let in_cart = marked_among(pool, RelationKind::ShoppingCart, viewer, &recipe_ids).await?;

  rows
    .into_iter()
    .map(|row| {
      let author = authors
        .get(&row.author_id)
        .cloned()
        .ok_or_else(|| AppError::Internal(format!("Author {} of recipe {} is missing.", row.author_id, row.id)))?;
      Ok(RecipeView {
        id: row.id,
        tags: tags.remove(&row.id).unwrap_or_default(),
        author,
        ingredients: ingredients.remove(&row.id).unwrap_or_default(),
        is_favorited: viewer.flag(|_| favorited.contains(&row.id)),
        is_in_shopping_cart: viewer.flag(|_| in_cart.contains(&row.id)),
        name: row.name,
        image: row.image,
        text: row.text,
        cooking_time: row.cooking_time,
        published_at: row.published_at,
      })
    })
    .collect()
}

pub async fn recipe_view(pool: &PgPool, viewer: Viewer, recipe_id: Uuid) -> Result<RecipeView> {
  let row = fetch_recipe(pool, recipe_id).await?;
  recipe_views(pool, viewer, vec![row])
    .await?
    .pop()
    .ok_or_else(|| AppError::Internal("Recipe view could not be built.".to_string()))
}

#[derive(FromRow)]
struct AuthorRecipe {
  author_id: Uuid,
  #[sqlx(flatten)]
  recipe: RecipeShort,
}

/// Followed authors with their newest recipes (at most `recipes_limit` each)
/// and total recipe counts.
#[instrument(name = "db::authors_with_recipes", skip_all, fields(author_count = authors.len()))]
pub async fn authors_with_recipes(
  pool: &PgPool,
  viewer: Viewer,
  authors: Vec<User>,
  recipes_limit: Option<u32>,
) -> Result<Vec<AuthorWithRecipes>> {
  let author_ids: Vec<Uuid> = authors.iter().map(|a| a.id).collect();

  let recipe_rows: Vec<AuthorRecipe> = sqlx::query_as(
    "SELECT author_id, id, name, image, cooking_time FROM ( \
       SELECT author_id, id, name, image, cooking_time, \
              ROW_NUMBER() OVER (PARTITION BY author_id ORDER BY published_at DESC, id) AS rn \
       FROM recipes WHERE author_id = ANY($1)) ranked \
     WHERE $2::BIGINT IS NULL OR rn <= $2 ORDER BY author_id, rn",
  )
  .bind(&author_ids)
  .bind(recipes_limit.map(i64::from))
  .fetch_all(pool)
  .await?;
  let mut recipes: HashMap<Uuid, Vec<RecipeShort>> = HashMap::new();
  for row in recipe_rows {
    recipes.entry(row.author_id).or_default().push(row.recipe);
  }

  let counts: Vec<(Uuid, i64)> =
    sqlx::query_as("SELECT author_id, COUNT(*) FROM recipes WHERE author_id = ANY($1) GROUP BY author_id")
      .bind(&author_ids)
      .fetch_all(pool)
      .await?;
  let counts: HashMap<Uuid, i64> = counts.into_iter().collect();

  let views = users::user_views(pool, viewer, authors).await?;
  Ok(
    views
      .into_iter()
      .map(|author| AuthorWithRecipes {
        recipes: recipes.remove(&author.id).unwrap_or_default(),
        recipes_count: counts.get(&author.id).copied().unwrap_or(0),
        author,
      })
      .collect(),
  )
}
