// foodgram_server/src/models/mod.rs

//! Database rows and the JSON views built from them.

pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod user;

pub use ingredient::{Ingredient, RecipeIngredientView};
pub use recipe::{AuthorWithRecipes, RecipeRow, RecipeShort, RecipeView};
pub use tag::Tag;
pub use user::{User, UserView};
