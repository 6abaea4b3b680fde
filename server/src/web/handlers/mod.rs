// foodgram_server/src/web/handlers/mod.rs

pub mod ingredient_handlers;
pub mod recipe_handlers;
pub mod relation_handlers;
pub mod shopping_cart_handlers;
pub mod tag_handlers;
pub mod user_handlers;
