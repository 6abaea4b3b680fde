// foodgram-core/src/domain/mod.rs

pub mod error;
pub mod models;
pub mod pagination;
pub mod recipe;
pub mod relation;
pub mod shopping_list;
pub mod viewer;
