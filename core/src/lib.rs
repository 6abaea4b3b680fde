// foodgram-core/src/lib.rs

//! Domain core of the Foodgram recipe service.
//!
//!  - Shopping-list aggregation over the recipes in a user's cart.
//!  - The follow / favorite / shopping-cart toggle state machine.
//!  - Recipe submission validation and page-number pagination.
//!  - Storage traits for the persistence collaborator, with an in-memory store.
//!  - A small async step pipeline engine with a type-keyed registry, used by
//!    the HTTP service to run each operation as named steps.

pub mod domain;
pub mod error;
pub mod pipeline;
pub mod store;

pub use crate::error::PipelineError;
pub use crate::pipeline::{
  ContextData, Handler, Pipeline, PipelineControl, PipelineRegistry, PipelineResult, SkipCondition,
};

pub use crate::domain::error::{DomainError, DomainResult, FieldError, ValidationErrors};
pub use crate::domain::models::{
  AggregatedLine, CartEntry, FollowEdge, Ingredient, IngredientId, RecipeId, RecipeIngredientLine, TagId, UserId,
};
pub use crate::domain::pagination::{Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use crate::domain::recipe::{IngredientAmount, RecipeDraft, ValidRecipe};
pub use crate::domain::relation::{Membership, RelationKind, ToggleAction};
pub use crate::domain::shopping_list::{build_shopping_list, ShoppingListAggregator};
pub use crate::domain::viewer::Viewer;

pub use crate::store::{InMemoryStore, RelationStore, ShoppingListSource, StoreError, StoreResult};
