// foodgram_server/src/pipelines/contexts.rs

//! Data structs the pipelines run over. Handlers receive them wrapped in
//! `foodgram::ContextData`.

use crate::models::User;
use crate::state::AppState;
use foodgram::{AggregatedLine, Membership, RecipeDraft, RelationKind, ToggleAction, ValidRecipe};
use uuid::Uuid;

#[derive(Clone)]
pub struct SignupCtxData {
  pub app_state: AppState,
  pub email: String,
  pub username: String,
  pub first_name: String,
  pub last_name: String,
  pub password: String,
  pub created_user: Option<User>,
}

#[derive(Clone)]
pub struct SetPasswordCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub current_password: String,
  pub new_password: String,
  pub stored_hash: Option<String>,
}

/// One follow / favorite / shopping-cart toggle.
#[derive(Clone)]
pub struct RelationCtxData {
  pub app_state: AppState,
  pub kind: RelationKind,
  pub action: ToggleAction,
  pub actor: Uuid,
  pub target: Uuid,
  /// State after a successful transition.
  pub membership: Option<Membership>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeWriteMode {
  Create,
  Update(Uuid),
}

#[derive(Clone)]
pub struct RecipeWriteCtxData {
  pub app_state: AppState,
  pub actor: Uuid,
  pub mode: RecipeWriteMode,
  /// Taken by the validation step.
  pub draft: Option<RecipeDraft>,
  pub valid: Option<ValidRecipe>,
  /// Set once the recipe is written.
  pub recipe_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct ShoppingListCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub lines: Vec<AggregatedLine>,
  pub document: Option<Vec<u8>>,
}
