// foodgram-core/src/domain/relation.rs

//! Toggle relations: follow, favorite and shopping-cart membership.
//!
//! All three share one two-state machine per `(actor, target)` pair. `Add`
//! is only valid from `Absent`, `Remove` only from `Present`; any other
//! attempt is a conflict and changes nothing. The store's uniqueness
//! constraint backs the pre-check, so a lost insert race reports the same
//! conflict as the sequential case.

use super::error::{DomainError, DomainResult};
use super::models::UserId;
use crate::store::{RelationStore, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
  Follow,
  Favorite,
  ShoppingCart,
}

/// Static description of one link table and its user-facing messages.
#[derive(Debug)]
pub struct RelationDescriptor {
  pub table: &'static str,
  pub actor_column: &'static str,
  pub target_column: &'static str,
  /// Table holding the targets, used for existence checks.
  pub target_table: &'static str,
  pub target_label: &'static str,
  pub already_present: &'static str,
  pub nothing_to_remove: &'static str,
  /// Set only for relations where actor == target is forbidden.
  pub self_reference: Option<&'static str>,
}

const FOLLOW: RelationDescriptor = RelationDescriptor {
  table: "follows",
  actor_column: "user_id",
  target_column: "author_id",
  target_table: "users",
  target_label: "User",
  already_present: "You are already subscribed to this user.",
  nothing_to_remove: "You are not subscribed to this user.",
  self_reference: Some("You cannot subscribe to yourself."),
};

const FAVORITE: RelationDescriptor = RelationDescriptor {
  table: "favorites",
  actor_column: "user_id",
  target_column: "recipe_id",
  target_table: "recipes",
  target_label: "Recipe",
  already_present: "Recipe is already in favorites.",
  nothing_to_remove: "Recipe is not in favorites.",
  self_reference: None,
};

const SHOPPING_CART: RelationDescriptor = RelationDescriptor {
  table: "shopping_cart",
  actor_column: "user_id",
  target_column: "recipe_id",
  target_table: "recipes",
  target_label: "Recipe",
  already_present: "Recipe is already in the shopping cart.",
  nothing_to_remove: "Recipe is not in the shopping cart.",
  self_reference: None,
};

impl RelationKind {
  pub const ALL: [RelationKind; 3] = [RelationKind::Follow, RelationKind::Favorite, RelationKind::ShoppingCart];

  pub const fn descriptor(self) -> &'static RelationDescriptor {
    match self {
      RelationKind::Follow => &FOLLOW,
      RelationKind::Favorite => &FAVORITE,
      RelationKind::ShoppingCart => &SHOPPING_CART,
    }
  }
}

impl fmt::Display for RelationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.descriptor().table)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
  Add,
  Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
  Absent,
  Present,
}

impl Membership {
  pub fn from_exists(exists: bool) -> Self {
    if exists {
      Membership::Present
    } else {
      Membership::Absent
    }
  }

  /// The state after `action`, or the conflict message of `kind` when the
  /// transition is not allowed from this state.
  pub fn transition(self, action: ToggleAction, kind: RelationKind) -> Result<Membership, DomainError> {
    let desc = kind.descriptor();
    match (self, action) {
      (Membership::Absent, ToggleAction::Add) => Ok(Membership::Present),
      (Membership::Present, ToggleAction::Remove) => Ok(Membership::Absent),
      (Membership::Present, ToggleAction::Add) => Err(DomainError::Conflict(desc.already_present.to_string())),
      (Membership::Absent, ToggleAction::Remove) => Err(DomainError::Conflict(desc.nothing_to_remove.to_string())),
    }
  }
}

/// Rejects actor == target for relations that forbid it (follow).
pub fn check_self_reference(kind: RelationKind, actor: UserId, target: Uuid) -> DomainResult<()> {
  match kind.descriptor().self_reference {
    Some(message) if actor == target => Err(DomainError::Conflict(message.to_string())),
    _ => Ok(()),
  }
}

/// `NotFound` unless the target of the relation exists.
pub async fn ensure_target_exists<S>(store: &S, kind: RelationKind, target: Uuid) -> DomainResult<()>
where
  S: RelationStore + ?Sized,
{
  if store.target_exists(kind, target).await? {
    Ok(())
  } else {
    let desc = kind.descriptor();
    Err(DomainError::NotFound(format!("{} with ID {} not found.", desc.target_label, target)))
  }
}

/// Checks the current membership and performs the write for `action`.
///
/// The write result is re-checked: a unique violation on insert and a zero
/// row delete are reported as the same conflicts the pre-check produces.
#[instrument(
  name = "relation::apply_transition",
  skip_all,
  fields(kind = %kind, action = ?action, actor = %actor, target = %target),
  err(Display)
)]
pub async fn apply_transition<S>(
  store: &S,
  kind: RelationKind,
  action: ToggleAction,
  actor: UserId,
  target: Uuid,
) -> DomainResult<Membership>
where
  S: RelationStore + ?Sized,
{
  let desc = kind.descriptor();
  let current = Membership::from_exists(store.exists(kind, actor, target).await?);
  let next = current.transition(action, kind).inspect_err(|e| {
    warn!(error = %e, "Toggle rejected by current membership.");
  })?;

  match action {
    ToggleAction::Add => match store.insert(kind, actor, target).await {
      Ok(()) => {}
      Err(StoreError::UniqueViolation) => {
        warn!("Concurrent insert won the race.");
        return Err(DomainError::Conflict(desc.already_present.to_string()));
      }
      Err(e) => return Err(e.into()),
    },
    ToggleAction::Remove => {
      if store.delete(kind, actor, target).await? == 0 {
        warn!("Row disappeared before delete.");
        return Err(DomainError::Conflict(desc.nothing_to_remove.to_string()));
      }
    }
  }

  info!("Relation toggled.");
  Ok(next)
}

/// The whole toggle: target existence, self reference, then transition.
pub async fn toggle<S>(
  store: &S,
  kind: RelationKind,
  action: ToggleAction,
  actor: UserId,
  target: Uuid,
) -> DomainResult<Membership>
where
  S: RelationStore + ?Sized,
{
  ensure_target_exists(store, kind, target).await?;
  check_self_reference(kind, actor, target)?;
  apply_transition(store, kind, action, actor, target).await
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn state_machine_has_no_self_loops() {
    for kind in RelationKind::ALL {
      assert_eq!(
        Membership::Absent.transition(ToggleAction::Add, kind).ok(),
        Some(Membership::Present)
      );
      assert_eq!(
        Membership::Present.transition(ToggleAction::Remove, kind).ok(),
        Some(Membership::Absent)
      );
      assert!(Membership::Present.transition(ToggleAction::Add, kind).is_err());
      assert!(Membership::Absent.transition(ToggleAction::Remove, kind).is_err());
    }
  }

  #[test]
  fn only_follow_rejects_self_reference() {
    let id = Uuid::new_v4();
    assert!(check_self_reference(RelationKind::Follow, id, id).is_err());
    assert!(check_self_reference(RelationKind::Favorite, id, id).is_ok());
    assert!(check_self_reference(RelationKind::Follow, id, Uuid::new_v4()).is_ok());
  }
}
