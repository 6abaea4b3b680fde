// tests/relation_toggle_tests.rs
mod common;

use common::*;
use foodgram::domain::relation::{apply_transition, toggle};
use async_trait::async_trait;
use foodgram::{
  DomainError, FollowEdge, InMemoryStore, Membership, RelationKind, RelationStore, StoreResult, ToggleAction, UserId,
};
use serial_test::serial;
use uuid::Uuid;

fn conflict_message(err: DomainError) -> String {
  match err {
    DomainError::Conflict(msg) => msg,
    other => panic!("Expected DomainError::Conflict, got {other:?}"),
  }
}

#[tokio::test]
#[serial]
async fn test_double_add_conflicts_and_keeps_one_row() {
  setup_tracing();
  let fx = baking_fixture();

  for kind in [RelationKind::Favorite, RelationKind::ShoppingCart] {
    let first = toggle(&fx.store, kind, ToggleAction::Add, fx.user, fx.recipe_a).await.unwrap();
    assert_eq!(first, Membership::Present);

    let err = toggle(&fx.store, kind, ToggleAction::Add, fx.user, fx.recipe_a)
      .await
      .unwrap_err();
    assert_eq!(conflict_message(err), kind.descriptor().already_present);
    assert_eq!(fx.store.relation_count(kind, fx.user, fx.recipe_a), 1);
  }
}

#[tokio::test]
#[serial]
async fn test_remove_when_absent_conflicts_without_side_effect() {
  setup_tracing();
  let fx = baking_fixture();
  fx.store
    .insert(RelationKind::Favorite, fx.user, fx.recipe_b)
    .await
    .unwrap();

  let err = toggle(&fx.store, RelationKind::Favorite, ToggleAction::Remove, fx.user, fx.recipe_a)
    .await
    .unwrap_err();
  assert_eq!(conflict_message(err), "Recipe is not in favorites.");
  assert_eq!(fx.store.relation_count(RelationKind::Favorite, fx.user, fx.recipe_b), 1);
}

#[tokio::test]
#[serial]
async fn test_add_then_remove_round_trip() {
  setup_tracing();
  let fx = baking_fixture();
  let kind = RelationKind::ShoppingCart;

  toggle(&fx.store, kind, ToggleAction::Add, fx.user, fx.recipe_a).await.unwrap();
  let state = toggle(&fx.store, kind, ToggleAction::Remove, fx.user, fx.recipe_a)
    .await
    .unwrap();
  assert_eq!(state, Membership::Absent);
  assert!(!fx.store.exists(kind, fx.user, fx.recipe_a).await.unwrap());
}

#[tokio::test]
#[serial]
async fn test_follow_rejects_self_reference_both_ways() {
  setup_tracing();
  let store = InMemoryStore::new();
  let user = store.add_user();

  for action in [ToggleAction::Add, ToggleAction::Remove] {
    let err = toggle(&store, RelationKind::Follow, action, user, user).await.unwrap_err();
    assert_eq!(conflict_message(err), "You cannot subscribe to yourself.");
  }
  assert_eq!(store.relation_count(RelationKind::Follow, user, user), 0);
}

#[tokio::test]
#[serial]
async fn test_follow_another_user() {
  setup_tracing();
  let store = InMemoryStore::new();
  let reader = store.add_user();
  let author = store.add_user();

  toggle(&store, RelationKind::Follow, ToggleAction::Add, reader, author)
    .await
    .unwrap();
  let err = toggle(&store, RelationKind::Follow, ToggleAction::Add, reader, author)
    .await
    .unwrap_err();
  assert_eq!(conflict_message(err), "You are already subscribed to this user.");

  // Following is directional.
  assert!(!store.exists(RelationKind::Follow, author, reader).await.unwrap());
  assert_eq!(
    store.follow_edges(reader),
    vec![FollowEdge {
      user_id: reader,
      author_id: author
    }]
  );
  assert!(store.follow_edges(author).is_empty());
}

#[tokio::test]
#[serial]
async fn test_missing_target_is_not_found() {
  setup_tracing();
  let store = InMemoryStore::new();
  let user = store.add_user();

  let err = toggle(&store, RelationKind::Favorite, ToggleAction::Add, user, Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(err, DomainError::NotFound(msg) if msg.starts_with("Recipe with ID")));

  let err = toggle(&store, RelationKind::Follow, ToggleAction::Add, user, Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(err, DomainError::NotFound(msg) if msg.starts_with("User with ID")));
}

/// Store whose membership reads always miss, as if another request
/// committed between the pre-check and the write.
struct StaleReads<'a>(&'a InMemoryStore);

#[async_trait]
impl RelationStore for StaleReads<'_> {
  async fn target_exists(&self, kind: RelationKind, target: Uuid) -> StoreResult<bool> {
    self.0.target_exists(kind, target).await
  }

  async fn exists(&self, _kind: RelationKind, _actor: UserId, _target: Uuid) -> StoreResult<bool> {
    Ok(false)
  }

  async fn insert(&self, kind: RelationKind, actor: UserId, target: Uuid) -> StoreResult<()> {
    self.0.insert(kind, actor, target).await
  }

  async fn delete(&self, kind: RelationKind, actor: UserId, target: Uuid) -> StoreResult<u64> {
    self.0.delete(kind, actor, target).await
  }
}

#[tokio::test]
#[serial]
async fn test_lost_insert_race_reports_conflict() {
  setup_tracing();
  let fx = baking_fixture();
  let kind = RelationKind::ShoppingCart;
  fx.store.insert(kind, fx.user, fx.recipe_a).await.unwrap();

  let err = apply_transition(&StaleReads(&fx.store), kind, ToggleAction::Add, fx.user, fx.recipe_a)
    .await
    .unwrap_err();
  assert_eq!(conflict_message(err), "Recipe is already in the shopping cart.");
  assert_eq!(fx.store.relation_count(kind, fx.user, fx.recipe_a), 1);
}
