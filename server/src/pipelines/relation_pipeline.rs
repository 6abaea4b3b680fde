// foodgram_server/src/pipelines/relation_pipeline.rs

//! Follow, favorite and shopping-cart toggles. One pipeline serves all three
//! kinds; the relation descriptor carries the differences.

use crate::errors::AppError;
use crate::pipelines::contexts::RelationCtxData;
use foodgram::domain::relation;
use foodgram::{ContextData, Pipeline, PipelineControl, PipelineRegistry, RelationKind, SkipCondition};
use std::sync::Arc;
use tracing::{info, instrument};

pub fn register_relation_pipeline(registry: &PipelineRegistry<AppError>) {
  let not_follow: SkipCondition<RelationCtxData> = Arc::new(|ctx: ContextData<RelationCtxData>| {
    let kind = ctx.read().kind;
    kind != RelationKind::Follow
  });

  let mut p = Pipeline::<RelationCtxData, AppError>::new(&[
    ("resolve_target", false, None),
    ("check_self_reference", false, Some(not_follow)),
    ("apply_transition", false, None),
  ]);
  p.on_root("resolve_target", resolve_target);
  p.on_root("check_self_reference", check_self_reference);
  p.on_root("apply_transition", apply_transition);

  registry.register_pipeline(p);
  tracing::info!("Relation toggle pipeline registered.");
}

#[instrument(name = "relation_step::resolve_target", skip(ctx_data), err(Display))]
async fn resolve_target(ctx_data: ContextData<RelationCtxData>) -> Result<PipelineControl, AppError> {
  let (store, kind, target) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.kind, guard.target)
  };
  relation::ensure_target_exists(store.as_ref(), kind, target).await?;
  Ok(PipelineControl::Continue)
}

#[instrument(name = "relation_step::check_self_reference", skip(ctx_data), err(Display))]
async fn check_self_reference(ctx_data: ContextData<RelationCtxData>) -> Result<PipelineControl, AppError> {
  let (kind, actor, target) = {
    let guard = ctx_data.read();
    (guard.kind, guard.actor, guard.target)
  };
  relation::check_self_reference(kind, actor, target)?;
  Ok(PipelineControl::Continue)
}

#[instrument(name = "relation_step::apply_transition", skip(ctx_data), err(Display))]
async fn apply_transition(ctx_data: ContextData<RelationCtxData>) -> Result<PipelineControl, AppError> {
  let (store, kind, action, actor, target) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.kind, guard.action, guard.actor, guard.target)
  };
  let membership = relation::apply_transition(store.as_ref(), kind, action, actor, target).await?;
  info!(%kind, ?action, ?membership, "Toggle applied.");
  ctx_data.write().membership = Some(membership);
  Ok(PipelineControl::Continue)
}
