// storefront/src/pipelines/line_pipeline.rs

//! The upsert and remove sub-pipelines, and the routing that picks between
//! them from a pending `LineWriteCtxData`.

use crate::errors::AppError;
use crate::pipelines::contexts::LineWriteCtxData;
use crate::rules::LineOp;
use std::sync::Arc;
use storefront_flow::{ContextData, FlowError, FlowResult, Pipeline, PipelineControl, Registry};
use tracing::{debug, info};

/// Reads the pending line write out of a parent context.
pub(crate) type LineWriteAccessor<TData> = fn(&ContextData<TData>) -> Option<ContextData<LineWriteCtxData>>;

/// `update_list` then install the returned aggregate.
pub fn upsert_line_pipeline() -> Arc<Pipeline<LineWriteCtxData, AppError>> {
  let mut p = Pipeline::<LineWriteCtxData, AppError>::new(&[("send_upsert", false, None), ("replace_store_lists", false, None)]);

  p.on_root("send_upsert", |ctx_data: ContextData<LineWriteCtxData>| async move {
    let (api, store, list_type, product_id, op) = {
      let guard = ctx_data.read();
      (
        guard.app_state.lists_api.clone(),
        guard.app_state.store.clone(),
        guard.list_type,
        guard.product_id.clone(),
        guard.op,
      )
    };
    let LineOp::Upsert { quantity } = op else {
      return Err(AppError::Internal(format!("Upsert route received {:?}", op)));
    };

    let ticket = store.issue_ticket();
    ctx_data.write().ticket = Some(ticket);
    let lists = api.update_list(list_type, quantity, &product_id).await?;

    info!(%list_type, %product_id, quantity, "List line upserted.");
    let mut guard = ctx_data.write();
    guard.response = Some(lists);
    guard.confirmed = true;
    Ok(PipelineControl::Continue)
  });

  p.on_root("replace_store_lists", replace_store_lists);
  Arc::new(p)
}

/// `remove_from_list` then install the returned aggregate.
pub fn remove_line_pipeline() -> Arc<Pipeline<LineWriteCtxData, AppError>> {
  let mut p =
    Pipeline::<LineWriteCtxData, AppError>::new(&[("send_removal", false, None), ("replace_store_lists", false, None)]);

  p.on_root("send_removal", |ctx_data: ContextData<LineWriteCtxData>| async move {
    let (api, store, list_type, product_id) = {
      let guard = ctx_data.read();
      (
        guard.app_state.lists_api.clone(),
        guard.app_state.store.clone(),
        guard.list_type,
        guard.product_id.clone(),
      )
    };

    let ticket = store.issue_ticket();
    ctx_data.write().ticket = Some(ticket);
    let lists = api.remove_from_list(list_type, &product_id).await?;

    info!(%list_type, %product_id, "List line removed.");
    let mut guard = ctx_data.write();
    guard.response = Some(lists);
    guard.confirmed = true;
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on_root("replace_store_lists", replace_store_lists);
  Arc::new(p)
}

async fn replace_store_lists(ctx_data: ContextData<LineWriteCtxData>) -> Result<PipelineControl, AppError> {
  let (ticket, lists, store) = {
    let mut guard = ctx_data.write();
    let (Some(ticket), Some(lists)) = (guard.ticket, guard.response.take()) else {
      return Err(AppError::Internal("No list response to install".to_string()));
    };
    (ticket, lists, guard.app_state.store.clone())
  };
  let installed = store.install_lists(ticket, lists).await;
  ctx_data.write().installed = installed;
  debug!(installed, "Store lists replaced from response.");
  Ok(PipelineControl::Continue)
}

/// Wires `step_name` to run the upsert or remove sub-pipeline against the
/// line write `accessor` finds. With nothing pending the step passes through.
pub(crate) fn route_line_write<TData>(p: &mut Pipeline<TData, AppError>, step_name: &str, accessor: LineWriteAccessor<TData>)
where
  TData: Send + Sync + 'static,
{
  let pending_op = move |ctx: &ContextData<TData>| accessor(ctx).map(|w| w.read().op);
  let extractor = move |ctx: ContextData<TData>| -> FlowResult<ContextData<LineWriteCtxData>> {
    accessor(&ctx).ok_or_else(|| FlowError::from(anyhow::anyhow!("no line write pending")))
  };

  p.conditional_scopes_for_step(step_name)
    .add_static_scope(upsert_line_pipeline(), extractor)
    .on_condition(move |ctx| matches!(pending_op(&ctx), Some(LineOp::Upsert { .. })))
    .add_static_scope(remove_line_pipeline(), extractor)
    .on_condition(move |ctx| pending_op(&ctx) == Some(LineOp::Remove))
    .if_no_scope_matches(PipelineControl::Continue)
    .finalize_conditional_step(false);
}

/// A bare line write: remove from cart, and every wishlist change.
pub fn register_line_write_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<LineWriteCtxData, AppError>::new(&[("write_line", false, None)]);
  route_line_write(&mut p, "write_line", |ctx| Some(ctx.clone()));
  registry.register_pipeline(p);
  debug!("Line write pipeline registered.");
}
