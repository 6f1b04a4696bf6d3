// storefront/src/pipelines/move_pipeline.rs

//! Wishlist → cart as two sequential writes. There is no rollback: if the
//! wishlist removal fails the product stays in both lists.

use crate::errors::AppError;
use crate::models::ListType;
use crate::pipelines::contexts::{LineWriteCtxData, MoveToCartCtxData};
use crate::pipelines::line_pipeline::route_line_write;
use crate::rules::{self, LineOp};
use storefront_flow::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{debug, info, warn};

pub fn register_move_to_cart_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<MoveToCartCtxData, AppError>::new(&[
    ("check_vendor_lock", false, None),
    ("write_cart_line", false, None),
    ("prepare_wishlist_removal", false, None),
    ("write_wishlist_removal", false, None),
  ]);

  p.on_root("check_vendor_lock", |ctx_data: ContextData<MoveToCartCtxData>| async move {
    let mut guard = ctx_data.write();
    let cart = guard.app_state.store.lists().cart;
    rules::plan_add(&cart, &guard.product_id, &guard.vendor_id, 1).map_err(|violation| {
      warn!(product_id = %guard.product_id, "Move to cart rejected: {}", violation);
      AppError::Validation(violation)
    })?;

    let write = LineWriteCtxData::new(
      guard.app_state.clone(),
      ListType::Cart,
      guard.product_id.clone(),
      LineOp::Upsert { quantity: 1 },
    );
    guard.cart_write = Some(ContextData::new(write));
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  route_line_write(&mut p, "write_cart_line", |ctx| ctx.read().cart_write.clone());

  p.on_root("prepare_wishlist_removal", |ctx_data: ContextData<MoveToCartCtxData>| async move {
    let mut guard = ctx_data.write();
    info!(product_id = %guard.product_id, "Cart half of move confirmed; removing from wishlist.");
    let write = LineWriteCtxData::new(guard.app_state.clone(), ListType::Wishlist, guard.product_id.clone(), LineOp::Remove);
    guard.wishlist_write = Some(ContextData::new(write));
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  route_line_write(&mut p, "write_wishlist_removal", |ctx| ctx.read().wishlist_write.clone());

  registry.register_pipeline(p);
  debug!("Move to cart pipeline registered.");
}
