// storefront/src/pipelines/cart_pipeline.rs

use crate::errors::AppError;
use crate::models::ListType;
use crate::pipelines::contexts::{AddToCartCtxData, AdjustQuantityCtxData, LineWriteCtxData};
use crate::pipelines::line_pipeline::route_line_write;
use crate::rules::{self, CartRuleViolation, LineOp};
use storefront_flow::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{debug, info, warn};

/// validate → vendor lock → upsert the line at its new total.
pub fn register_add_to_cart_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<AddToCartCtxData, AppError>::new(&[
    ("validate_cart_input", false, None),
    ("check_vendor_lock", false, None),
    ("write_cart_line", false, None),
  ]);

  p.on_root("validate_cart_input", |ctx_data: ContextData<AddToCartCtxData>| async move {
    let quantity = ctx_data.read().quantity;
    if quantity == 0 {
      warn!("Add to cart: quantity must be positive.");
      return Err(AppError::Validation(CartRuleViolation::NonPositiveQuantity));
    }
    Ok(PipelineControl::Continue)
  });

  p.on_root("check_vendor_lock", |ctx_data: ContextData<AddToCartCtxData>| async move {
    let mut guard = ctx_data.write();
    let cart = guard.app_state.store.lists().cart;
    let target = rules::plan_add(&cart, &guard.product_id, &guard.vendor_id, guard.quantity).map_err(|violation| {
      warn!(product_id = %guard.product_id, vendor_id = %guard.vendor_id, "Add to cart rejected: {}", violation);
      AppError::Validation(violation)
    })?;

    info!(product_id = %guard.product_id, target, "Add to cart: vendor lock satisfied.");
    let write = LineWriteCtxData::new(
      guard.app_state.clone(),
      ListType::Cart,
      guard.product_id.clone(),
      LineOp::Upsert { quantity: target },
    );
    guard.line_write = Some(ContextData::new(write));
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  route_line_write(&mut p, "write_cart_line", |ctx| ctx.read().line_write.clone());

  registry.register_pipeline(p);
  debug!("Add to cart pipeline registered.");
}

/// Resolve the line → apply the delta → upsert, or remove when it reaches zero.
pub fn register_adjust_quantity_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<AdjustQuantityCtxData, AppError>::new(&[
    ("resolve_cart_line", false, None),
    ("plan_quantity_change", false, None),
    ("write_cart_line", false, None),
  ]);

  p.on_root("resolve_cart_line", |ctx_data: ContextData<AdjustQuantityCtxData>| async move {
    let mut guard = ctx_data.write();
    let lists = guard.app_state.store.lists();
    match lists.cart_line(&guard.product_id) {
      Some(line) => {
        guard.current_quantity = Some(line.quantity);
        Ok(PipelineControl::Continue)
      }
      None => {
        warn!(product_id = %guard.product_id, "Quantity change for a product not in the cart.");
        Err(AppError::Validation(CartRuleViolation::NotInCart(guard.product_id.clone())))
      }
    }
  });

  p.on_root("plan_quantity_change", |ctx_data: ContextData<AdjustQuantityCtxData>| async move {
    let mut guard = ctx_data.write();
    let (Some(current), delta) = (guard.current_quantity, guard.delta) else {
      return Err(AppError::Internal("Cart line was not resolved".to_string()));
    };
    if delta == 0 {
      debug!(product_id = %guard.product_id, "Zero delta, nothing to send.");
      return Ok(PipelineControl::Stop);
    }

    let op = rules::quantity_change(current, delta);
    info!(product_id = %guard.product_id, current, delta, ?op, "Cart quantity change planned.");
    let write = LineWriteCtxData::new(guard.app_state.clone(), ListType::Cart, guard.product_id.clone(), op);
    guard.line_write = Some(ContextData::new(write));
    Ok(PipelineControl::Continue)
  });

  route_line_write(&mut p, "write_cart_line", |ctx| ctx.read().line_write.clone());

  registry.register_pipeline(p);
  debug!("Adjust quantity pipeline registered.");
}
