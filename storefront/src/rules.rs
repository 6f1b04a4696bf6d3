// storefront/src/rules.rs

//! The single-vendor cart rule and the quantity rules around it.
//!
//! Every call site that adds to or changes the cart decides through these
//! functions; none of them touch the network.

use crate::models::{CartItem, ProductId, VendorId};
use thiserror::Error;

/// A client-side rejection, raised before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartRuleViolation {
  #[error("Only one brand allowed per cart. Clear your cart to add items from {requested}.")]
  VendorConflict { locked: VendorId, requested: VendorId },

  #[error("Quantity must be a positive number.")]
  NonPositiveQuantity,

  #[error("Product {0} is not in your cart.")]
  NotInCart(ProductId),
}

/// The write to send for a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOp {
  Upsert { quantity: u32 },
  Remove,
}

/// True when the cart is empty or every line belongs to `vendor_id`.
pub fn can_add_to_cart(cart: &[CartItem], vendor_id: &VendorId) -> bool {
  cart.iter().all(|item| &item.vendor_id == vendor_id)
}

/// Target quantity for adding `delta` units of `product_id`.
///
/// A product already in the cart may always grow; a new product must match
/// the vendor the cart is locked to.
pub fn plan_add(
  cart: &[CartItem],
  product_id: &ProductId,
  vendor_id: &VendorId,
  delta: u32,
) -> Result<u32, CartRuleViolation> {
  if delta == 0 {
    return Err(CartRuleViolation::NonPositiveQuantity);
  }
  if let Some(line) = cart.iter().find(|item| &item.product_id == product_id) {
    return Ok(line.quantity.saturating_add(delta));
  }
  if !can_add_to_cart(cart, vendor_id) {
    // cart is non-empty here, so the first line names the lock
    let locked = cart.first().map(|item| item.vendor_id.clone()).unwrap_or_else(|| vendor_id.clone());
    return Err(CartRuleViolation::VendorConflict {
      locked,
      requested: vendor_id.clone(),
    });
  }
  Ok(delta)
}

/// Applies `delta` to `current`. Anything that would land at or below zero
/// becomes a removal; the server never sees a zero or negative quantity.
pub fn quantity_change(current: u32, delta: i64) -> LineOp {
  let target = i64::from(current).saturating_add(delta);
  if target <= 0 {
    LineOp::Remove
  } else {
    LineOp::Upsert {
      quantity: u32::try_from(target).unwrap_or(u32::MAX),
    }
  }
}
