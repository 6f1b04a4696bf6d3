// storefront/src/pipelines/contexts.rs

//! Data structs the list pipelines run over. Handlers see them wrapped in
//! `storefront_flow::ContextData`.

use crate::models::{ListType, Lists, ProductId, VendorId};
use crate::rules::LineOp;
use crate::state::AppState;
use crate::store::Ticket;
use storefront_flow::ContextData;

/// One write against one list: the unit every mutation is built from.
#[derive(Clone)]
pub struct LineWriteCtxData {
  pub app_state: AppState,
  pub list_type: ListType,
  pub product_id: ProductId,
  pub op: LineOp,
  pub(crate) ticket: Option<Ticket>,
  pub response: Option<Lists>,
  /// The server accepted the write.
  pub confirmed: bool,
  /// The response was installed in the store (false if dropped as stale).
  pub installed: bool,
}

impl LineWriteCtxData {
  pub fn new(app_state: AppState, list_type: ListType, product_id: ProductId, op: LineOp) -> Self {
    Self {
      app_state,
      list_type,
      product_id,
      op,
      ticket: None,
      response: None,
      confirmed: false,
      installed: false,
    }
  }
}

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub product_id: ProductId,
  pub vendor_id: VendorId,
  pub quantity: u32,
  pub line_write: Option<ContextData<LineWriteCtxData>>,
}

#[derive(Clone)]
pub struct AdjustQuantityCtxData {
  pub app_state: AppState,
  pub product_id: ProductId,
  pub delta: i64,
  pub current_quantity: Option<u32>,
  pub line_write: Option<ContextData<LineWriteCtxData>>,
}

#[derive(Clone)]
pub struct MoveToCartCtxData {
  pub app_state: AppState,
  pub product_id: ProductId,
  pub vendor_id: VendorId,
  pub cart_write: Option<ContextData<LineWriteCtxData>>,
  pub wishlist_write: Option<ContextData<LineWriteCtxData>>,
}

impl MoveToCartCtxData {
  /// True once the cart half of the move has been accepted by the server.
  pub fn cart_confirmed(&self) -> bool {
    self.cart_write.as_ref().map_or(false, |w| w.read().confirmed)
  }
}
