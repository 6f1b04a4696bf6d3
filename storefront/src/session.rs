// storefront/src/session.rs

//! `ConsumerSession`: the one mutation API over the consumer's lists.
//!
//! Every operation runs a registered pipeline, reports failures as toasts and
//! returns a `MutationOutcome`. Nothing here returns an error or panics.

use crate::errors::{AppError, Result};
use crate::models::{ListType, ProductId, VendorId};
use crate::pipelines::contexts::{AddToCartCtxData, AdjustQuantityCtxData, LineWriteCtxData, MoveToCartCtxData};
use crate::rules::{CartRuleViolation, LineOp};
use crate::state::AppState;
use crate::services::Toast;
use crate::store::ConsumerStore;
use storefront_flow::{ContextData, PipelineResult};
use tracing::{error, info, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
  /// The server accepted the change and the store holds its response.
  Applied,
  /// Nothing needed sending.
  Unchanged,
  /// Refused client-side before any request.
  Rejected(CartRuleViolation),
  /// The request failed; the store keeps its last known-good lists.
  Failed(String),
}

impl MutationOutcome {
  pub fn is_applied(&self) -> bool {
    matches!(self, MutationOutcome::Applied)
  }
}

#[derive(Clone)]
pub struct ConsumerSession {
  state: AppState,
}

impl ConsumerSession {
  pub fn new(state: AppState) -> Self {
    Self { state }
  }

  pub fn state(&self) -> &AppState {
    &self.state
  }

  pub fn store(&self) -> &ConsumerStore {
    &self.state.store
  }

  #[instrument(name = "ConsumerSession::add_to_cart", skip_all, fields(%product_id, %vendor_id, quantity))]
  pub async fn add_to_cart(&self, product_id: ProductId, vendor_id: VendorId, quantity: u32) -> MutationOutcome {
    let ctx = ContextData::new(AddToCartCtxData {
      app_state: self.state.clone(),
      product_id,
      vendor_id,
      quantity,
      line_write: None,
    });
    let result = self.run_pipeline(&ctx).await;
    self.settle(result, ListType::Cart, Some("Added to cart"))
  }

  pub async fn increment(&self, product_id: ProductId) -> MutationOutcome {
    self.adjust_cart_quantity(product_id, 1).await
  }

  /// Dropping to zero removes the line instead of sending a zero quantity.
  pub async fn decrement(&self, product_id: ProductId) -> MutationOutcome {
    self.adjust_cart_quantity(product_id, -1).await
  }

  #[instrument(name = "ConsumerSession::adjust_cart_quantity", skip_all, fields(%product_id, delta))]
  pub async fn adjust_cart_quantity(&self, product_id: ProductId, delta: i64) -> MutationOutcome {
    let ctx = ContextData::new(AdjustQuantityCtxData {
      app_state: self.state.clone(),
      product_id,
      delta,
      current_quantity: None,
      line_write: None,
    });
    let result = self.run_pipeline(&ctx).await;
    self.settle(result, ListType::Cart, None)
  }

  pub async fn remove_from_cart(&self, product_id: ProductId) -> MutationOutcome {
    self.write_line(ListType::Cart, product_id, LineOp::Remove, None).await
  }

  /// No vendor rule applies to the wishlist.
  pub async fn add_to_wishlist(&self, product_id: ProductId) -> MutationOutcome {
    self
      .write_line(ListType::Wishlist, product_id, LineOp::Upsert { quantity: 1 }, Some("Added to wishlist"))
      .await
  }

  pub async fn remove_from_wishlist(&self, product_id: ProductId) -> MutationOutcome {
    self.write_line(ListType::Wishlist, product_id, LineOp::Remove, None).await
  }

  pub async fn toggle_wishlist(&self, product_id: ProductId) -> MutationOutcome {
    if self.state.store.lists().in_wishlist(&product_id) {
      self.remove_from_wishlist(product_id).await
    } else {
      self.add_to_wishlist(product_id).await
    }
  }

  /// `update_list(cart, 1)` then `remove_from_list(wishlist)`, not atomic.
  #[instrument(name = "ConsumerSession::move_to_cart", skip_all, fields(%product_id, %vendor_id))]
  pub async fn move_to_cart(&self, product_id: ProductId, vendor_id: VendorId) -> MutationOutcome {
    let ctx = ContextData::new(MoveToCartCtxData {
      app_state: self.state.clone(),
      product_id,
      vendor_id,
      cart_write: None,
      wishlist_write: None,
    });
    let result = self.run_pipeline(&ctx).await;
    let failed_list = if ctx.read().cart_confirmed() {
      ListType::Wishlist
    } else {
      ListType::Cart
    };
    self.settle(result, failed_list, Some("Moved to cart"))
  }

  /// Removes every cart line one request at a time, stopping at the first failure.
  #[instrument(name = "ConsumerSession::clear_cart", skip_all)]
  pub async fn clear_cart(&self) -> MutationOutcome {
    let lines: Vec<ProductId> = self.state.store.lists().cart.into_iter().map(|item| item.product_id).collect();
    if lines.is_empty() {
      return MutationOutcome::Unchanged;
    }
    for product_id in lines {
      let outcome = self.remove_from_cart(product_id).await;
      if !outcome.is_applied() {
        return outcome;
      }
    }
    MutationOutcome::Applied
  }

  /// Forgets everything the store holds, including the local mirror.
  pub fn logout(&self) {
    self.state.store.clear();
    info!("Consumer session logged out.");
  }

  async fn write_line(
    &self,
    list_type: ListType,
    product_id: ProductId,
    op: LineOp,
    success: Option<&str>,
  ) -> MutationOutcome {
    let ctx = ContextData::new(LineWriteCtxData::new(self.state.clone(), list_type, product_id, op));
    let result = self.run_pipeline(&ctx).await;
    self.settle(result, list_type, success)
  }

  async fn run_pipeline<T>(&self, ctx: &ContextData<T>) -> Result<PipelineResult>
  where
    T: Send + Sync + 'static,
  {
    let _pending = self.state.store.begin_mutation();
    self.state.registry.run(ctx.clone()).await
  }

  fn settle(&self, result: Result<PipelineResult>, list_type: ListType, success: Option<&str>) -> MutationOutcome {
    let notifier = self.state.store.notifier();
    match result {
      Ok(PipelineResult::Completed) => {
        if let Some(message) = success {
          notifier.notify(Toast::success(message));
        }
        MutationOutcome::Applied
      }
      Ok(PipelineResult::Stopped) => MutationOutcome::Unchanged,
      Err(AppError::Validation(violation)) => {
        notifier.notify(Toast::error(violation.to_string()));
        MutationOutcome::Rejected(violation)
      }
      Err(e) => {
        error!(error = %e, %list_type, "List mutation failed.");
        notifier.notify(Toast::error(e.toast_for(list_type)));
        MutationOutcome::Failed(e.to_string())
      }
    }
  }
}
