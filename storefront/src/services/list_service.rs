// storefront/src/services/list_service.rs

//! Seams over the consumer API. `HttpConsumerApi` is the real implementation;
//! tests substitute in-memory fakes.

use crate::errors::Result;
use crate::models::{ListType, Lists, Order, ProductId, Profile};
use async_trait::async_trait;

/// The three list operations. Each mutation answers with the whole aggregate,
/// which callers install in place of their copy.
#[async_trait]
pub trait ListService: Send + Sync {
  async fn get_lists(&self) -> Result<Lists>;

  /// Create-or-update. Wishlist callers pass a quantity of 1.
  async fn update_list(&self, list_type: ListType, quantity: u32, product_id: &ProductId) -> Result<Lists>;

  async fn remove_from_list(&self, list_type: ListType, product_id: &ProductId) -> Result<Lists>;
}

/// Read-only collaborator endpoints whose results the store keeps alongside the lists.
#[async_trait]
pub trait AccountService: Send + Sync {
  async fn get_orders(&self) -> Result<Vec<Order>>;

  async fn get_profile(&self) -> Result<Profile>;
}
