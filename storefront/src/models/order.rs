// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A past order, held for display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
  #[serde(alias = "_id")]
  pub id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
  #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// The orders endpoint answers with either a bare array or `{ "orders": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OrdersPayload {
  Bare(Vec<Order>),
  Wrapped { orders: Vec<Order> },
}

impl OrdersPayload {
  pub fn into_orders(self) -> Vec<Order> {
    match self {
      OrdersPayload::Bare(orders) | OrdersPayload::Wrapped { orders } => orders,
    }
  }
}
