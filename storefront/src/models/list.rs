// storefront/src/models/list.rs

//! The consumer's `Lists` aggregate as the list endpoint returns it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorId(pub String);

impl ProductId {
  pub fn new(id: impl Into<String>) -> Self {
    ProductId(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl VendorId {
  pub fn new(id: impl Into<String>) -> Self {
    VendorId(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ProductId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl fmt::Display for VendorId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
  Cart,
  Wishlist,
}

impl ListType {
  pub fn as_str(self) -> &'static str {
    match self {
      ListType::Cart => "cart",
      ListType::Wishlist => "wishlist",
    }
  }
}

impl fmt::Display for ListType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One product line in the cart. A line never carries a quantity below 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
  pub product_id: ProductId,
  pub vendor_id: VendorId,
  pub quantity: u32,
  pub price: Decimal,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub product_images: Vec<String>,
  /// Anything else the server sends, kept verbatim.
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl CartItem {
  pub fn line_total(&self) -> Decimal {
    self.price * Decimal::from(self.quantity)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
  pub product_id: ProductId,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub vendor_id: Option<VendorId>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub product_images: Vec<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// `{ cart, wishlist }`, always replaced wholesale by the latest server response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lists {
  #[serde(default)]
  pub cart: Vec<CartItem>,
  #[serde(default)]
  pub wishlist: Vec<WishlistItem>,
}

impl Lists {
  pub fn cart_line(&self, product_id: &ProductId) -> Option<&CartItem> {
    self.cart.iter().find(|item| &item.product_id == product_id)
  }

  pub fn in_wishlist(&self, product_id: &ProductId) -> bool {
    self.wishlist.iter().any(|item| &item.product_id == product_id)
  }

  /// The vendor locking the cart: the first line's vendor, if any.
  pub fn vendor_in_cart(&self) -> Option<VendorId> {
    self.cart.first().map(|item| item.vendor_id.clone())
  }

  pub fn cart_subtotal(&self) -> Decimal {
    self.cart.iter().map(CartItem::line_total).sum()
  }
}
