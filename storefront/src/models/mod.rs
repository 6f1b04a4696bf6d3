// storefront/src/models/mod.rs

pub mod list;
pub mod order;
pub mod profile;

pub use list::{CartItem, ListType, Lists, ProductId, VendorId, WishlistItem};
pub use order::{Order, OrdersPayload};
pub use profile::{Profile, ProfilePayload};
