// storefront/src/services/mod.rs

pub mod http_api;
pub mod list_cache;
pub mod list_service;
pub mod notifier;

pub use http_api::HttpConsumerApi;
pub use list_cache::ListCache;
pub use list_service::{AccountService, ListService};
pub use notifier::{Notifier, Toast, ToastLevel, ToastQueue, TracingNotifier};
