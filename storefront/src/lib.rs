// storefront/src/lib.rs

//! Consumer cart and wishlist coordination against the storefront API.
//!
//! The server owns both lists. Every mutation goes through `ConsumerSession`,
//! is checked against the single-vendor cart rule in `rules`, is sent by a
//! `ListService`, and ends with the server's full `Lists` response replacing
//! the copy held by `ConsumerStore`.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod rules;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use session::{ConsumerSession, MutationOutcome};
pub use state::AppState;
pub use store::{ConsumerStore, ListsOrigin, LoadState, ResponseOrdering, StoreSnapshot};
