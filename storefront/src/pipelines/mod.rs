// storefront/src/pipelines/mod.rs

//! List mutations as registered pipelines, one per context type.

use crate::errors::AppError;
use storefront_flow::Registry;

pub mod cart_pipeline;
pub mod contexts;
pub mod line_pipeline;
pub mod move_pipeline;

/// Registers every list pipeline. Called once when `AppState` is built.
pub fn register_all_pipelines(registry: &Registry<AppError>) {
  line_pipeline::register_line_write_pipeline(registry);
  cart_pipeline::register_add_to_cart_pipeline(registry);
  cart_pipeline::register_adjust_quantity_pipeline(registry);
  move_pipeline::register_move_to_cart_pipeline(registry);
  tracing::debug!("List pipelines registered.");
}
