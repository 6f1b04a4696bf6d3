// storefront/src/main.rs

//! `storefront_sync`: loads the consumer's lists, orders and profile once and
//! prints what the store ends up holding.

use anyhow::Context;
use serde_json::json;
use std::sync::Arc;
use storefront::config::log_json_from_env;
use storefront::services::{HttpConsumerApi, ToastLevel, ToastQueue};
use storefront::{AppConfig, AppState, ConsumerSession};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(json_output: bool) {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE)
    .with_writer(std::io::stderr);
  if json_output {
    builder.json().init();
  } else {
    builder.init();
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let log_json = log_json_from_env().context("reading LOG_FORMAT")?;
  init_tracing(log_json);
  let config = AppConfig::from_env()
    .inspect_err(|e| tracing::error!(error = %e, "Invalid configuration."))
    .context("loading configuration")?;
  tracing::info!(api = %config.api_base_url, "Starting storefront sync...");

  let api = Arc::new(HttpConsumerApi::new(&config).context("building consumer API client")?);
  let toasts = ToastQueue::new();
  let state = AppState::new(config, api.clone(), api, Arc::new(toasts.clone()));
  let session = ConsumerSession::new(state);

  if session.store().hydrate_from_cache() {
    tracing::info!("Showing mirrored lists until the server answers.");
  }

  let refreshed = session.store().refresh_all().await;

  for toast in toasts.drain() {
    match toast.level {
      ToastLevel::Success => tracing::info!(toast = %toast.message, "toast"),
      ToastLevel::Error => tracing::warn!(toast = %toast.message, "toast"),
    }
  }

  let snapshot = session.store().snapshot();
  let cart_subtotal = snapshot.lists.cart_subtotal();
  let summary = json!({
    "lists": snapshot.lists,
    "vendor_in_cart": snapshot.vendor_in_cart,
    "cart_subtotal": cart_subtotal,
    "orders": snapshot.orders.len(),
    "profile": snapshot.profile,
    "lists_origin": snapshot.lists_origin,
  });
  println!("{}", serde_json::to_string_pretty(&summary)?);

  refreshed.context("refreshing consumer data")?;
  Ok(())
}
