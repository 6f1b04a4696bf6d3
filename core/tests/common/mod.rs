// tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use storefront_flow::{ContextData, FlowError, Handler, PipelineControl};
use tracing::Level;

#[derive(Clone, Debug, Default)]
pub struct OrderCtx {
  pub steps_executed: Vec<String>,
  pub total_cents: i64,
  pub stop_at: Option<String>,
  pub express: bool,
  pub shipping: ShippingCtx,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShippingCtx {
  pub carrier: String,
  pub quoted: bool,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("flow error: {0}")]
  Flow(String),

  #[error("handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(e: FlowError) -> Self {
    TestError::Flow(format!("{:?}", e))
  }
}

/// Records its step name and adds `cents` to the running total.
pub fn recording_handler(step_name: &'static str, cents: i64) -> Handler<OrderCtx, TestError> {
  Box::new(move |ctx: ContextData<OrderCtx>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.steps_executed.push(step_name.to_string());
      guard.total_cents += cents;
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn failing_handler(step_name: &'static str, message: &'static str) -> Handler<OrderCtx, TestError> {
  Box::new(move |ctx: ContextData<OrderCtx>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Handler(message.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub static SCOPE_RUNS: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  SCOPE_RUNS.store(0, Ordering::SeqCst);
}
