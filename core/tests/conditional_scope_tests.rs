// tests/conditional_scope_tests.rs

mod common;

use common::*;
use serial_test::serial;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use storefront_flow::{ContextData, FlowError, Pipeline, PipelineControl, PipelineResult};

fn quote_pipeline(carrier: &'static str) -> Arc<Pipeline<ShippingCtx, TestError>> {
  let mut p = Pipeline::new(&[("quote", false, None)]);
  p.on_root("quote", move |sctx: ContextData<ShippingCtx>| async move {
    SCOPE_RUNS.fetch_add(1, Ordering::SeqCst);
    let mut guard = sctx.write();
    guard.carrier = carrier.to_string();
    guard.quoted = true;
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  Arc::new(p)
}

/// Runs the sub-pipeline on a detached copy of the shipping data, then
/// writes it back from an `after` handler.
fn pipeline_with_shipping_scopes() -> Pipeline<OrderCtx, TestError> {
  let mut p: Pipeline<OrderCtx, TestError> = Pipeline::new(&[("ship", false, None)]);
  p.conditional_scopes_for_step("ship")
    .add_static_scope(quote_pipeline("courier"), |ctx: ContextData<OrderCtx>| {
      Ok(ContextData::new(ctx.read().shipping.clone()))
    })
    .on_condition(|ctx| ctx.read().express)
    .add_static_scope(quote_pipeline("post"), |ctx: ContextData<OrderCtx>| {
      Ok(ContextData::new(ctx.read().shipping.clone()))
    })
    .on_condition(|ctx| !ctx.read().express)
    .finalize_conditional_step(false);
  p
}

#[tokio::test]
#[serial]
async fn first_matching_scope_runs() {
  setup_tracing();
  reset_counters();
  let p = pipeline_with_shipping_scopes();

  let ctx = ContextData::new(OrderCtx {
    express: true,
    ..Default::default()
  });
  assert_eq!(p.run(ctx).await.unwrap(), PipelineResult::Completed);
  assert_eq!(SCOPE_RUNS.load(Ordering::SeqCst), 1);
}

#[tokio::test]
#[serial]
async fn scope_can_share_the_root_context() {
  setup_tracing();
  reset_counters();
  let mut inner: Pipeline<OrderCtx, TestError> = Pipeline::new(&[("charge", false, None)]);
  let charge = recording_handler("charge", 999);
  inner.on_root("charge", move |ctx| charge(ctx));

  let mut p: Pipeline<OrderCtx, TestError> = Pipeline::new(&[]);
  p.conditional_scopes_for_step("dispatch")
    .add_static_scope(Arc::new(inner), Ok)
    .on_condition(|_| true)
    .finalize_conditional_step(false);

  let ctx = ContextData::new(OrderCtx::default());
  p.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().steps_executed, vec!["charge"]);
  assert_eq!(ctx.read().total_cents, 999);
  assert_eq!(p.step_names(), vec!["dispatch"]);
}

#[tokio::test]
#[serial]
async fn no_match_uses_configured_behavior() {
  setup_tracing();
  reset_counters();
  let mut p: Pipeline<OrderCtx, TestError> = Pipeline::new(&[("ship", false, None), ("persist", false, None)]);
  p.conditional_scopes_for_step("ship")
    .add_static_scope(quote_pipeline("courier"), |ctx: ContextData<OrderCtx>| {
      Ok(ContextData::new(ctx.read().shipping.clone()))
    })
    .on_condition(|ctx| ctx.read().express)
    .if_no_scope_matches(PipelineControl::Stop)
    .finalize_conditional_step(false);
  let persist = recording_handler("persist", 0);
  p.on_root("persist", move |ctx| persist(ctx));

  let ctx = ContextData::new(OrderCtx::default());
  assert_eq!(p.run(ctx.clone()).await.unwrap(), PipelineResult::Stopped);
  assert_eq!(SCOPE_RUNS.load(Ordering::SeqCst), 0);
  assert!(ctx.read().steps_executed.is_empty());
}

#[tokio::test]
#[serial]
async fn extractor_failure_surfaces_as_flow_error() {
  setup_tracing();
  reset_counters();
  let mut p: Pipeline<OrderCtx, TestError> = Pipeline::new(&[("ship", false, None)]);
  p.conditional_scopes_for_step("ship")
    .add_static_scope(quote_pipeline("courier"), |_ctx: ContextData<OrderCtx>| {
      Err(FlowError::from(anyhow::anyhow!("no address on file")))
    })
    .on_condition(|_| true)
    .finalize_conditional_step(false);

  let err = p.run(ContextData::new(OrderCtx::default())).await.unwrap_err();
  match err {
    TestError::Flow(msg) => assert!(msg.contains("ExtractorFailure"), "unexpected: {msg}"),
    other => panic!("expected flow error, got {other:?}"),
  }
  assert_eq!(SCOPE_RUNS.load(Ordering::SeqCst), 0);
}

#[tokio::test]
#[serial]
async fn optional_conditional_step_swallows_scope_errors() {
  setup_tracing();
  reset_counters();
  let mut failing: Pipeline<OrderCtx, TestError> = Pipeline::new(&[("charge", false, None)]);
  let fail = failing_handler("charge", "card declined");
  failing.on_root("charge", move |ctx| fail(ctx));

  let mut p: Pipeline<OrderCtx, TestError> = Pipeline::new(&[("dispatch", false, None), ("persist", false, None)]);
  p.conditional_scopes_for_step("dispatch")
    .add_static_scope(Arc::new(failing), Ok)
    .on_condition(|_| true)
    .finalize_conditional_step(true);
  let persist = recording_handler("persist", 0);
  p.on_root("persist", move |ctx| persist(ctx));

  let ctx = ContextData::new(OrderCtx::default());
  assert_eq!(p.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().steps_executed, vec!["charge", "persist"]);
}

#[tokio::test]
#[serial]
async fn stopped_scope_stops_the_parent() {
  setup_tracing();
  reset_counters();
  let mut inner: Pipeline<OrderCtx, TestError> = Pipeline::new(&[("charge", false, None)]);
  let charge = recording_handler("charge", 0);
  inner.on_root("charge", move |ctx| charge(ctx));

  let mut p: Pipeline<OrderCtx, TestError> = Pipeline::new(&[("dispatch", false, None), ("persist", false, None)]);
  p.conditional_scopes_for_step("dispatch")
    .add_static_scope(Arc::new(inner), Ok)
    .on_condition(|_| true)
    .finalize_conditional_step(false);
  let persist = recording_handler("persist", 0);
  p.on_root("persist", move |ctx| persist(ctx));

  let ctx = ContextData::new(OrderCtx {
    stop_at: Some("charge".into()),
    ..Default::default()
  });
  assert_eq!(p.run(ctx.clone()).await.unwrap(), PipelineResult::Stopped);
  assert_eq!(ctx.read().steps_executed, vec!["charge"]);
}
