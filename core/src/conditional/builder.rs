// core/src/conditional/builder.rs

//! Fluent builder for conditional scopes:
//!
//! ```ignore
//! pipeline
//!   .conditional_scopes_for_step("write_line")
//!   .add_static_scope(upsert_pipeline, |ctx| Ok(ctx))
//!   .on_condition(|ctx| ctx.read().is_upsert())
//!   .add_static_scope(remove_pipeline, |ctx| Ok(ctx))
//!   .on_condition(|ctx| !ctx.read().is_upsert())
//!   .finalize_conditional_step(false);
//! ```

use crate::conditional::scope::{AnyConditionalScope, ConditionalScope, Extractor};
use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::core::step::StepDef;
use crate::error::{FlowError, FlowResult};
use crate::pipeline::Pipeline;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, instrument, Level};

pub struct ConditionalScopeBuilder<'pipeline, TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pipeline: &'pipeline mut Pipeline<TData, Err>,
  step_name: String,
  collected_scopes: Vec<Arc<dyn AnyConditionalScope<TData, Err>>>,
  on_no_match_behavior: PipelineControl,
}

impl<'pipeline, TData, Err> ConditionalScopeBuilder<'pipeline, TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) fn new(pipeline: &'pipeline mut Pipeline<TData, Err>, step_name: String) -> Self {
    if !pipeline.steps.iter().any(|s| s.name == step_name) {
      pipeline.steps.push(StepDef {
        name: step_name.clone(),
        optional: false,
        skip_if: None,
      });
    }
    Self {
      pipeline,
      step_name,
      collected_scopes: Vec::new(),
      on_no_match_behavior: PipelineControl::Continue,
    }
  }

  /// Adds a scope backed by a prebuilt pipeline. Finish it with `on_condition`.
  pub fn add_static_scope<SData>(
    self,
    static_pipeline: Arc<Pipeline<SData, Err>>,
    extractor_fn: impl Fn(ContextData<TData>) -> FlowResult<ContextData<SData>> + Send + Sync + 'static,
  ) -> ConditionalScopeConfigurator<'pipeline, TData, SData, Err>
  where
    SData: 'static + Send + Sync,
  {
    ConditionalScopeConfigurator {
      builder: self,
      pipeline: static_pipeline,
      extractor: Arc::new(extractor_fn),
      _phantom_sdata: PhantomData,
    }
  }

  /// What the step does when no condition holds. Defaults to `Continue`.
  pub fn if_no_scope_matches(mut self, behavior: PipelineControl) -> Self {
    self.on_no_match_behavior = behavior;
    self
  }

  /// Installs the dispatching `on` handler for the step.
  ///
  /// With `optional_for_main_step`, a failing scope is logged and the main
  /// pipeline continues; otherwise the scope's error ends the run.
  #[instrument(
    name = "ConditionalScopeBuilder::finalize_conditional_step",
    skip_all,
    fields(step_name = %self.step_name, num_scopes = self.collected_scopes.len())
  )]
  pub fn finalize_conditional_step(self, optional_for_main_step: bool) {
    let scopes = Arc::new(self.collected_scopes);
    let step_name = self.step_name.clone();
    let on_no_match = self.on_no_match_behavior;

    let master_handler: Handler<TData, Err> = Box::new(move |main_ctx_data: ContextData<TData>| {
      let scopes = scopes.clone();
      let step_name = step_name.clone();
      Box::pin(async move {
        let matched = scopes.iter().find(|scope| scope.is_condition_met(main_ctx_data.clone()));
        let Some(scope) = matched else {
          event!(Level::DEBUG, %step_name, "No conditional scope matched. Defaulting to {:?}.", on_no_match);
          return Ok(on_no_match);
        };

        event!(Level::DEBUG, %step_name, "Conditional scope matched. Executing.");
        match scope.execute_scoped_pipeline(&step_name, main_ctx_data).await {
          Ok(control) => Ok(control),
          Err(e) if optional_for_main_step => {
            event!(Level::WARN, %step_name, error = %e, "Optional conditional step failed; continuing.");
            Ok(PipelineControl::Continue)
          }
          Err(e) => Err(e),
        }
      })
    });

    if let Some(step_def) = self.pipeline.steps.iter_mut().find(|s| s.name == self.step_name) {
      step_def.optional = optional_for_main_step;
    }
    self.pipeline.on.insert(self.step_name.clone(), vec![master_handler]);
    event!(Level::DEBUG, step_name = %self.step_name, "Conditional scopes finalized.");
  }
}

pub struct ConditionalScopeConfigurator<'pipeline, TData, SData, Err>
where
  TData: 'static + Send + Sync,
  SData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  builder: ConditionalScopeBuilder<'pipeline, TData, Err>,
  pipeline: Arc<Pipeline<SData, Err>>,
  extractor: Extractor<TData, SData>,
  _phantom_sdata: PhantomData<SData>,
}

impl<'pipeline, TData, SData, Err> ConditionalScopeConfigurator<'pipeline, TData, SData, Err>
where
  TData: 'static + Send + Sync,
  SData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn on_condition(
    mut self,
    condition_fn: impl Fn(ContextData<TData>) -> bool + Send + Sync + 'static,
  ) -> ConditionalScopeBuilder<'pipeline, TData, Err> {
    let scope = ConditionalScope::<TData, SData, Err> {
      pipeline: self.pipeline,
      extractor: self.extractor,
      condition: Arc::new(condition_fn),
    };
    self.builder.collected_scopes.push(Arc::new(scope));
    self.builder
  }
}
