// core/src/conditional/scope.rs

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::error::{FlowError, FlowResult};
use crate::pipeline::Pipeline;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{event, instrument, Level};

pub(crate) type Extractor<TData, SData> =
  Arc<dyn Fn(ContextData<TData>) -> FlowResult<ContextData<SData>> + Send + Sync + 'static>;

pub(crate) type Condition<TData> = Arc<dyn Fn(ContextData<TData>) -> bool + Send + Sync + 'static>;

pub(crate) struct ConditionalScope<TData, SData, Err>
where
  TData: 'static + Send + Sync,
  SData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) pipeline: Arc<Pipeline<SData, Err>>,
  pub(crate) extractor: Extractor<TData, SData>,
  pub(crate) condition: Condition<TData>,
}

/// Type-erased scope so scopes over different `SData` share one step.
#[async_trait]
pub(crate) trait AnyConditionalScope<TData, Err>: Send + Sync
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn is_condition_met(&self, main_ctx_data: ContextData<TData>) -> bool;

  async fn execute_scoped_pipeline(&self, step_name: &str, main_ctx_data: ContextData<TData>)
    -> Result<PipelineControl, Err>;
}

#[async_trait]
impl<TData, SData, Err> AnyConditionalScope<TData, Err> for ConditionalScope<TData, SData, Err>
where
  TData: 'static + Send + Sync,
  SData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn is_condition_met(&self, main_ctx_data: ContextData<TData>) -> bool {
    (self.condition)(main_ctx_data)
  }

  #[instrument(
    name = "ConditionalScope::execute",
    skip(self, main_ctx_data),
    fields(scoped_context_data_type = %std::any::type_name::<SData>()),
    err(Display)
  )]
  async fn execute_scoped_pipeline(
    &self,
    step_name: &str,
    main_ctx_data: ContextData<TData>,
  ) -> Result<PipelineControl, Err> {
    let sub_ctx_data = (self.extractor)(main_ctx_data).map_err(|e| {
      event!(Level::ERROR, error = %e, "Sub-context extractor failed.");
      let source = match e {
        FlowError::ExtractorFailure { source, .. } | FlowError::HandlerError { source } => source,
        other => anyhow::Error::new(other),
      };
      Err::from(FlowError::ExtractorFailure {
        step_name: step_name.to_string(),
        source,
      })
    })?;

    match self.pipeline.run(sub_ctx_data).await? {
      PipelineResult::Completed => Ok(PipelineControl::Continue),
      PipelineResult::Stopped => {
        event!(Level::INFO, "Scoped pipeline was stopped by one of its handlers.");
        Ok(PipelineControl::Stop)
      }
    }
  }
}
