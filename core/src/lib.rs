// core/src/lib.rs

//! storefront_flow: async step pipelines.
//!
//! A `Pipeline<TData, Err>` is an ordered list of named steps over shared
//! `ContextData<TData>`. Each step runs its `before`, `on` and `after`
//! handlers in order; any handler may stop the run early or fail it.
//! Steps may be optional, carry a `skip_if` condition, or dispatch to one of
//! several scoped sub-pipelines chosen by a condition on the root data.
//! A `Registry` keys pipelines by their context type so callers only need
//! the data to run the right flow.

pub mod conditional;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::conditional::{ConditionalScopeBuilder, ConditionalScopeConfigurator};
pub use crate::core::{ContextData, Handler, PipelineControl, PipelineResult, SkipCondition, StepDef};
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::Pipeline;
pub use crate::registry::Registry;
