// core/src/conditional/mod.rs

//! Conditional execution of scoped sub-pipelines inside one step.
//!
//! Each scope pairs a condition on the root context with a static
//! `Pipeline<SData, Err>` and an extractor producing the `ContextData<SData>`
//! it runs against. The first scope whose condition holds is executed.

pub mod builder;
pub(crate) mod scope;

pub use builder::{ConditionalScopeBuilder, ConditionalScopeConfigurator};
