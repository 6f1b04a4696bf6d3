// storefront/src/state.rs

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::services::{AccountService, ListCache, ListService, Notifier};
use crate::store::ConsumerStore;
use std::sync::Arc;
use storefront_flow::Registry;

/// Everything a pipeline step needs, shared by handle.
#[derive(Clone)]
pub struct AppState {
  pub config: Arc<AppConfig>,
  pub lists_api: Arc<dyn ListService>,
  pub store: ConsumerStore,
  pub registry: Arc<Registry<AppError>>,
}

impl AppState {
  /// Builds the store and registers every list pipeline.
  pub fn new(
    config: AppConfig,
    lists_api: Arc<dyn ListService>,
    account_api: Arc<dyn AccountService>,
    notifier: Arc<dyn Notifier>,
  ) -> Self {
    let cache = config.list_cache_path.clone().map(ListCache::new);
    let store = ConsumerStore::new(lists_api.clone(), account_api, notifier, cache, config.response_ordering);
    let registry = Arc::new(Registry::<AppError>::new());
    pipelines::register_all_pipelines(&registry);

    Self {
      config: Arc::new(config),
      lists_api,
      store,
      registry,
    }
  }
}
