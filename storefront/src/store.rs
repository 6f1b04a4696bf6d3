// storefront/src/store.rs

//! The consumer data store: one shared holder of lists, orders and profile.
//!
//! Readers take snapshots. Writers are the store's own fetches and the
//! mutation pipelines, which install each List Service response wholesale.

use crate::errors::{AppError, Result};
use crate::models::{Lists, Order, Profile, VendorId};
use crate::services::{AccountService, ListCache, ListService, Notifier, Toast};
use futures_util::future::join3;
use serde::Serialize;
use std::sync::Arc;
use storefront_flow::ContextData;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
  #[default]
  Idle,
  Loading,
  Populated,
  Failed,
}

/// Where the current lists came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListsOrigin {
  #[default]
  Empty,
  /// Seeded from the local mirror; provisional until a server response lands.
  LocalCache,
  Server,
}

/// How responses racing each other are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseOrdering {
  /// Every response is installed as it arrives; the last one to land wins.
  #[default]
  LastResponseWins,
  /// A response issued before the last installed one is dropped.
  DiscardStale,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreSnapshot {
  pub lists: Lists,
  pub vendor_in_cart: Option<VendorId>,
  pub orders: Vec<Order>,
  pub profile: Option<Profile>,
  pub lists_state: LoadState,
  pub orders_state: LoadState,
  pub profile_state: LoadState,
  pub lists_origin: ListsOrigin,
  pub pending_mutations: usize,
}

impl StoreSnapshot {
  /// True while any fetch or mutation is outstanding.
  pub fn data_loading(&self) -> bool {
    self.pending_mutations > 0
      || [self.lists_state, self.orders_state, self.profile_state].contains(&LoadState::Loading)
  }
}

/// Issued before a list request goes out; presented when its response is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket {
  seq: u64,
  epoch: u64,
}

#[derive(Debug, Default)]
struct StoreInner {
  view: StoreSnapshot,
  next_seq: u64,
  last_applied_seq: u64,
  /// Bumped by `clear`; responses from an earlier epoch are dropped.
  epoch: u64,
}

#[derive(Clone)]
pub struct ConsumerStore {
  inner: ContextData<StoreInner>,
  lists_api: Arc<dyn ListService>,
  account_api: Arc<dyn AccountService>,
  notifier: Arc<dyn Notifier>,
  cache: Option<ListCache>,
  ordering: ResponseOrdering,
}

impl ConsumerStore {
  pub fn new(
    lists_api: Arc<dyn ListService>,
    account_api: Arc<dyn AccountService>,
    notifier: Arc<dyn Notifier>,
    cache: Option<ListCache>,
    ordering: ResponseOrdering,
  ) -> Self {
    Self {
      inner: ContextData::default(),
      lists_api,
      account_api,
      notifier,
      cache,
      ordering,
    }
  }

  pub fn snapshot(&self) -> StoreSnapshot {
    self.inner.read().view.clone()
  }

  pub fn lists(&self) -> Lists {
    self.inner.map_read(|i| &i.view.lists).clone()
  }

  pub fn vendor_in_cart(&self) -> Option<VendorId> {
    self.inner.read().view.vendor_in_cart.clone()
  }

  pub fn orders(&self) -> Vec<Order> {
    self.inner.read().view.orders.clone()
  }

  pub fn profile(&self) -> Option<Profile> {
    self.inner.read().view.profile.clone()
  }

  pub fn data_loading(&self) -> bool {
    self.inner.read().view.data_loading()
  }

  pub fn ordering(&self) -> ResponseOrdering {
    self.ordering
  }

  pub(crate) fn notifier(&self) -> &Arc<dyn Notifier> {
    &self.notifier
  }

  /// Replaces the lists with the server's copy. On failure the current lists
  /// stay as they are, a toast is raised and the error is returned.
  #[instrument(name = "ConsumerStore::fetch_lists", skip(self), err(Display))]
  pub async fn fetch_lists(&self) -> Result<()> {
    let ticket = self.issue_ticket();
    self.inner.write().view.lists_state = LoadState::Loading;

    match self.lists_api.get_lists().await {
      Ok(lists) => {
        self.install_lists(ticket, lists).await;
        self.settle(ticket.epoch, LoadState::Populated, |v| &mut v.lists_state);
        Ok(())
      }
      Err(e) => {
        self.settle(ticket.epoch, LoadState::Failed, |v| &mut v.lists_state);
        self.report_failure("cart", &e);
        Err(e)
      }
    }
  }

  #[instrument(name = "ConsumerStore::fetch_orders", skip(self), err(Display))]
  pub async fn fetch_orders(&self) -> Result<()> {
    let epoch = self.inner.read().epoch;
    self.inner.write().view.orders_state = LoadState::Loading;

    match self.account_api.get_orders().await {
      Ok(orders) => {
        let mut inner = self.inner.write();
        if inner.epoch == epoch {
          info!(count = orders.len(), "Orders loaded.");
          inner.view.orders = orders;
          inner.view.orders_state = LoadState::Populated;
        }
        Ok(())
      }
      Err(e) => {
        self.settle(epoch, LoadState::Failed, |v| &mut v.orders_state);
        self.report_failure("orders", &e);
        Err(e)
      }
    }
  }

  #[instrument(name = "ConsumerStore::fetch_profile", skip(self), err(Display))]
  pub async fn fetch_profile(&self) -> Result<()> {
    let epoch = self.inner.read().epoch;
    self.inner.write().view.profile_state = LoadState::Loading;

    match self.account_api.get_profile().await {
      Ok(profile) => {
        let mut inner = self.inner.write();
        if inner.epoch == epoch {
          inner.view.profile = Some(profile);
          inner.view.profile_state = LoadState::Populated;
        }
        Ok(())
      }
      Err(e) => {
        self.settle(epoch, LoadState::Failed, |v| &mut v.profile_state);
        self.report_failure("profile", &e);
        Err(e)
      }
    }
  }

  /// Fetches lists, orders and profile concurrently. Each failure is reported
  /// on its own; the first one (in that order) is returned.
  pub async fn refresh_all(&self) -> Result<()> {
    let (lists, orders, profile) = join3(self.fetch_lists(), self.fetch_orders(), self.fetch_profile()).await;
    lists.and(orders).and(profile)
  }

  /// Logout / cache clear: empties everything and drops the local mirror.
  /// Responses to requests issued before this point are ignored.
  pub fn clear(&self) {
    {
      let mut inner = self.inner.write();
      let pending_mutations = inner.view.pending_mutations;
      inner.view = StoreSnapshot {
        pending_mutations,
        ..StoreSnapshot::default()
      };
      inner.epoch += 1;
      inner.last_applied_seq = inner.next_seq;
    }
    if let Some(cache) = &self.cache {
      cache.clear();
    }
    info!("Consumer store cleared.");
  }

  /// Seeds the lists from the local mirror unless a server copy is already
  /// installed. Returns whether anything was loaded.
  pub fn hydrate_from_cache(&self) -> bool {
    let Some(cache) = &self.cache else {
      return false;
    };
    let lists = match cache.load() {
      Ok(Some(lists)) => lists,
      Ok(None) => return false,
      Err(e) => {
        warn!(error = %e, "Ignoring unreadable list mirror.");
        return false;
      }
    };

    let mut inner = self.inner.write();
    if inner.view.lists_origin == ListsOrigin::Server {
      return false;
    }
    inner.view.vendor_in_cart = lists.vendor_in_cart();
    inner.view.lists = lists;
    inner.view.lists_origin = ListsOrigin::LocalCache;
    debug!("Lists seeded from local mirror.");
    true
  }

  pub(crate) fn issue_ticket(&self) -> Ticket {
    let mut inner = self.inner.write();
    inner.next_seq += 1;
    Ticket {
      seq: inner.next_seq,
      epoch: inner.epoch,
    }
  }

  /// Installs `lists` wholesale and re-derives `vendor_in_cart`.
  /// Returns false when the response was dropped as stale.
  pub(crate) fn apply_lists(&self, ticket: Ticket, lists: Lists) -> bool {
    let mut inner = self.inner.write();
    if ticket.epoch != inner.epoch {
      debug!(seq = ticket.seq, "Dropping response issued before the store was cleared.");
      return false;
    }
    if self.ordering == ResponseOrdering::DiscardStale && ticket.seq < inner.last_applied_seq {
      debug!(seq = ticket.seq, last_applied = inner.last_applied_seq, "Dropping stale list response.");
      return false;
    }
    inner.last_applied_seq = inner.last_applied_seq.max(ticket.seq);
    inner.view.vendor_in_cart = lists.vendor_in_cart();
    inner.view.lists = lists;
    inner.view.lists_origin = ListsOrigin::Server;
    true
  }

  /// `apply_lists`, then mirrors what the store now holds to the local cache.
  pub(crate) async fn install_lists(&self, ticket: Ticket, lists: Lists) -> bool {
    if !self.apply_lists(ticket, lists) {
      return false;
    }
    if let Some(cache) = &self.cache {
      let lists = {
        let inner = self.inner.read();
        (inner.epoch == ticket.epoch).then(|| inner.view.lists.clone())
      };
      if let Some(lists) = lists {
        cache.store_quietly(lists).await;
      }
    }
    true
  }

  pub(crate) fn begin_mutation(&self) -> MutationGuard {
    self.inner.write().view.pending_mutations += 1;
    MutationGuard {
      inner: self.inner.clone(),
    }
  }

  /// Records how a fetch ended, unless the store was cleared meanwhile.
  fn settle(&self, epoch: u64, outcome: LoadState, slot: fn(&mut StoreSnapshot) -> &mut LoadState) {
    let mut inner = self.inner.write();
    if inner.epoch == epoch {
      *slot(&mut inner.view) = outcome;
    }
  }

  fn report_failure(&self, what: &str, err: &AppError) {
    error!(error = %err, "Could not load {}.", what);
    self.notifier.notify(Toast::error(format!("Could not load your {}", what)));
  }
}

/// Counts a mutation as in flight until dropped.
pub(crate) struct MutationGuard {
  inner: ContextData<StoreInner>,
}

impl Drop for MutationGuard {
  fn drop(&mut self) {
    let mut inner = self.inner.write();
    inner.view.pending_mutations = inner.view.pending_mutations.saturating_sub(1);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{CartItem, ListType, ProductId};
  use crate::services::TracingNotifier;
  use async_trait::async_trait;
  use rust_decimal::Decimal;

  struct Unreachable;

  #[async_trait]
  impl ListService for Unreachable {
    async fn get_lists(&self) -> Result<Lists> {
      Err(AppError::Network("offline".into()))
    }
    async fn update_list(&self, _: ListType, _: u32, _: &ProductId) -> Result<Lists> {
      Err(AppError::Network("offline".into()))
    }
    async fn remove_from_list(&self, _: ListType, _: &ProductId) -> Result<Lists> {
      Err(AppError::Network("offline".into()))
    }
  }

  #[async_trait]
  impl AccountService for Unreachable {
    async fn get_orders(&self) -> Result<Vec<Order>> {
      Err(AppError::Network("offline".into()))
    }
    async fn get_profile(&self) -> Result<Profile> {
      Err(AppError::Network("offline".into()))
    }
  }

  fn store(ordering: ResponseOrdering) -> ConsumerStore {
    let api = Arc::new(Unreachable);
    ConsumerStore::new(api.clone(), api, Arc::new(TracingNotifier), None, ordering)
  }

  fn cart_of(vendor: &str, quantity: u32) -> Lists {
    Lists {
      cart: vec![CartItem {
        product_id: ProductId::new("p1"),
        vendor_id: VendorId::new(vendor),
        quantity,
        price: Decimal::ONE,
        name: None,
        product_images: Vec::new(),
        extra: Default::default(),
      }],
      wishlist: Vec::new(),
    }
  }

  #[test]
  fn last_response_wins_installs_late_arrivals() {
    let store = store(ResponseOrdering::LastResponseWins);
    let first = store.issue_ticket();
    let second = store.issue_ticket();

    assert!(store.apply_lists(second, cart_of("a", 2)));
    assert!(store.apply_lists(first, cart_of("a", 1)));

    assert_eq!(store.lists().cart[0].quantity, 1);
  }

  #[test]
  fn discard_stale_keeps_the_newest_issued_response() {
    let store = store(ResponseOrdering::DiscardStale);
    let first = store.issue_ticket();
    let second = store.issue_ticket();

    assert!(store.apply_lists(second, cart_of("a", 2)));
    assert!(!store.apply_lists(first, cart_of("a", 1)));

    assert_eq!(store.lists().cart[0].quantity, 2);
  }

  #[test]
  fn responses_issued_before_clear_are_dropped() {
    let store = store(ResponseOrdering::LastResponseWins);
    let ticket = store.issue_ticket();
    store.clear();

    assert!(!store.apply_lists(ticket, cart_of("a", 1)));
    assert_eq!(store.snapshot(), StoreSnapshot::default());
  }

  #[test]
  fn vendor_in_cart_follows_every_replacement() {
    let store = store(ResponseOrdering::LastResponseWins);
    store.apply_lists(store.issue_ticket(), cart_of("a", 1));
    assert_eq!(store.vendor_in_cart(), Some(VendorId::new("a")));

    store.apply_lists(store.issue_ticket(), Lists::default());
    assert_eq!(store.vendor_in_cart(), None);
  }

  #[test]
  fn mutation_guard_drives_data_loading() {
    let store = store(ResponseOrdering::LastResponseWins);
    assert!(!store.data_loading());
    let guard = store.begin_mutation();
    assert!(store.data_loading());
    drop(guard);
    assert!(!store.data_loading());
  }

  #[tokio::test]
  async fn failed_fetch_leaves_lists_untouched() {
    let store = store(ResponseOrdering::LastResponseWins);
    store.apply_lists(store.issue_ticket(), cart_of("a", 3));

    assert!(store.fetch_lists().await.is_err());

    let snapshot = store.snapshot();
    assert_eq!(snapshot.lists, cart_of("a", 3));
    assert_eq!(snapshot.lists_state, LoadState::Failed);
  }
}
