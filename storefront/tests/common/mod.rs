// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storefront::models::{CartItem, ListType, Lists, Order, ProductId, Profile, VendorId, WishlistItem};
use storefront::services::{AccountService, ListService, ToastQueue};
use storefront::{AppConfig, AppError, AppState, ConsumerSession, ResponseOrdering, Result};
use tracing::Level;

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

pub fn pid(id: &str) -> ProductId {
  ProductId::new(id)
}

pub fn vid(id: &str) -> VendorId {
  VendorId::new(id)
}

/// p1, p3 belong to vendor A; p2, p4 to vendor B.
pub fn catalog() -> HashMap<ProductId, (VendorId, Decimal)> {
  HashMap::from([
    (pid("p1"), (vid("A"), Decimal::new(1000, 2))),
    (pid("p2"), (vid("B"), Decimal::new(550, 2))),
    (pid("p3"), (vid("A"), Decimal::new(725, 2))),
    (pid("p4"), (vid("B"), Decimal::new(199, 2))),
  ])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  Get,
  Update(ListType, u32, ProductId),
  Remove(ListType, ProductId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
  Get,
  Update(ListType),
  Remove(ListType),
}

#[derive(Debug, Clone, Copy)]
pub enum Failure {
  Network,
  Auth,
  Server,
}

impl Failure {
  fn into_error(self) -> AppError {
    match self {
      Failure::Network => AppError::Network("connection reset".into()),
      Failure::Auth => AppError::Auth("session expired".into()),
      Failure::Server => AppError::Server {
        status: 503,
        message: "unavailable".into(),
      },
    }
  }
}

/// In-memory consumer list endpoint. Behaves like the server: upserts set the
/// quantity, every call answers with the whole aggregate, and it does not
/// enforce the vendor rule itself.
pub struct FakeListService {
  catalog: HashMap<ProductId, (VendorId, Decimal)>,
  lists: Mutex<Lists>,
  calls: Mutex<Vec<Call>>,
  fail_once: Mutex<Option<(CallKind, Failure)>>,
  delay: Mutex<Option<Duration>>,
}

impl Default for FakeListService {
  fn default() -> Self {
    Self {
      catalog: catalog(),
      lists: Mutex::new(Lists::default()),
      calls: Mutex::new(Vec::new()),
      fail_once: Mutex::new(None),
      delay: Mutex::new(None),
    }
  }
}

impl FakeListService {
  pub fn cart_item(&self, product_id: &ProductId, quantity: u32) -> CartItem {
    let (vendor_id, price) = self.catalog[product_id].clone();
    CartItem {
      product_id: product_id.clone(),
      vendor_id,
      quantity,
      price,
      name: Some(format!("Product {}", product_id)),
      product_images: vec![format!("{}.png", product_id)],
      extra: Default::default(),
    }
  }

  pub fn wishlist_item(&self, product_id: &ProductId) -> WishlistItem {
    WishlistItem {
      product_id: product_id.clone(),
      vendor_id: self.catalog.get(product_id).map(|(v, _)| v.clone()),
      name: Some(format!("Product {}", product_id)),
      product_images: Vec::new(),
      extra: Default::default(),
    }
  }

  /// Sets server-side state directly, as if another device had changed it.
  pub fn seed(&self, cart: &[(&str, u32)], wishlist: &[&str]) {
    let lists = Lists {
      cart: cart.iter().map(|(p, q)| self.cart_item(&pid(p), *q)).collect(),
      wishlist: wishlist.iter().map(|p| self.wishlist_item(&pid(p))).collect(),
    };
    *self.lists.lock() = lists;
  }

  pub fn server_lists(&self) -> Lists {
    self.lists.lock().clone()
  }

  pub fn calls(&self) -> Vec<Call> {
    self.calls.lock().clone()
  }

  pub fn mutation_calls(&self) -> Vec<Call> {
    self.calls().into_iter().filter(|c| *c != Call::Get).collect()
  }

  pub fn reset_calls(&self) {
    self.calls.lock().clear();
  }

  pub fn fail_next(&self, kind: CallKind, failure: Failure) {
    *self.fail_once.lock() = Some((kind, failure));
  }

  pub fn set_delay(&self, delay: Duration) {
    *self.delay.lock() = Some(delay);
  }

  async fn enter(&self, call: Call, kind: CallKind) -> Result<()> {
    self.calls.lock().push(call);
    let delay = *self.delay.lock();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    let mut fail_once = self.fail_once.lock();
    match *fail_once {
      Some((k, failure)) if k == kind => {
        *fail_once = None;
        Err(failure.into_error())
      }
      _ => Ok(()),
    }
  }
}

#[async_trait]
impl ListService for FakeListService {
  async fn get_lists(&self) -> Result<Lists> {
    self.enter(Call::Get, CallKind::Get).await?;
    Ok(self.server_lists())
  }

  async fn update_list(&self, list_type: ListType, quantity: u32, product_id: &ProductId) -> Result<Lists> {
    self
      .enter(Call::Update(list_type, quantity, product_id.clone()), CallKind::Update(list_type))
      .await?;
    let mut lists = self.lists.lock();
    match list_type {
      ListType::Cart => match lists.cart.iter().position(|i| &i.product_id == product_id) {
        Some(idx) => lists.cart[idx].quantity = quantity,
        None => {
          let item = self.cart_item(product_id, quantity);
          lists.cart.push(item);
        }
      },
      ListType::Wishlist => {
        if !lists.in_wishlist(product_id) {
          let item = self.wishlist_item(product_id);
          lists.wishlist.push(item);
        }
      }
    }
    Ok(lists.clone())
  }

  async fn remove_from_list(&self, list_type: ListType, product_id: &ProductId) -> Result<Lists> {
    self
      .enter(Call::Remove(list_type, product_id.clone()), CallKind::Remove(list_type))
      .await?;
    let mut lists = self.lists.lock();
    match list_type {
      ListType::Cart => lists.cart.retain(|i| &i.product_id != product_id),
      ListType::Wishlist => lists.wishlist.retain(|i| &i.product_id != product_id),
    }
    Ok(lists.clone())
  }
}

#[derive(Default)]
pub struct FakeAccountService {
  pub orders: Vec<Order>,
  pub profile: Profile,
  pub fail_orders: bool,
}

#[async_trait]
impl AccountService for FakeAccountService {
  async fn get_orders(&self) -> Result<Vec<Order>> {
    if self.fail_orders {
      return Err(AppError::Network("orders unavailable".into()));
    }
    Ok(self.orders.clone())
  }

  async fn get_profile(&self) -> Result<Profile> {
    Ok(self.profile.clone())
  }
}

pub struct Harness {
  pub api: Arc<FakeListService>,
  pub toasts: ToastQueue,
  pub session: ConsumerSession,
}

pub struct HarnessBuilder {
  api: Arc<FakeListService>,
  account: FakeAccountService,
  cache_path: Option<PathBuf>,
  ordering: ResponseOrdering,
}

impl HarnessBuilder {
  pub fn new() -> Self {
    Self {
      api: Arc::new(FakeListService::default()),
      account: FakeAccountService::default(),
      cache_path: None,
      ordering: ResponseOrdering::LastResponseWins,
    }
  }

  pub fn api(mut self, api: Arc<FakeListService>) -> Self {
    self.api = api;
    self
  }

  pub fn account(mut self, account: FakeAccountService) -> Self {
    self.account = account;
    self
  }

  pub fn cache_path(mut self, path: PathBuf) -> Self {
    self.cache_path = Some(path);
    self
  }

  pub fn ordering(mut self, ordering: ResponseOrdering) -> Self {
    self.ordering = ordering;
    self
  }

  pub fn build(self) -> Harness {
    let mut config = AppConfig::for_base_url("http://consumer-api.test/").unwrap();
    config.list_cache_path = self.cache_path;
    config.response_ordering = self.ordering;
    let toasts = ToastQueue::new();
    let state = AppState::new(config, self.api.clone(), Arc::new(self.account), Arc::new(toasts.clone()));
    Harness {
      api: self.api,
      toasts,
      session: ConsumerSession::new(state),
    }
  }
}

/// Seeds the fake server and loads it into a fresh session's store.
pub async fn harness_with(cart: &[(&str, u32)], wishlist: &[&str]) -> Harness {
  setup_tracing();
  let harness = HarnessBuilder::new().build();
  harness.api.seed(cart, wishlist);
  harness.session.store().fetch_lists().await.unwrap();
  harness.api.reset_calls();
  harness
}

pub fn distinct_vendors(lists: &Lists) -> usize {
  let mut vendors: Vec<&VendorId> = lists.cart.iter().map(|i| &i.vendor_id).collect();
  vendors.sort();
  vendors.dedup();
  vendors.len()
}
