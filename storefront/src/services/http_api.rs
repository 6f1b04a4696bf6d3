// storefront/src/services/http_api.rs

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::models::{ListType, Lists, Order, OrdersPayload, ProductId, Profile, ProfilePayload};
use crate::services::list_service::{AccountService, ListService};
use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::HeaderValue;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

const LIST_PATH: &str = "consumer/list/";
const ORDERS_PATH: &str = "consumer/order/get-orders";
const PROFILE_PATH: &str = "consumer/profile/";
const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Serialize)]
struct UpsertBody {
  #[serde(rename = "type")]
  list_type: ListType,
  quantity: u32,
}

/// JSON client for the consumer API, authenticated by session cookie.
#[derive(Debug, Clone)]
pub struct HttpConsumerApi {
  client: reqwest::Client,
  base_url: Url,
}

impl HttpConsumerApi {
  pub fn new(config: &AppConfig) -> Result<Self> {
    let jar = Jar::default();
    if let Some(cookie) = &config.session_cookie {
      seed_session_cookie(&jar, cookie, &config.api_base_url)?;
    }

    let client = reqwest::Client::builder()
      .timeout(config.request_timeout)
      .cookie_provider(Arc::new(jar))
      .build()
      .map_err(|e| AppError::Config(format!("Could not build HTTP client: {}", e)))?;

    Ok(Self {
      client,
      base_url: config.api_base_url.clone(),
    })
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    self
      .base_url
      .join(path)
      .map_err(|e| AppError::Internal(format!("Bad endpoint path '{}': {}", path, e)))
  }

  fn list_item_url(&self, product_id: &ProductId) -> Result<Url> {
    let mut url = self.endpoint(LIST_PATH)?;
    url
      .path_segments_mut()
      .map_err(|_| AppError::Internal("API base URL cannot carry path segments".to_string()))?
      .pop_if_empty()
      .push(product_id.as_str());
    Ok(url)
  }

  /// Sends one request and decodes a JSON body, mapping failures onto `AppError`.
  async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
    let request_id = Uuid::new_v4().to_string();
    let response = request.header(REQUEST_ID_HEADER, request_id.as_str()).send().await?;
    let status = response.status();
    debug!(%request_id, status = status.as_u16(), url = %response.url(), "Consumer API responded.");

    match status {
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
        warn!(%request_id, status = status.as_u16(), "Session rejected by consumer API.");
        Err(AppError::Auth(format!("Session rejected ({})", status)))
      }
      s if s.is_success() => {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| AppError::Server {
          status: s.as_u16(),
          message: format!("Unexpected response payload: {}", e),
        })
      }
      s => {
        let body = response.text().await.unwrap_or_default();
        warn!(%request_id, status = s.as_u16(), "Consumer API returned an error status.");
        Err(AppError::Server {
          status: s.as_u16(),
          message: if body.is_empty() { s.to_string() } else { body },
        })
      }
    }
  }
}

/// Puts the configured `name=value; name2=value2` pairs into the jar, scoped to
/// the API root, so a `Set-Cookie` from the server can later replace them.
fn seed_session_cookie(jar: &Jar, cookie: &str, api_base_url: &Url) -> Result<()> {
  HeaderValue::from_str(cookie).map_err(|e| AppError::Config(format!("Invalid STOREFRONT_SESSION_COOKIE: {}", e)))?;
  let mut seeded = 0;
  for pair in cookie.split(';').map(str::trim).filter(|p| !p.is_empty()) {
    if !pair.contains('=') {
      return Err(AppError::Config(format!(
        "Invalid STOREFRONT_SESSION_COOKIE: '{}' is not a name=value pair",
        pair
      )));
    }
    jar.add_cookie_str(pair, api_base_url);
    seeded += 1;
  }
  debug!(seeded, "Session cookie seeded.");
  Ok(())
}

#[async_trait]
impl ListService for HttpConsumerApi {
  #[instrument(name = "ListService::get_lists", skip(self), err(Display))]
  async fn get_lists(&self) -> Result<Lists> {
    let url = self.endpoint(LIST_PATH)?;
    self.send(self.client.request(Method::GET, url)).await
  }

  #[instrument(name = "ListService::update_list", skip_all, fields(%list_type, %product_id, quantity), err(Display))]
  async fn update_list(&self, list_type: ListType, quantity: u32, product_id: &ProductId) -> Result<Lists> {
    let url = self.list_item_url(product_id)?;
    let body = UpsertBody { list_type, quantity };
    self.send(self.client.request(Method::PATCH, url).json(&body)).await
  }

  #[instrument(name = "ListService::remove_from_list", skip_all, fields(%list_type, %product_id), err(Display))]
  async fn remove_from_list(&self, list_type: ListType, product_id: &ProductId) -> Result<Lists> {
    let url = self.list_item_url(product_id)?;
    self
      .send(self.client.request(Method::DELETE, url).query(&[("type", list_type.as_str())]))
      .await
  }
}

#[async_trait]
impl AccountService for HttpConsumerApi {
  #[instrument(name = "AccountService::get_orders", skip(self), err(Display))]
  async fn get_orders(&self) -> Result<Vec<Order>> {
    let url = self.endpoint(ORDERS_PATH)?;
    let payload: OrdersPayload = self.send(self.client.request(Method::GET, url)).await?;
    Ok(payload.into_orders())
  }

  #[instrument(name = "AccountService::get_profile", skip(self), err(Display))]
  async fn get_profile(&self) -> Result<Profile> {
    let url = self.endpoint(PROFILE_PATH)?;
    let payload: ProfilePayload = self.send(self.client.request(Method::GET, url)).await?;
    Ok(payload.into_profile())
  }
}
