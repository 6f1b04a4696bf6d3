// storefront/src/config.rs

use crate::errors::{AppError, Result};
use crate::store::ResponseOrdering;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
  /// Root of the consumer API, e.g. `https://api.example.com/`.
  pub api_base_url: reqwest::Url,
  pub request_timeout: Duration,
  /// Seeds the client's cookie jar; a `Set-Cookie` from the server replaces it.
  pub session_cookie: Option<String>,
  /// Local mirror of the lists. Unset disables mirroring.
  pub list_cache_path: Option<PathBuf>,
  pub response_ordering: ResponseOrdering,
  pub log_json: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    let optional_env = |var_name: &str| get_env(var_name).ok().filter(|v| !v.trim().is_empty());

    let api_base_url = parse_base_url(&get_env("STOREFRONT_API_URL")?)?;

    let request_timeout_secs = optional_env("STOREFRONT_TIMEOUT_SECS")
      .unwrap_or_else(|| "15".to_string())
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid STOREFRONT_TIMEOUT_SECS: {}", e)))?;

    let discard_stale = optional_env("STOREFRONT_DISCARD_STALE")
      .unwrap_or_else(|| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid STOREFRONT_DISCARD_STALE value: {}", e)))?;

    let log_json = log_json_from_env()?;

    tracing::info!(api_base_url = %api_base_url, discard_stale, "Application configuration loaded successfully.");

    Ok(Self {
      api_base_url,
      request_timeout: Duration::from_secs(request_timeout_secs),
      session_cookie: optional_env("STOREFRONT_SESSION_COOKIE"),
      list_cache_path: optional_env("STOREFRONT_LIST_CACHE").map(PathBuf::from),
      response_ordering: if discard_stale {
        ResponseOrdering::DiscardStale
      } else {
        ResponseOrdering::LastResponseWins
      },
      log_json,
    })
  }

  /// A config pointing at `api_base_url` with every optional key at its default.
  pub fn for_base_url(api_base_url: &str) -> Result<Self> {
    Ok(Self {
      api_base_url: parse_base_url(api_base_url)?,
      request_timeout: Duration::from_secs(15),
      session_cookie: None,
      list_cache_path: None,
      response_ordering: ResponseOrdering::default(),
      log_json: false,
    })
  }
}

/// Reads `LOG_FORMAT` on its own so logging can start before the rest of the
/// configuration is validated.
pub fn log_json_from_env() -> Result<bool> {
  dotenv().ok();
  match env::var("LOG_FORMAT").ok().filter(|v| !v.trim().is_empty()).as_deref() {
    None | Some("pretty") => Ok(false),
    Some("json") => Ok(true),
    Some(other) => Err(AppError::Config(format!("Invalid LOG_FORMAT '{}': expected pretty or json", other))),
  }
}

/// Parses the API root and makes sure it ends in `/` so relative joins keep its path.
fn parse_base_url(raw: &str) -> Result<reqwest::Url> {
  let mut url =
    reqwest::Url::parse(raw.trim()).map_err(|e| AppError::Config(format!("Invalid STOREFRONT_API_URL '{}': {}", raw, e)))?;
  if url.cannot_be_a_base() {
    return Err(AppError::Config(format!("STOREFRONT_API_URL '{}' cannot be a base URL", raw)));
  }
  if !url.path().ends_with('/') {
    let path = format!("{}/", url.path());
    url.set_path(&path);
  }
  Ok(url)
}
