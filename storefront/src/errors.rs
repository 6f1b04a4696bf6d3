// storefront/src/errors.rs

use crate::models::ListType;
use crate::rules::CartRuleViolation;
use storefront_flow::FlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  /// Request failed before a usable response arrived (connect, timeout, body).
  #[error("Network Error: {0}")]
  Network(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Validation Error: {0}")]
  Validation(#[from] CartRuleViolation),

  /// Non-success status or a payload that does not match the expected shape.
  #[error("Server Error ({status}): {message}")]
  Server { status: u16, message: String },

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("List Cache Error: {0}")]
  Cache(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Error: {0}")]
  Internal(String),
}

impl AppError {
  pub fn is_validation(&self) -> bool {
    matches!(self, AppError::Validation(_))
  }

  /// The message a consumer sees when a mutation of `list_type` fails.
  pub fn toast_for(&self, list_type: ListType) -> String {
    match self {
      AppError::Validation(violation) => violation.to_string(),
      _ => format!("Could not update {}", list_type),
    }
  }
}

impl From<reqwest::Error> for AppError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      return AppError::Server {
        status: err.status().map_or(200, |s| s.as_u16()),
        message: format!("Unexpected response payload: {}", err),
      };
    }
    if let Some(status) = err.status() {
      return AppError::Server {
        status: status.as_u16(),
        message: err.to_string(),
      };
    }
    AppError::Network(err.to_string())
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<AppError>() {
      Ok(app_err) => app_err,
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::VendorId;

  #[test]
  fn validation_toast_carries_the_rule_message() {
    let err = AppError::from(CartRuleViolation::VendorConflict {
      locked: VendorId::new("a"),
      requested: VendorId::new("b"),
    });
    assert!(err.is_validation());
    assert!(err.toast_for(ListType::Cart).starts_with("Only one brand allowed"));
  }

  #[test]
  fn other_failures_get_the_generic_toast() {
    let err = AppError::Network("connection refused".into());
    assert_eq!(err.toast_for(ListType::Cart), "Could not update cart");
    assert_eq!(err.toast_for(ListType::Wishlist), "Could not update wishlist");
  }

  #[test]
  fn anyhow_round_trips_app_errors() {
    let wrapped = anyhow::Error::new(AppError::Auth("expired".into()));
    assert!(matches!(AppError::from(wrapped), AppError::Auth(_)));
  }
}
