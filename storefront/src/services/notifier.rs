// storefront/src/services/notifier.rs

//! User-facing notifications. Every caught failure ends up here as a toast.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
  Success,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
  pub level: ToastLevel,
  pub message: String,
}

impl Toast {
  pub fn success(message: impl Into<String>) -> Self {
    Self {
      level: ToastLevel::Success,
      message: message.into(),
    }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self {
      level: ToastLevel::Error,
      message: message.into(),
    }
  }
}

pub trait Notifier: Send + Sync {
  fn notify(&self, toast: Toast);
}

/// Writes toasts to the log. Used when nothing renders them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
  fn notify(&self, toast: Toast) {
    match toast.level {
      ToastLevel::Success => info!(toast = %toast.message, "toast"),
      ToastLevel::Error => warn!(toast = %toast.message, "toast"),
    }
  }
}

/// Collects toasts until a presentation layer drains them.
#[derive(Debug, Default, Clone)]
pub struct ToastQueue {
  pending: Arc<Mutex<Vec<Toast>>>,
}

impl ToastQueue {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn drain(&self) -> Vec<Toast> {
    std::mem::take(&mut *self.pending.lock())
  }

  pub fn errors(&self) -> Vec<String> {
    self
      .pending
      .lock()
      .iter()
      .filter(|t| t.level == ToastLevel::Error)
      .map(|t| t.message.clone())
      .collect()
  }

  pub fn len(&self) -> usize {
    self.pending.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.pending.lock().is_empty()
  }
}

impl Notifier for ToastQueue {
  fn notify(&self, toast: Toast) {
    self.pending.lock().push(toast);
  }
}
