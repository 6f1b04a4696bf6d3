// storefront/src/services/list_cache.rs

//! Best-effort file mirror of the last lists seen. Nothing guarantees it is fresh.

use crate::errors::{AppError, Result};
use crate::models::Lists;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ListCache {
  path: PathBuf,
  /// Serializes background writes so they land in the order they were queued.
  writes: Arc<Mutex<()>>,
}

impl ListCache {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      writes: Arc::new(Mutex::new(())),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// `Ok(None)` when nothing has been mirrored yet.
  pub fn load(&self) -> Result<Option<Lists>> {
    let bytes = match fs::read(&self.path) {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(AppError::Cache(format!("read {} failed: {}", self.path.display(), e))),
    };
    serde_json::from_slice(&bytes)
      .map(Some)
      .map_err(|e| AppError::Cache(format!("parse {} failed: {}", self.path.display(), e)))
  }

  /// Writes via a sibling temp file so a reader never sees half a document.
  pub fn store(&self, lists: &Lists) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(lists).map_err(|e| AppError::Cache(format!("encode failed: {}", e)))?;
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(|e| AppError::Cache(format!("create {} failed: {}", parent.display(), e)))?;
    }
    let tmp = self.path.with_extension("tmp");
    fs::write(&tmp, bytes).map_err(|e| AppError::Cache(format!("write {} failed: {}", tmp.display(), e)))?;
    fs::rename(&tmp, &self.path).map_err(|e| AppError::Cache(format!("rename to {} failed: {}", self.path.display(), e)))?;
    debug!(path = %self.path.display(), "List mirror updated.");
    Ok(())
  }

  /// Mirrors `lists` on the blocking pool, logging rather than returning a failure.
  pub async fn store_quietly(&self, lists: Lists) {
    let _turn = self.writes.lock().await;
    let cache = self.clone();
    match tokio::task::spawn_blocking(move || cache.store(&lists)).await {
      Ok(Ok(())) => {}
      Ok(Err(e)) => warn!(error = %e, "Could not mirror lists locally."),
      Err(e) => warn!(error = %e, "List mirror write did not finish."),
    }
  }

  pub fn clear(&self) {
    match fs::remove_file(&self.path) {
      Ok(()) => debug!(path = %self.path.display(), "List mirror removed."),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(e) => warn!(error = %e, path = %self.path.display(), "Could not remove list mirror."),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{ProductId, WishlistItem};

  fn wishlist_of(product: &str) -> Lists {
    Lists {
      cart: Vec::new(),
      wishlist: vec![WishlistItem {
        product_id: ProductId::new(product),
        vendor_id: None,
        name: None,
        product_images: Vec::new(),
        extra: Default::default(),
      }],
    }
  }

  #[tokio::test]
  async fn queued_writes_land_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ListCache::new(dir.path().join("nested").join("lists.json"));

    tokio::join!(cache.store_quietly(wishlist_of("p1")), cache.store_quietly(wishlist_of("p2")));

    assert_eq!(cache.load().unwrap(), Some(wishlist_of("p2")));
    assert!(!cache.path().with_extension("tmp").exists());
  }

  #[test]
  fn missing_mirror_loads_as_none_and_clears_quietly() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ListCache::new(dir.path().join("lists.json"));

    assert_eq!(cache.load().unwrap(), None);
    cache.clear();
  }
}
