//! Typed session cache over a raw storage backend.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::warn;

use super::traits::SessionStorage;

/// A decoded cache hit.
#[derive(Debug, Clone)]
pub struct Cached<T> {
  pub data: T,
  pub cached_at: DateTime<Utc>,
}

/// JSON-encoding cache shared by every store instance in a session.
///
/// Values are stored as whole snapshots; readers never see a partial write.
pub struct SessionCache {
  storage: Arc<dyn SessionStorage>,
}

impl SessionCache {
  pub fn new(storage: impl SessionStorage + 'static) -> Self {
    Self {
      storage: Arc::new(storage),
    }
  }

  /// Read and decode an entry.
  ///
  /// Entries that no longer decode are dropped and treated as a miss.
  pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<Cached<T>> {
    let entry = self.storage.get_item(key)?;

    match serde_json::from_str(&entry.value) {
      Ok(data) => Some(Cached {
        data,
        cached_at: entry.cached_at,
      }),
      Err(e) => {
        warn!(key, error = %e, "discarding undecodable session cache entry");
        self.storage.remove_item(key);
        None
      }
    }
  }

  /// Encode and store a snapshot under `key`.
  pub fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
    match serde_json::to_string(value) {
      Ok(json) => self.storage.set_item(key, json),
      Err(e) => warn!(key, error = %e, "failed to encode session cache entry"),
    }
  }
}

impl Clone for SessionCache {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}
