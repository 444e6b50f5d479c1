//! Session storage backends.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::traits::{CachedEntry, SessionStorage};

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl SessionStorage for NoopStorage {
  fn get_item(&self, _key: &str) -> Option<CachedEntry> {
    None // Always miss
  }

  fn set_item(&self, _key: &str, _value: String) {} // Discard

  fn remove_item(&self, _key: &str) {}
}

/// In-memory storage that lives as long as the process.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, CachedEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn entries(&self) -> MutexGuard<'_, HashMap<String, CachedEntry>> {
    // Entries are replaced whole, so a poisoned map is still consistent.
    self.entries.lock().unwrap_or_else(|e| e.into_inner())
  }
}

impl SessionStorage for MemoryStorage {
  fn get_item(&self, key: &str) -> Option<CachedEntry> {
    self.entries().get(key).cloned()
  }

  fn set_item(&self, key: &str, value: String) {
    let entry = CachedEntry {
      value,
      cached_at: Utc::now(),
    };
    self.entries().insert(key.to_string(), entry);
  }

  fn remove_item(&self, key: &str) {
    self.entries().remove(key);
  }
}
