//! Core traits and types for the session cache.

use chrono::{DateTime, Utc};

/// A raw cache entry: serialized JSON plus when it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
  pub value: String,
  pub cached_at: DateTime<Utc>,
}

/// Key-value storage scoped to one session.
///
/// Writes are whole-value snapshots, so implementations only need to make
/// individual operations atomic.
pub trait SessionStorage: Send + Sync {
  fn get_item(&self, key: &str) -> Option<CachedEntry>;

  fn set_item(&self, key: &str, value: String);

  fn remove_item(&self, key: &str);
}
