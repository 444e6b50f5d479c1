//! Error notification capability.
//!
//! Stores never propagate fetch failures to their callers. They hand a
//! contextualized message to an [`ErrorSink`] and move on.

use std::io::Write;
#[cfg(test)]
use std::sync::Mutex;
use tracing::error;

/// Receives human-readable failure messages.
///
/// `report` is fire-and-forget and must not panic.
pub trait ErrorSink: Send + Sync {
  fn report(&self, message: &str);
}

/// Prints failures as a notification line on stderr and logs them.
pub struct ConsoleSink;

impl ErrorSink for ConsoleSink {
  fn report(&self, message: &str) {
    error!(message, "reported failure");
    // Ignore write errors - a closed stderr has nowhere to report to
    let _ = writeln!(std::io::stderr(), "! {}", message);
  }
}

/// Keeps every reported message, in order.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSink {
  messages: Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingSink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn messages(&self) -> Vec<String> {
    self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
  }

  /// The most recent message, which is what a toast would show.
  pub fn latest(&self) -> Option<String> {
    self.messages().last().cloned()
  }
}

#[cfg(test)]
impl ErrorSink for RecordingSink {
  fn report(&self, message: &str) {
    self
      .messages
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .push(message.to_string());
  }
}

/// Format the message every store action reports on failure.
pub fn failure_message(action: &str, detail: impl std::fmt::Display) -> String {
  format!("Failed to {}: {}", action, detail)
}
