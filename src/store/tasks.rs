//! In-flight request tracking for stores.
//!
//! Each store action spawns its request as a task and gets a message back
//! when it completes. Messages are collected in completion order, never
//! invocation order, and only the owning store applies them:
//!
//! ```ignore
//! tasks.spawn(async move { Event::Loaded(api.list_breeds().await) });
//!
//! // In event loop tick
//! while let Some(event) = tasks.try_next() {
//!     apply(event);
//! }
//! ```
//!
//! Dropping a `TaskSet` detaches its tasks. Requests still run to the end
//! but their results have no receiver, so they are discarded.

use std::future::Future;
use tokio::task::JoinSet;
use tracing::warn;

pub struct TaskSet<E: Send + 'static> {
  set: JoinSet<E>,
}

impl<E: Send + 'static> TaskSet<E> {
  pub fn new() -> Self {
    Self {
      set: JoinSet::new(),
    }
  }

  /// Start a request. Must be called from within a tokio runtime.
  pub fn spawn<F>(&mut self, future: F)
  where
    F: Future<Output = E> + Send + 'static,
  {
    self.set.spawn(future);
  }

  /// Number of requests still running or not yet collected.
  #[cfg(test)]
  pub fn pending(&self) -> usize {
    self.set.len()
  }

  /// Collect one completed result without waiting.
  pub fn try_next(&mut self) -> Option<E> {
    loop {
      match self.set.try_join_next()? {
        Ok(event) => return Some(event),
        Err(e) => warn!(error = %e, "store request task did not complete"),
      }
    }
  }

  /// Wait for the next result. Returns `None` once nothing is in flight.
  pub async fn next(&mut self) -> Option<E> {
    loop {
      match self.set.join_next().await? {
        Ok(event) => return Some(event),
        Err(e) => warn!(error = %e, "store request task did not complete"),
      }
    }
  }
}

impl<E: Send + 'static> Default for TaskSet<E> {
  fn default() -> Self {
    Self::new()
  }
}

impl<E: Send + 'static> Drop for TaskSet<E> {
  fn drop(&mut self) {
    self.set.detach_all();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  #[tokio::test]
  async fn test_results_arrive_in_completion_order() {
    let mut tasks = TaskSet::new();
    tasks.spawn(async {
      tokio::time::sleep(Duration::from_millis(50)).await;
      "slow"
    });
    tasks.spawn(async { "fast" });

    assert_eq!(tasks.pending(), 2);
    assert_eq!(tasks.next().await, Some("fast"));
    assert_eq!(tasks.next().await, Some("slow"));
    assert_eq!(tasks.next().await, None);
  }

  #[tokio::test]
  async fn test_try_next_does_not_wait() {
    let mut tasks = TaskSet::new();
    tasks.spawn(async {
      tokio::time::sleep(Duration::from_millis(100)).await;
      1
    });

    assert_eq!(tasks.try_next(), None);
    assert_eq!(tasks.pending(), 1);
  }

  #[tokio::test]
  async fn test_panicking_task_is_skipped() {
    let mut tasks: TaskSet<i32> = TaskSet::new();
    tasks.spawn(async { Option::<i32>::None.unwrap() });
    tasks.spawn(async {
      tokio::time::sleep(Duration::from_millis(10)).await;
      7
    });

    assert_eq!(tasks.next().await, Some(7));
    assert_eq!(tasks.next().await, None);
  }

  #[tokio::test]
  async fn test_drop_detaches_instead_of_aborting() {
    let finished = Arc::new(AtomicBool::new(false));
    let flag = finished.clone();

    let mut tasks = TaskSet::new();
    tasks.spawn(async move {
      tokio::time::sleep(Duration::from_millis(20)).await;
      flag.store(true, Ordering::SeqCst);
    });
    drop(tasks);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(finished.load(Ordering::SeqCst));
  }
}
