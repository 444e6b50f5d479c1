//! Stores reconciling remote collections with local view state.
//!
//! Every store follows the same lifecycle:
//! - construction starts the initial load
//! - actions flip a loading flag and spawn one request
//! - `poll()` / `settle()` apply completed requests on the owner's side
//! - failures go to the [`ErrorSink`](crate::sink::ErrorSink); state keeps
//!   its last good value and only the loading flag resolves

mod breeds;
mod favorites;
mod images;
mod observable;
mod tasks;

#[cfg(test)]
pub use breeds::BREEDS_CACHE_KEY;
pub use breeds::{BreedCatalogState, BreedCatalogStore};
pub use favorites::{FavoritesState, FavoritesStore, Toggle};
pub use images::{ImageFeedState, ImageFeedStore};

use observable::Observable;
use tasks::TaskSet;

/// The request/commit plumbing shared by all stores.
trait Store {
  type Event: Send + 'static;

  fn tasks(&mut self) -> &mut TaskSet<Self::Event>;

  /// Commit one completed request.
  fn apply(&mut self, event: Self::Event);
}

/// Apply every completed request. Returns whether anything was applied.
fn drain<S: Store>(store: &mut S) -> bool {
  let mut changed = false;
  while let Some(event) = store.tasks().try_next() {
    store.apply(event);
    changed = true;
  }
  changed
}

/// Wait for and apply every in-flight request, including ones spawned by
/// the results being applied.
async fn settle<S: Store>(store: &mut S) {
  while let Some(event) = store.tasks().next().await {
    store.apply(event);
  }
}
