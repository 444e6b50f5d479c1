use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::cache::SessionCache;
use crate::catalog::{Breed, CatImage, CatalogApi, FetchResult};
use crate::sink::{failure_message, ErrorSink};

use super::{Observable, Store, TaskSet};

/// Session cache key for the bulk breed list
pub const BREEDS_CACHE_KEY: &str = "breeds";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreedCatalogState {
  pub breeds: Vec<Breed>,
  pub selected_breed: Option<Breed>,
  pub breed_images: Vec<CatImage>,
  pub loading_breeds: bool,
  pub loading_images: bool,
}

impl BreedCatalogState {
  pub fn find(&self, breed_id: &str) -> Option<&Breed> {
    self.breeds.iter().find(|b| b.id == breed_id)
  }
}

pub enum BreedEvent {
  BreedsLoaded(FetchResult<Vec<Breed>>),
  ImagesLoaded {
    breed_id: String,
    result: FetchResult<Vec<CatImage>>,
  },
}

/// The breed id bound by the orchestration layer
struct Selection {
  breed_id: String,
  /// Whether the id has matched a loaded breed yet
  resolved: bool,
}

/// The full breed list and the selected breed's images.
///
/// The breed list is fetched once per session: a non-empty session cache
/// entry is authoritative and no request is made.
pub struct BreedCatalogStore {
  api: Arc<dyn CatalogApi>,
  cache: SessionCache,
  sink: Arc<dyn ErrorSink>,
  state: Observable<BreedCatalogState>,
  tasks: TaskSet<BreedEvent>,
  selection: Option<Selection>,
}

impl BreedCatalogStore {
  /// Create the store and start the initial breed load.
  pub fn new(api: Arc<dyn CatalogApi>, cache: SessionCache, sink: Arc<dyn ErrorSink>) -> Self {
    let breeds = match cache.get::<Vec<Breed>>(BREEDS_CACHE_KEY) {
      Some(hit) if !hit.data.is_empty() => {
        debug!(count = hit.data.len(), cached_at = %hit.cached_at, "breeds served from session cache");
        hit.data
      }
      _ => Vec::new(),
    };

    let mut store = Self {
      api,
      cache,
      sink,
      state: Observable::new(BreedCatalogState {
        breeds,
        ..Default::default()
      }),
      tasks: TaskSet::new(),
      selection: None,
    };
    store.load_breeds();
    store
  }

  pub fn state(&self) -> &BreedCatalogState {
    self.state.get()
  }

  pub fn subscribe(&self) -> watch::Receiver<BreedCatalogState> {
    self.state.subscribe()
  }

  /// Fetch the breed list unless it is already known or being fetched.
  pub fn load_breeds(&mut self) {
    let state = self.state.get();
    if !state.breeds.is_empty() || state.loading_breeds {
      return;
    }

    self.state.update(|s| s.loading_breeds = true);
    let api = Arc::clone(&self.api);
    self
      .tasks
      .spawn(async move { BreedEvent::BreedsLoaded(api.list_breeds().await) });
  }

  /// Fetch images for a breed. Always issues a request.
  pub fn load_breed_images(&mut self, breed_id: &str) {
    self.state.update(|s| s.loading_images = true);
    let api = Arc::clone(&self.api);
    let breed_id = breed_id.to_string();
    self.tasks.spawn(async move {
      let result = api.list_breed_images(&breed_id).await;
      BreedEvent::ImagesLoaded { breed_id, result }
    });
  }

  /// Bind the externally selected breed id.
  ///
  /// A matching breed becomes `selected_breed` and its images are fetched.
  /// Binding the id that is already bound does nothing. An id that matches
  /// no loaded breed is ignored until the breed list arrives.
  pub fn bind_selection(&mut self, breed_id: Option<&str>) {
    let Some(breed_id) = breed_id else {
      self.selection = None;
      return;
    };

    if self
      .selection
      .as_ref()
      .is_some_and(|s| s.breed_id == breed_id)
    {
      return;
    }

    self.selection = Some(Selection {
      breed_id: breed_id.to_string(),
      resolved: false,
    });
    self.resolve_selection();
  }

  /// Select a breed directly, without fetching its images.
  pub fn set_selected_breed(&mut self, breed: Option<Breed>) {
    self.state.update(|s| s.selected_breed = breed);
  }

  pub fn poll(&mut self) -> bool {
    super::drain(self)
  }

  #[cfg(test)]
  pub async fn settle(&mut self) {
    super::settle(self).await
  }

  fn resolve_selection(&mut self) {
    let Some(selection) = self.selection.as_mut().filter(|s| !s.resolved) else {
      return;
    };

    let Some(breed) = self.state.get().find(&selection.breed_id).cloned() else {
      debug!(breed_id = %selection.breed_id, "selected breed not in catalog");
      return;
    };

    selection.resolved = true;
    let breed_id = breed.id.clone();
    self.state.update(|s| s.selected_breed = Some(breed));
    self.load_breed_images(&breed_id);
  }
}

impl Store for BreedCatalogStore {
  type Event = BreedEvent;

  fn tasks(&mut self) -> &mut TaskSet<BreedEvent> {
    &mut self.tasks
  }

  fn apply(&mut self, event: BreedEvent) {
    match event {
      BreedEvent::BreedsLoaded(Ok(breeds)) => {
        info!(count = breeds.len(), "breeds loaded");
        self.cache.put(BREEDS_CACHE_KEY, &breeds);
        self.state.update(|s| {
          s.breeds = breeds;
          s.loading_breeds = false;
        });
        // A selection bound before the list arrived can match now.
        self.resolve_selection();
      }
      BreedEvent::BreedsLoaded(Err(e)) => {
        self.sink.report(&failure_message("fetch breeds", &e));
        self.state.update(|s| s.loading_breeds = false);
      }
      BreedEvent::ImagesLoaded {
        breed_id,
        result: Ok(images),
      } => {
        debug!(%breed_id, count = images.len(), "breed images loaded");
        self.state.update(|s| {
          s.breed_images = images;
          s.loading_images = false;
        });
      }
      BreedEvent::ImagesLoaded {
        breed_id,
        result: Err(e),
      } => {
        debug!(%breed_id, error = %e, "breed images failed");
        self.sink.report(&failure_message("fetch breed images", &e));
        self.state.update(|s| s.loading_images = false);
      }
    }
  }
}
