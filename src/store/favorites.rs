use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::catalog::{CatalogApi, FavoriteRecord, FetchResult};
use crate::sink::{failure_message, ErrorSink};

use super::{Observable, Store, TaskSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesState {
  pub favorites: Vec<FavoriteRecord>,
  pub loading: bool,
  /// Favorite ids with a delete in flight
  pub removing: BTreeSet<String>,
}

impl FavoritesState {
  pub fn favorite_for_image(&self, image_id: &str) -> Option<&FavoriteRecord> {
    self.favorites.iter().find(|f| f.image_id == image_id)
  }

  pub fn is_favorite(&self, image_id: &str) -> bool {
    self.favorite_for_image(image_id).is_some()
  }

  pub fn is_removing(&self, favorite_id: &str) -> bool {
    self.removing.contains(favorite_id)
  }
}

pub enum FavoritesEvent {
  Refreshed(FetchResult<Vec<FavoriteRecord>>),
  Added {
    image_id: String,
    result: FetchResult<()>,
  },
  Removed {
    favorite_id: String,
    result: FetchResult<()>,
  },
}

/// What [`FavoritesStore::toggle`] started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
  Adding,
  Removing { favorite_id: String },
}

/// The user's favorites.
///
/// Additions refetch the whole collection since the new record's id is only
/// known to the server. Removals are applied locally as soon as the delete
/// succeeds.
pub struct FavoritesStore {
  api: Arc<dyn CatalogApi>,
  sink: Arc<dyn ErrorSink>,
  state: Observable<FavoritesState>,
  tasks: TaskSet<FavoritesEvent>,
}

impl FavoritesStore {
  /// Create the store and fetch the favorites.
  pub fn new(api: Arc<dyn CatalogApi>, sink: Arc<dyn ErrorSink>) -> Self {
    let mut store = Self {
      api,
      sink,
      state: Observable::new(FavoritesState::default()),
      tasks: TaskSet::new(),
    };
    store.refresh();
    store
  }

  pub fn state(&self) -> &FavoritesState {
    self.state.get()
  }

  pub fn subscribe(&self) -> watch::Receiver<FavoritesState> {
    self.state.subscribe()
  }

  pub fn refresh(&mut self) {
    self.state.update(|s| s.loading = true);
    let api = Arc::clone(&self.api);
    self
      .tasks
      .spawn(async move { FavoritesEvent::Refreshed(api.list_favorites().await) });
  }

  pub fn add(&mut self, image_id: &str) {
    let api = Arc::clone(&self.api);
    let image_id = image_id.to_string();
    self.tasks.spawn(async move {
      let result = api.create_favorite(&image_id).await;
      FavoritesEvent::Added { image_id, result }
    });
  }

  pub fn remove(&mut self, favorite_id: &str) {
    let favorite_id = favorite_id.to_string();
    self.state.update(|s| {
      s.removing.insert(favorite_id.clone());
    });

    let api = Arc::clone(&self.api);
    self.tasks.spawn(async move {
      let result = api.delete_favorite(&favorite_id).await;
      FavoritesEvent::Removed {
        favorite_id,
        result,
      }
    });
  }

  /// Remove the image's favorite if there is one, otherwise add it.
  pub fn toggle(&mut self, image_id: &str) -> Toggle {
    match self.state.get().favorite_for_image(image_id) {
      Some(favorite) => {
        let favorite_id = favorite.id.clone();
        self.remove(&favorite_id);
        Toggle::Removing { favorite_id }
      }
      None => {
        self.add(image_id);
        Toggle::Adding
      }
    }
  }

  pub fn poll(&mut self) -> bool {
    super::drain(self)
  }

  pub async fn settle(&mut self) {
    super::settle(self).await
  }
}

impl Store for FavoritesStore {
  type Event = FavoritesEvent;

  fn tasks(&mut self) -> &mut TaskSet<FavoritesEvent> {
    &mut self.tasks
  }

  fn apply(&mut self, event: FavoritesEvent) {
    match event {
      FavoritesEvent::Refreshed(result) => {
        match result {
          Ok(favorites) => {
            debug!(count = favorites.len(), "favorites loaded");
            self.state.update(|s| s.favorites = favorites);
          }
          Err(e) => self.sink.report(&failure_message("fetch favorites", &e)),
        }
        self.state.update(|s| s.loading = false);
      }
      FavoritesEvent::Added { image_id, result } => match result {
        Ok(()) => {
          info!(%image_id, "favorite added");
          self.refresh();
        }
        Err(e) => self.sink.report(&failure_message("add favorite", &e)),
      },
      FavoritesEvent::Removed {
        favorite_id,
        result,
      } => {
        match result {
          Ok(()) => {
            info!(%favorite_id, "favorite removed");
            self
              .state
              .update(|s| s.favorites.retain(|f| f.id != favorite_id));
          }
          Err(e) => self.sink.report(&failure_message("remove favorite", &e)),
        }
        self.state.update(|s| {
          s.removing.remove(&favorite_id);
        });
      }
    }
  }
}
