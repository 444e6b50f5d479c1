//! Process-wide service registry.
//!
//! The error sink and the favorites store are created once at startup and
//! handed out from here. Asking for a service before it was registered is a
//! programmer error and panics immediately; it is never reported through the
//! error sink.

use std::sync::Arc;

use crate::cache::SessionCache;
use crate::catalog::CatalogApi;
use crate::sink::ErrorSink;
use crate::store::{BreedCatalogStore, FavoritesStore, ImageFeedStore};

pub struct Services {
  api: Arc<dyn CatalogApi>,
  cache: SessionCache,
  sink: Option<Arc<dyn ErrorSink>>,
  favorites: Option<FavoritesStore>,
}

impl Services {
  pub fn new(api: Arc<dyn CatalogApi>, cache: SessionCache) -> Self {
    Self {
      api,
      cache,
      sink: None,
      favorites: None,
    }
  }

  pub fn register_error_sink(&mut self, sink: Arc<dyn ErrorSink>) {
    self.sink = Some(sink);
  }

  /// Create the process-wide favorites store. Requires the error sink.
  pub fn register_favorites(&mut self) {
    let store = FavoritesStore::new(Arc::clone(&self.api), self.error_sink());
    self.favorites = Some(store);
  }

  pub fn error_sink(&self) -> Arc<dyn ErrorSink> {
    match &self.sink {
      Some(sink) => Arc::clone(sink),
      None => panic!("error sink requested before it was registered"),
    }
  }

  pub fn favorites(&self) -> &FavoritesStore {
    match &self.favorites {
      Some(store) => store,
      None => panic!("favorites store requested before it was registered"),
    }
  }

  pub fn favorites_mut(&mut self) -> &mut FavoritesStore {
    match &mut self.favorites {
      Some(store) => store,
      None => panic!("favorites store requested before it was registered"),
    }
  }

  /// A fresh breed catalog store; its initial load starts immediately.
  pub fn breed_catalog(&self) -> BreedCatalogStore {
    BreedCatalogStore::new(Arc::clone(&self.api), self.cache.clone(), self.error_sink())
  }

  /// A fresh image feed store; its first batch starts loading immediately.
  pub fn image_feed(&self) -> ImageFeedStore {
    ImageFeedStore::new(Arc::clone(&self.api), self.error_sink())
  }
}
