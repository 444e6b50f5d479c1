use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::catalog::{CatImage, CatalogApi, FetchResult};
use crate::sink::{failure_message, ErrorSink};

use super::{Observable, Store, TaskSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageFeedState {
  pub images: Vec<CatImage>,
  pub loading: bool,
  /// Image opened in the detail view
  pub selected_image: Option<CatImage>,
  pub loading_image: bool,
}

pub enum ImageFeedEvent {
  BatchLoaded {
    append: bool,
    result: FetchResult<Vec<CatImage>>,
  },
  DetailLoaded {
    image_id: String,
    result: FetchResult<CatImage>,
  },
}

/// An appendable feed of random images.
pub struct ImageFeedStore {
  api: Arc<dyn CatalogApi>,
  sink: Arc<dyn ErrorSink>,
  state: Observable<ImageFeedState>,
  tasks: TaskSet<ImageFeedEvent>,
  /// Image id whose detail fetch may still be applied
  pending_image: Option<String>,
}

impl ImageFeedStore {
  /// Create the store and load the first batch.
  pub fn new(api: Arc<dyn CatalogApi>, sink: Arc<dyn ErrorSink>) -> Self {
    let mut store = Self {
      api,
      sink,
      state: Observable::new(ImageFeedState::default()),
      tasks: TaskSet::new(),
      pending_image: None,
    };
    store.load_images(false);
    store
  }

  pub fn state(&self) -> &ImageFeedState {
    self.state.get()
  }

  pub fn subscribe(&self) -> watch::Receiver<ImageFeedState> {
    self.state.subscribe()
  }

  /// Fetch a random batch and either append it or replace the feed.
  ///
  /// Concurrent calls are not merged; results land in completion order.
  pub fn load_images(&mut self, append: bool) {
    self.state.update(|s| s.loading = true);
    let api = Arc::clone(&self.api);
    self.tasks.spawn(async move {
      let result = api.list_random_images().await;
      ImageFeedEvent::BatchLoaded { append, result }
    });
  }

  /// Fetch one image for the detail view.
  ///
  /// Only the latest open counts; results of earlier or closed opens are
  /// dropped.
  pub fn open_image(&mut self, image_id: &str) {
    self.state.update(|s| s.loading_image = true);
    let api = Arc::clone(&self.api);
    let image_id = image_id.to_string();
    self.pending_image = Some(image_id.clone());
    self.tasks.spawn(async move {
      let result = api.get_image(&image_id).await;
      ImageFeedEvent::DetailLoaded { image_id, result }
    });
  }

  /// Open an image that is already loaded, without a request.
  pub fn select_image(&mut self, image: CatImage) {
    self.pending_image = None;
    self.state.update(|s| {
      s.selected_image = Some(image);
      s.loading_image = false;
    });
  }

  pub fn close_image(&mut self) {
    self.pending_image = None;
    self.state.update(|s| {
      s.selected_image = None;
      s.loading_image = false;
    });
  }

  pub fn poll(&mut self) -> bool {
    super::drain(self)
  }

  #[cfg(test)]
  pub async fn settle(&mut self) {
    super::settle(self).await
  }
}

impl Store for ImageFeedStore {
  type Event = ImageFeedEvent;

  fn tasks(&mut self) -> &mut TaskSet<ImageFeedEvent> {
    &mut self.tasks
  }

  fn apply(&mut self, event: ImageFeedEvent) {
    match event {
      ImageFeedEvent::BatchLoaded { append, result } => {
        match result {
          Ok(batch) => {
            debug!(append, count = batch.len(), "image batch loaded");
            self.state.update(|s| {
              if append {
                s.images.extend(batch);
              } else {
                s.images = batch;
              }
            });
          }
          Err(e) => self.sink.report(&failure_message("fetch images", &e)),
        }
        self.state.update(|s| s.loading = false);
      }
      ImageFeedEvent::DetailLoaded { image_id, .. }
        if self.pending_image.as_deref() != Some(image_id.as_str()) =>
      {
        debug!(%image_id, "dropping superseded image detail");
      }
      ImageFeedEvent::DetailLoaded { image_id, result } => {
        self.pending_image = None;
        match result {
          Ok(image) => {
            debug!(%image_id, "image detail loaded");
            self.state.update(|s| {
              s.selected_image = Some(image);
              s.loading_image = false;
            });
          }
          Err(e) => {
            self.sink.report(&format!("Error fetching image: {}", e));
            self.state.update(|s| {
              s.selected_image = None;
              s.loading_image = false;
            });
          }
        }
      }
    }
  }
}
