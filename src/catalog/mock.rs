//! Scripted catalog for testing.
//!
//! Queues responses per operation and records every call for verification.
//! Operations with nothing queued succeed with an empty result.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::client::CatalogApi;
use super::error::{FetchFailure, FetchResult};
use super::types::{Breed, CatImage, FavoriteImage, FavoriteRecord};

/// A call observed by the mock, in invocation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  ListBreeds,
  ListBreedImages(String),
  ListFavorites,
  CreateFavorite(String),
  DeleteFavorite(String),
  GetImage(String),
  ListRandomImages,
}

struct Scripted<T> {
  delay: Duration,
  result: FetchResult<T>,
}

#[derive(Default)]
struct MockCatalogInner {
  calls: Vec<Call>,
  breeds: VecDeque<Scripted<Vec<Breed>>>,
  breed_images: VecDeque<Scripted<Vec<CatImage>>>,
  favorites: VecDeque<Scripted<Vec<FavoriteRecord>>>,
  creates: VecDeque<Scripted<()>>,
  deletes: VecDeque<Scripted<()>>,
  images: VecDeque<Scripted<CatImage>>,
  random_images: VecDeque<Scripted<Vec<CatImage>>>,
}

#[derive(Clone, Default)]
pub struct MockCatalog {
  inner: Arc<Mutex<MockCatalogInner>>,
}

macro_rules! queue_fns {
  ($field:ident, $ty:ty, $queue:ident, $queue_after:ident) => {
    pub fn $queue(&self, result: FetchResult<$ty>) {
      self.$queue_after(Duration::ZERO, result);
    }

    pub fn $queue_after(&self, delay: Duration, result: FetchResult<$ty>) {
      let mut inner = self.inner.lock().unwrap();
      inner.$field.push_back(Scripted { delay, result });
    }
  };
}

impl MockCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  queue_fns!(breeds, Vec<Breed>, queue_breeds, queue_breeds_after);
  queue_fns!(breed_images, Vec<CatImage>, queue_breed_images, queue_breed_images_after);
  queue_fns!(favorites, Vec<FavoriteRecord>, queue_favorites, queue_favorites_after);
  queue_fns!(creates, (), queue_create, queue_create_after);
  queue_fns!(deletes, (), queue_delete, queue_delete_after);
  queue_fns!(images, CatImage, queue_image, queue_image_after);
  queue_fns!(random_images, Vec<CatImage>, queue_random_images, queue_random_images_after);

  /// All calls so far
  pub fn calls(&self) -> Vec<Call> {
    self.inner.lock().unwrap().calls.clone()
  }

  /// Number of calls matching a predicate
  pub fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
    self.inner.lock().unwrap().calls.iter().filter(|c| f(c)).count()
  }

  fn record<T>(
    &self,
    call: Call,
    pick: impl FnOnce(&mut MockCatalogInner) -> Option<Scripted<T>>,
  ) -> Option<Scripted<T>> {
    let mut inner = self.inner.lock().unwrap();
    inner.calls.push(call);
    pick(&mut inner)
  }
}

async fn resolve<T>(scripted: Option<Scripted<T>>, fallback: impl FnOnce() -> FetchResult<T>) -> FetchResult<T> {
  match scripted {
    Some(Scripted { delay, result }) => {
      if !delay.is_zero() {
        tokio::time::sleep(delay).await;
      }
      result
    }
    None => fallback(),
  }
}

#[async_trait]
impl CatalogApi for MockCatalog {
  async fn list_breeds(&self) -> FetchResult<Vec<Breed>> {
    let next = self.record(Call::ListBreeds, |i| i.breeds.pop_front());
    resolve(next, || Ok(Vec::new())).await
  }

  async fn list_breed_images(&self, breed_id: &str) -> FetchResult<Vec<CatImage>> {
    let next = self.record(Call::ListBreedImages(breed_id.to_string()), |i| {
      i.breed_images.pop_front()
    });
    resolve(next, || Ok(Vec::new())).await
  }

  async fn list_favorites(&self) -> FetchResult<Vec<FavoriteRecord>> {
    let next = self.record(Call::ListFavorites, |i| i.favorites.pop_front());
    resolve(next, || Ok(Vec::new())).await
  }

  async fn create_favorite(&self, image_id: &str) -> FetchResult<()> {
    let next = self.record(Call::CreateFavorite(image_id.to_string()), |i| {
      i.creates.pop_front()
    });
    resolve(next, || Ok(())).await
  }

  async fn delete_favorite(&self, favorite_id: &str) -> FetchResult<()> {
    let next = self.record(Call::DeleteFavorite(favorite_id.to_string()), |i| {
      i.deletes.pop_front()
    });
    resolve(next, || Ok(())).await
  }

  async fn get_image(&self, image_id: &str) -> FetchResult<CatImage> {
    let next = self.record(Call::GetImage(image_id.to_string()), |i| i.images.pop_front());
    let id = image_id.to_string();
    resolve(next, move || Err(FetchFailure::new(format!("No image {}", id)))).await
  }

  async fn list_random_images(&self) -> FetchResult<Vec<CatImage>> {
    let next = self.record(Call::ListRandomImages, |i| i.random_images.pop_front());
    resolve(next, || Ok(Vec::new())).await
  }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn breed(id: &str, name: &str) -> Breed {
  Breed {
    id: id.to_string(),
    name: name.to_string(),
    ..Default::default()
  }
}

pub fn image(id: &str) -> CatImage {
  CatImage {
    id: id.to_string(),
    url: format!("https://cdn2.thecatapi.com/images/{}.jpg", id),
    width: 640,
    height: 480,
    breeds: None,
  }
}

/// A batch of images with ids `<prefix>0..<prefix>{n-1}`
pub fn batch(prefix: &str, n: usize) -> Vec<CatImage> {
  (0..n).map(|i| image(&format!("{}{}", prefix, i))).collect()
}

pub fn favorite(id: &str, image_id: &str) -> FavoriteRecord {
  FavoriteRecord {
    id: id.to_string(),
    image_id: image_id.to_string(),
    user_id: "user".to_string(),
    image: FavoriteImage {
      id: image_id.to_string(),
      url: format!("https://cdn2.thecatapi.com/images/{}.jpg", image_id),
    },
  }
}

pub fn failure(message: &str) -> FetchFailure {
  FetchFailure::new(message)
}
