use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::Config;

use super::api_types::{ApiFavourite, ApiNewFavourite};
use super::error::{FetchFailure, FetchResult};
use super::types::{Breed, CatImage, FavoriteRecord};

/// Images requested per random batch
pub const RANDOM_BATCH_SIZE: usize = 10;
/// Upper bound for images returned for a single breed
pub const BREED_IMAGE_LIMIT: usize = 100;

/// Typed access to the remote catalogue.
///
/// Every call is a single attempt; failures come back as a [`FetchFailure`]
/// message and nothing else.
#[async_trait]
pub trait CatalogApi: Send + Sync {
  /// All breeds, in one bulk request
  async fn list_breeds(&self) -> FetchResult<Vec<Breed>>;

  /// At most [`BREED_IMAGE_LIMIT`] images for one breed
  async fn list_breed_images(&self, breed_id: &str) -> FetchResult<Vec<CatImage>>;

  /// Favorites, most recent first, with the nested image populated
  async fn list_favorites(&self) -> FetchResult<Vec<FavoriteRecord>>;

  async fn create_favorite(&self, image_id: &str) -> FetchResult<()>;

  async fn delete_favorite(&self, favorite_id: &str) -> FetchResult<()>;

  async fn get_image(&self, image_id: &str) -> FetchResult<CatImage>;

  /// [`RANDOM_BATCH_SIZE`] random images; batches may repeat images
  async fn list_random_images(&self) -> FetchResult<Vec<CatImage>>;
}

/// TheCatAPI REST client
#[derive(Clone)]
pub struct CatClient {
  http: Client,
  base_url: Url,
  timeout: Duration,
}

impl CatClient {
  pub fn new(config: &Config, api_key: Option<&str>) -> Result<Self> {
    let timeout = config.api.timeout();

    let mut headers = HeaderMap::new();
    if let Some(key) = api_key {
      let value =
        HeaderValue::from_str(key).map_err(|e| eyre!("Invalid API key header value: {}", e))?;
      headers.insert("x-api-key", value);
    }

    let http = Client::builder()
      .timeout(timeout)
      .default_headers(headers)
      .user_agent(concat!("catdex/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url: parse_base_url(&config.api.base_url)?,
      timeout,
    })
  }

  /// Append path segments to the base URL. Each segment is percent-encoded,
  /// so ids can never introduce extra path components.
  fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> FetchResult<Url> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| FetchFailure::new(format!("Invalid base URL {}", self.base_url)))?
      .pop_if_empty()
      .extend(segments);

    if !query.is_empty() {
      url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
  }

  fn request(&self, method: Method, url: Url) -> RequestBuilder {
    debug!(%method, %url, "catalog request");
    self.http.request(method, url)
  }

  /// Send a request and turn every non-success outcome into a FetchFailure.
  async fn send(&self, request: RequestBuilder) -> FetchResult<reqwest::Response> {
    let response = request
      .send()
      .await
      .map_err(|e| FetchFailure::from_transport(&e, self.timeout))?;

    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(%status, body = %body, "catalog request failed");
    Err(FetchFailure::from_response(status, &body))
  }

  async fn get_json<T: DeserializeOwned>(&self, segments: &[&str], query: &[(&str, &str)]) -> FetchResult<T> {
    let url = self.endpoint(segments, query)?;
    let response = self.send(self.request(Method::GET, url)).await?;

    let body = response
      .text()
      .await
      .map_err(|e| FetchFailure::from_transport(&e, self.timeout))?;
    serde_json::from_str(&body).map_err(|e| FetchFailure::new(format!("Invalid response body: {}", e)))
  }
}

fn parse_base_url(raw: &str) -> Result<Url> {
  let url = Url::parse(raw).map_err(|e| eyre!("Invalid api.base_url {}: {}", raw, e))?;
  if url.cannot_be_a_base() {
    return Err(eyre!("Invalid api.base_url {}: not a hierarchical URL", raw));
  }
  Ok(url)
}

#[async_trait]
impl CatalogApi for CatClient {
  async fn list_breeds(&self) -> FetchResult<Vec<Breed>> {
    self.get_json(&["breeds"], &[]).await
  }

  async fn list_breed_images(&self, breed_id: &str) -> FetchResult<Vec<CatImage>> {
    let limit = BREED_IMAGE_LIMIT.to_string();
    let mut images: Vec<CatImage> = self
      .get_json(&["images", "search"], &[("limit", limit.as_str()), ("breed_ids", breed_id)])
      .await?;
    images.truncate(BREED_IMAGE_LIMIT);
    Ok(images)
  }

  async fn list_favorites(&self) -> FetchResult<Vec<FavoriteRecord>> {
    let favourites: Vec<ApiFavourite> = self
      .get_json(&["favourites"], &[("order", "DESC"), ("attach_image", "1")])
      .await?;
    Ok(favourites.into_iter().map(FavoriteRecord::from).collect())
  }

  async fn create_favorite(&self, image_id: &str) -> FetchResult<()> {
    let url = self.endpoint(&["favourites"], &[])?;
    let request = self
      .request(Method::POST, url)
      .json(&ApiNewFavourite { image_id });
    self.send(request).await?;
    Ok(())
  }

  async fn delete_favorite(&self, favorite_id: &str) -> FetchResult<()> {
    let url = self.endpoint(&["favourites", favorite_id], &[])?;
    self.send(self.request(Method::DELETE, url)).await?;
    Ok(())
  }

  async fn get_image(&self, image_id: &str) -> FetchResult<CatImage> {
    self.get_json(&["images", image_id], &[]).await
  }

  async fn list_random_images(&self) -> FetchResult<Vec<CatImage>> {
    let limit = RANDOM_BATCH_SIZE.to_string();
    let mut images: Vec<CatImage> = self.get_json(&["images", "search"], &[("limit", limit.as_str())]).await?;
    images.truncate(RANDOM_BATCH_SIZE);
    Ok(images)
  }
}
