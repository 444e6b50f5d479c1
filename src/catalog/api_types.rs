//! Serde-deserializable types matching TheCatAPI responses.
//!
//! These types are separate from domain types so wire quirks (numeric ids,
//! partially populated nested images) stay out of the stores.

use serde::{Deserialize, Deserializer, Serialize};

use super::types::{FavoriteImage, FavoriteRecord};

/// Identifier that the API sends either as a JSON number or a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiId {
  Number(u64),
  Text(String),
}

impl From<ApiId> for String {
  fn from(id: ApiId) -> Self {
    match id {
      ApiId::Number(n) => n.to_string(),
      ApiId::Text(s) => s,
    }
  }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  ApiId::deserialize(deserializer).map(String::from)
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  let id: Option<ApiId> = Option::deserialize(deserializer)?;
  Ok(id.map(String::from).unwrap_or_default())
}

// ============================================================================
// Favourites
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct ApiFavouriteImage {
  #[serde(default, deserialize_with = "deserialize_opt_id")]
  pub id: String,
  #[serde(default)]
  pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiFavourite {
  #[serde(deserialize_with = "deserialize_id")]
  pub id: String,
  #[serde(deserialize_with = "deserialize_id")]
  pub image_id: String,
  #[serde(default, deserialize_with = "deserialize_opt_id")]
  pub user_id: String,
  #[serde(default)]
  pub image: ApiFavouriteImage,
}

impl From<ApiFavourite> for FavoriteRecord {
  fn from(api: ApiFavourite) -> Self {
    // The nested image id is sometimes omitted; it always equals image_id.
    let image_id = if api.image.id.is_empty() {
      api.image_id.clone()
    } else {
      api.image.id
    };

    Self {
      id: api.id,
      image_id: api.image_id,
      user_id: api.user_id,
      image: FavoriteImage {
        id: image_id,
        url: api.image.url,
      },
    }
  }
}

/// Request body for creating a favourite
#[derive(Debug, Serialize)]
pub struct ApiNewFavourite<'a> {
  pub image_id: &'a str,
}

// ============================================================================
// Errors
// ============================================================================

/// Error body shape; the API uses `message` when it sends JSON at all.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
  pub message: Option<String>,
}
