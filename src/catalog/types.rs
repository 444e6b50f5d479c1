use serde::{Deserialize, Serialize};

/// Weight range of a breed, as display strings (e.g. "7 - 10")
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weight {
  #[serde(default)]
  pub imperial: String,
  #[serde(default)]
  pub metric: String,
}

/// Breed metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breed {
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub temperament: String,
  #[serde(default)]
  pub origin: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub life_span: String,
  #[serde(default)]
  pub alt_names: String,
  #[serde(default)]
  pub country_code: String,
  /// Ordinal 0-5
  #[serde(default)]
  pub energy_level: u8,
  #[serde(default)]
  pub wikipedia_url: String,
  #[serde(default)]
  pub weight: Weight,
}

/// A single image, optionally annotated with breed info
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatImage {
  pub id: String,
  pub url: String,
  #[serde(default)]
  pub width: u32,
  #[serde(default)]
  pub height: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub breeds: Option<Vec<Breed>>,
}

impl CatImage {
  /// The breed shown on the detail view, if the image is annotated.
  pub fn primary_breed(&self) -> Option<&Breed> {
    self.breeds.as_ref().and_then(|b| b.first())
  }
}

/// The image reference nested in a favorite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteImage {
  pub id: String,
  pub url: String,
}

/// A user-scoped link to a favorited image.
///
/// `id` identifies the favorite itself and is distinct from `image_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteRecord {
  pub id: String,
  pub image_id: String,
  pub user_id: String,
  pub image: FavoriteImage,
}
