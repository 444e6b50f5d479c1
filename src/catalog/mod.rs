//! Remote catalogue access: breeds, images and favourites from TheCatAPI.

mod api_types;
mod client;
mod error;
#[cfg(test)]
pub mod mock;
mod types;

pub use client::{CatClient, CatalogApi};
pub use error::FetchResult;
pub use types::{Breed, CatImage, FavoriteRecord};
