//! Plain-text views of store state.

use std::fmt::Write;

use crate::catalog::{Breed, CatImage};
use crate::store::{BreedCatalogState, FavoritesState, ImageFeedState};

/// Random image feed, marking favorited images
pub fn feed(state: &ImageFeedState, favorites: &FavoritesState) -> String {
  let mut out = format!("Random cats ({})\n", state.images.len());
  if state.images.is_empty() {
    out.push_str("  no images, try 'home' again\n");
  }
  for image in &state.images {
    let marker = if favorites.is_favorite(&image.id) { '*' } else { ' ' };
    let _ = writeln!(out, " {} {:<12} {}", marker, image.id, image.url);
  }
  out
}

/// Single image with its primary breed
pub fn image_detail(image: &CatImage, favorites: &FavoritesState) -> String {
  let mut out = format!("Image {}\n  {}\n", image.id, image.url);
  let _ = writeln!(out, "  size      {}x{}", image.width, image.height);

  match image.primary_breed() {
    Some(breed) => {
      let _ = writeln!(out, "  breed     {}", breed.name);
      field(&mut out, "temper", &breed.temperament);
      field(&mut out, "origin", &breed.origin);
      field(&mut out, "life span", &breed.life_span);
    }
    None => out.push_str("  breed     Unknown\n"),
  }

  match favorites.favorite_for_image(&image.id) {
    Some(f) => {
      let _ = writeln!(out, "  favorite  yes ({})", f.id);
    }
    None => out.push_str("  favorite  no\n"),
  }
  out
}

/// Breed list, or the selected breed and its images
pub fn breeds(state: &BreedCatalogState) -> String {
  match &state.selected_breed {
    Some(breed) => breed_detail(breed, &state.breed_images),
    None => breed_list(&state.breeds),
  }
}

fn breed_list(breeds: &[Breed]) -> String {
  let mut out = format!("Breeds ({})\n", breeds.len());
  for breed in breeds {
    let _ = writeln!(out, "  {:<6} {:<28} {}", breed.id, breed.name, breed.origin);
  }
  out
}

fn breed_detail(breed: &Breed, images: &[CatImage]) -> String {
  let mut out = format!("{} ({})\n", breed.name, breed.id);
  field(&mut out, "also", &breed.alt_names);
  field(&mut out, "origin", &breed.origin);
  field(&mut out, "temper", &breed.temperament);
  field(&mut out, "life span", &breed.life_span);
  if !breed.weight.metric.is_empty() {
    let _ = writeln!(out, "  {:<9} {} kg", "weight", breed.weight.metric);
  }
  let _ = writeln!(out, "  {:<9} {}", "energy", energy_bar(breed.energy_level));
  field(&mut out, "wiki", &breed.wikipedia_url);
  if !breed.description.is_empty() {
    let _ = writeln!(out, "\n  {}", breed.description);
  }

  let _ = writeln!(out, "\nImages ({})", images.len());
  for image in images {
    let _ = writeln!(out, "  {:<12} {}", image.id, image.url);
  }
  out
}

/// Favorites, most recent first
pub fn favorites(state: &FavoritesState) -> String {
  let mut out = format!("Favorites ({})\n", state.favorites.len());
  if state.favorites.is_empty() {
    out.push_str("  none yet, add one with 'fav <image_id>'\n");
  }
  for f in &state.favorites {
    let suffix = if state.is_removing(&f.id) { "  (removing)" } else { "" };
    let _ = writeln!(out, "  {:<10} {:<12} {}{}", f.id, f.image_id, f.image.url, suffix);
  }
  out
}

fn field(out: &mut String, label: &str, value: &str) {
  if !value.is_empty() {
    let _ = writeln!(out, "  {:<9} {}", label, value);
  }
}

/// Energy level as filled and empty pips out of five
fn energy_bar(level: u8) -> String {
  let level = level.min(5) as usize;
  format!("{}{}", "#".repeat(level), ".".repeat(5 - level))
}
