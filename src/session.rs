use color_eyre::Result;
use std::io::Write;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::commands::{self, Action};
use crate::event::{Event, EventHandler};
use crate::render;
use crate::services::Services;
use crate::store::{
  BreedCatalogState, BreedCatalogStore, FavoritesState, ImageFeedState, ImageFeedStore, Toggle,
};

/// Root view - pages own the stores they mount
enum Page {
  Home,
  Breeds(BreedPage),
  Favorites,
}

struct BreedPage {
  catalog: BreedCatalogStore,
  changes: watch::Receiver<BreedCatalogState>,
}

impl BreedPage {
  fn mount(services: &Services) -> Self {
    let catalog = services.breed_catalog();
    let changes = catalog.subscribe();
    Self { catalog, changes }
  }
}

/// Whether the store published a new state since the last look
fn seen_change<T>(changes: &mut watch::Receiver<T>) -> bool {
  let changed = changes.has_changed().unwrap_or(false);
  if changed {
    changes.borrow_and_update();
  }
  changed
}

/// One interactive browsing session.
///
/// Commands trigger store actions; completed requests are applied on each
/// tick and the current view is printed once nothing it shows is loading.
pub struct Session<W: Write> {
  services: Services,

  /// Random feed, also the home of the image detail view
  feed: ImageFeedStore,
  feed_changes: watch::Receiver<ImageFeedState>,

  favorites_changes: watch::Receiver<FavoritesState>,

  page: Page,

  /// The current view must be printed once it is ready
  dirty: bool,

  should_quit: bool,

  out: W,
}

impl<W: Write> Session<W> {
  pub fn new(services: Services, out: W) -> Self {
    let feed = services.image_feed();
    let feed_changes = feed.subscribe();
    let favorites_changes = services.favorites().subscribe();
    Self {
      services,
      feed,
      feed_changes,
      favorites_changes,
      page: Page::Home,
      dirty: true,
      should_quit: false,
      out,
    }
  }

  pub async fn run(&mut self, events: &mut EventHandler) -> Result<()> {
    writeln!(self.out, "catdex - type 'help' for a list of commands")?;

    while !self.should_quit {
      match events.next().await {
        Some(Event::Line(line)) => self.handle_line(&line)?,
        Some(Event::Tick) => self.on_tick()?,
        Some(Event::Eof) | None => break,
      }
    }

    // Favorite changes still in flight finish before the runtime goes away
    self.services.favorites_mut().settle().await;

    info!("session ended");
    Ok(())
  }

  fn handle_line(&mut self, line: &str) -> Result<()> {
    if line.trim().is_empty() {
      return Ok(());
    }

    match commands::parse(line) {
      Ok(action) => self.execute(action),
      Err(hint) => {
        writeln!(self.out, "{}", hint)?;
        Ok(())
      }
    }
  }

  fn execute(&mut self, action: Action) -> Result<()> {
    debug!(?action, "executing command");

    match action {
      Action::Home => {
        // Remount; requests still in flight for the old feed are discarded
        self.feed = self.services.image_feed();
        self.feed_changes = self.feed.subscribe();
        self.page = Page::Home;
      }
      Action::More => {
        self.feed.close_image();
        self.feed.load_images(true);
        self.page = Page::Home;
      }
      Action::Image(image_id) => {
        let loaded = self
          .feed
          .state()
          .images
          .iter()
          .find(|i| i.id == image_id)
          .cloned();
        match loaded {
          Some(image) => self.feed.select_image(image),
          None => self.feed.open_image(&image_id),
        }
      }
      Action::Close => self.feed.close_image(),
      Action::Breeds => {
        let mut page = self.take_breed_page();
        page.catalog.bind_selection(None);
        page.catalog.set_selected_breed(None);
        self.feed.close_image();
        self.page = Page::Breeds(page);
      }
      Action::Breed(breed_id) => {
        let mut page = self.take_breed_page();
        let state = page.catalog.state();
        if !state.breeds.is_empty() && state.find(&breed_id).is_none() {
          writeln!(self.out, "No breed with id {}", breed_id)?;
        }
        page.catalog.bind_selection(Some(&breed_id));
        self.feed.close_image();
        self.page = Page::Breeds(page);
      }
      Action::Favorites => {
        self.feed.close_image();
        self.page = Page::Favorites;
      }
      Action::Fav(image_id) => match self.services.favorites_mut().toggle(&image_id) {
        Toggle::Adding => writeln!(self.out, "Adding {} to favorites", image_id)?,
        Toggle::Removing { favorite_id } => {
          writeln!(self.out, "Removing favorite {}", favorite_id)?
        }
      },
      Action::Unfav(favorite_id) => {
        self.services.favorites_mut().remove(&favorite_id);
        writeln!(self.out, "Removing favorite {}", favorite_id)?;
      }
      Action::Refresh => self.services.favorites_mut().refresh(),
      Action::Help => {
        writeln!(self.out, "{}", commands::help())?;
        return Ok(());
      }
      Action::Quit => {
        self.should_quit = true;
        return Ok(());
      }
    }

    self.dirty = true;
    self.on_tick()
  }

  /// Keep the mounted breed catalog, or mount a fresh one
  fn take_breed_page(&mut self) -> BreedPage {
    match std::mem::replace(&mut self.page, Page::Home) {
      Page::Breeds(page) => page,
      _ => BreedPage::mount(&self.services),
    }
  }

  /// Apply completed requests and print the view if it changed.
  fn on_tick(&mut self) -> Result<()> {
    self.feed.poll();
    if let Page::Breeds(page) = &mut self.page {
      page.catalog.poll();
    }
    self.services.favorites_mut().poll();

    let feed_changed = seen_change(&mut self.feed_changes);
    let catalog_changed = match &mut self.page {
      Page::Breeds(page) => seen_change(&mut page.changes),
      _ => false,
    };
    let favorites_changed = seen_change(&mut self.favorites_changes);

    let relevant = if self.showing_image() {
      feed_changed || favorites_changed
    } else {
      match self.page {
        Page::Home => feed_changed || favorites_changed,
        Page::Breeds(_) => catalog_changed,
        Page::Favorites => favorites_changed,
      }
    };

    if (self.dirty || relevant) && !self.busy() {
      self.dirty = false;
      self.render()?;
    }
    Ok(())
  }

  fn showing_image(&self) -> bool {
    let feed = self.feed.state();
    feed.loading_image || feed.selected_image.is_some()
  }

  /// Whether the current view is waiting on a request
  fn busy(&self) -> bool {
    let feed = self.feed.state();
    if feed.loading_image {
      return true;
    }
    if feed.selected_image.is_some() {
      return false;
    }

    match &self.page {
      Page::Home => feed.loading,
      Page::Breeds(page) => {
        let state = page.catalog.state();
        state.loading_breeds || state.loading_images
      }
      Page::Favorites => self.services.favorites().state().loading,
    }
  }

  fn render(&mut self) -> Result<()> {
    let favorites = self.services.favorites().state();
    let text = match &self.feed.state().selected_image {
      Some(image) => render::image_detail(image, favorites),
      None => match &self.page {
        Page::Home => render::feed(self.feed.state(), favorites),
        Page::Breeds(page) => render::breeds(page.catalog.state()),
        Page::Favorites => render::favorites(favorites),
      },
    };

    write!(self.out, "\n{}", text)?;
    self.out.flush()?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{MemoryStorage, SessionCache};
  use crate::catalog::mock::{self, Call, MockCatalog};
  use crate::sink::RecordingSink;
  use std::io::Cursor;
  use std::sync::Arc;
  use std::time::Duration;

  fn session(api: &MockCatalog, sink: &Arc<RecordingSink>) -> Session<Vec<u8>> {
    let mut services = Services::new(
      Arc::new(api.clone()),
      SessionCache::new(MemoryStorage::new()),
    );
    services.register_error_sink(sink.clone());
    services.register_favorites();
    Session::new(services, Vec::new())
  }

  impl Session<Vec<u8>> {
    /// Wait for every mounted store, then tick
    async fn settle(&mut self) {
      self.feed.settle().await;
      if let Page::Breeds(page) = &mut self.page {
        page.catalog.settle().await;
      }
      self.services.favorites_mut().settle().await;
      self.on_tick().unwrap();
    }

    /// Everything printed so far, clearing the buffer
    fn take_output(&mut self) -> String {
      String::from_utf8(std::mem::take(&mut self.out)).unwrap()
    }
  }

  #[tokio::test]
  async fn test_home_feed_printed_once_loaded() {
    let api = MockCatalog::new();
    let sink = Arc::new(RecordingSink::new());
    api.queue_random_images(Ok(mock::batch("a", 10)));
    api.queue_favorites(Ok(vec![mock::favorite("f1", "a3")]));

    let mut session = session(&api, &sink);
    session.on_tick().unwrap();
    assert_eq!(session.take_output(), "");

    session.settle().await;
    let out = session.take_output();
    assert!(out.contains("Random cats (10)"));
    assert!(out.contains(" * a3 "));
  }

  #[tokio::test]
  async fn test_more_appends() {
    let api = MockCatalog::new();
    let sink = Arc::new(RecordingSink::new());
    api.queue_random_images(Ok(mock::batch("a", 10)));
    api.queue_random_images(Ok(mock::batch("b", 10)));

    let mut session = session(&api, &sink);
    session.settle().await;
    session.take_output();

    session.handle_line("more").unwrap();
    session.settle().await;
    assert!(session.take_output().contains("Random cats (20)"));
  }

  #[tokio::test]
  async fn test_breed_selection_from_command() {
    let api = MockCatalog::new();
    let sink = Arc::new(RecordingSink::new());
    api.queue_breeds(Ok(vec![
      mock::breed("abys", "Abyssinian"),
      mock::breed("beng", "Bengal"),
    ]));
    api.queue_breed_images(Ok(mock::batch("beng", 3)));

    let mut session = session(&api, &sink);
    session.settle().await;
    session.take_output();

    session.handle_line("breed beng").unwrap();
    session.settle().await;

    let out = session.take_output();
    assert!(out.contains("Bengal (beng)"));
    assert!(out.contains("Images (3)"));
    assert_eq!(api.count(|c| *c == Call::ListBreeds), 1);
    assert_eq!(
      api.count(|c| *c == Call::ListBreedImages("beng".to_string())),
      1
    );
  }

  #[tokio::test]
  async fn test_breeds_remount_uses_session_cache() {
    let api = MockCatalog::new();
    let sink = Arc::new(RecordingSink::new());
    api.queue_breeds(Ok(vec![mock::breed("abys", "Abyssinian")]));

    let mut session = session(&api, &sink);
    session.handle_line("breeds").unwrap();
    session.settle().await;
    session.handle_line("favorites").unwrap();
    session.handle_line("breeds").unwrap();
    session.settle().await;

    assert!(session.take_output().contains("Breeds (1)"));
    assert_eq!(api.count(|c| *c == Call::ListBreeds), 1);
  }

  #[tokio::test]
  async fn test_image_detail_and_close() {
    let api = MockCatalog::new();
    let sink = Arc::new(RecordingSink::new());
    api.queue_random_images(Ok(mock::batch("a", 10)));
    api.queue_image(Ok(mock::image("zzz")));

    let mut session = session(&api, &sink);
    session.settle().await;
    session.take_output();

    // Already in the feed: no request
    session.handle_line("image a1").unwrap();
    assert!(session.take_output().contains("Image a1"));
    assert_eq!(api.count(|c| matches!(c, Call::GetImage(_))), 0);

    session.handle_line("image zzz").unwrap();
    session.settle().await;
    assert!(session.take_output().contains("Image zzz"));
    assert_eq!(api.count(|c| matches!(c, Call::GetImage(_))), 1);

    session.handle_line("close").unwrap();
    assert!(session.take_output().contains("Random cats (10)"));
  }

  #[tokio::test]
  async fn test_fav_toggles() {
    let api = MockCatalog::new();
    let sink = Arc::new(RecordingSink::new());
    api.queue_favorites(Ok(vec![mock::favorite("f1", "img1")]));

    let mut session = session(&api, &sink);
    session.settle().await;
    session.take_output();

    session.handle_line("fav img1").unwrap();
    assert!(session.take_output().contains("Removing favorite f1"));
    session.settle().await;

    session.handle_line("fav img2").unwrap();
    assert!(session.take_output().contains("Adding img2 to favorites"));
    session.settle().await;

    assert!(api.calls().contains(&Call::DeleteFavorite("f1".to_string())));
    assert!(api.calls().contains(&Call::CreateFavorite("img2".to_string())));
  }

  #[tokio::test]
  async fn test_failures_go_to_sink_not_output() {
    let api = MockCatalog::new();
    let sink = Arc::new(RecordingSink::new());
    api.queue_random_images(Err(mock::failure("network down")));

    let mut session = session(&api, &sink);
    session.settle().await;

    assert_eq!(
      sink.latest(),
      Some("Failed to fetch images: network down".to_string())
    );
    assert!(session.take_output().contains("Random cats (0)"));
  }

  #[tokio::test]
  async fn test_unknown_command_and_quit() {
    let api = MockCatalog::new();
    let sink = Arc::new(RecordingSink::new());

    let mut session = session(&api, &sink);
    session.handle_line("purr").unwrap();
    assert!(session.take_output().contains("Unknown command: purr"));

    session.handle_line("q").unwrap();
    assert!(session.should_quit);
  }

  #[tokio::test]
  async fn test_changes_on_other_pages_do_not_reprint() {
    let api = MockCatalog::new();
    let sink = Arc::new(RecordingSink::new());
    api.queue_random_images_after(Duration::from_millis(30), Ok(mock::batch("a", 10)));

    let mut session = session(&api, &sink);
    session.services.favorites_mut().settle().await;
    session.handle_line("favorites").unwrap();
    assert!(session.take_output().contains("Favorites (0)"));

    session.feed.settle().await;
    session.on_tick().unwrap();
    assert_eq!(session.take_output(), "");
    assert_eq!(session.feed.state().images.len(), 10);
  }

  #[tokio::test]
  async fn test_quit_waits_for_pending_favorite_changes() {
    let api = MockCatalog::new();
    let sink = Arc::new(RecordingSink::new());
    api.queue_favorites(Ok(vec![mock::favorite("f1", "img1")]));
    api.queue_delete_after(Duration::from_millis(30), Ok(()));

    let mut session = session(&api, &sink);
    session.settle().await;

    let input = Cursor::new("unfav f1\nquit\n");
    let mut events = EventHandler::from_reader(input, Duration::from_millis(5));
    session.run(&mut events).await.unwrap();

    assert!(api.calls().contains(&Call::DeleteFavorite("f1".to_string())));
    assert!(session.services.favorites().state().favorites.is_empty());
    assert!(!session.services.favorites().state().is_removing("f1"));
  }
}
