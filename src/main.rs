mod cache;
mod catalog;
mod commands;
mod config;
mod event;
mod logging;
mod render;
mod services;
mod session;
mod sink;
mod store;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::cache::{MemoryStorage, NoopStorage, SessionCache};
use crate::catalog::CatClient;
use crate::services::Services;
use crate::sink::ConsoleSink;

#[derive(Parser, Debug)]
#[command(name = "catdex")]
#[command(about = "Browse cat breeds, random cats and your favorites from TheCatAPI")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/catdex/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// TheCatAPI key (default: $CATDEX_API_KEY or $CAT_API_KEY)
  #[arg(short = 'k', long)]
  api_key: Option<String>,

  /// Log at debug level
  #[arg(short, long)]
  verbose: bool,

  /// Do not cache the breed list for the session
  #[arg(long)]
  no_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config, args.verbose)?;

  let api_key = args.api_key.or_else(config::Config::get_api_key);
  info!(
    base_url = %config.api.base_url,
    authenticated = api_key.is_some(),
    "starting session"
  );

  let client = CatClient::new(&config, api_key.as_deref())?;
  let cache = if args.no_cache {
    SessionCache::new(NoopStorage)
  } else {
    SessionCache::new(MemoryStorage::new())
  };

  let mut services = Services::new(Arc::new(client), cache);
  services.register_error_sink(Arc::new(ConsoleSink));
  services.register_favorites();

  let mut events = event::EventHandler::new(Duration::from_millis(100));
  let mut session = session::Session::new(services, std::io::stdout());
  session.run(&mut events).await?;

  Ok(())
}
