use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

const DEFAULT_FILTER: &str = "catdex=info";
const VERBOSE_FILTER: &str = "catdex=debug";

/// Pick the log filter: CATDEX_LOG, then --verbose, then config, then default
fn filter_directive(config: &Config, verbose: bool, env: Option<String>) -> String {
  if let Some(directive) = env.filter(|d| !d.trim().is_empty()) {
    return directive;
  }
  if verbose {
    return VERBOSE_FILTER.to_string();
  }
  config
    .log
    .filter
    .clone()
    .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Route tracing output to a daily rolling file under the log directory.
///
/// The returned guard flushes buffered lines on drop and must be held until
/// exit.
pub fn init(config: &Config, verbose: bool) -> Result<WorkerGuard> {
  let directory = config.log_directory()?;
  std::fs::create_dir_all(&directory)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", directory.display(), e))?;

  let directive = filter_directive(config, verbose, std::env::var("CATDEX_LOG").ok());
  let filter = EnvFilter::try_new(&directive)
    .map_err(|e| eyre!("Invalid log filter '{}': {}", directive, e))?;

  let appender = tracing_appender::rolling::daily(&directory, "catdex.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .with_target(false)
    .try_init()
    .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;

  Ok(guard)
}
