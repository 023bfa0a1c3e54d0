//! File logging. The terminal belongs to the UI, so logs go to
//! `<data dir>/noted/logs/noted.log.<date>`.

use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "noted=info";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default filter. The returned guard flushes
/// buffered lines when dropped and must be held for the life of the program.
pub fn init() -> Result<WorkerGuard> {
  let dir = log_dir()?;
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(&dir, "noted.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(writer).with_ansi(false))
    .with(env_filter())
    .try_init()
    .map_err(|e| eyre!("Failed to install logger: {}", e))?;

  Ok(guard)
}

fn env_filter() -> EnvFilter {
  EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn log_dir() -> Result<PathBuf> {
  dirs::data_dir()
    .map(|d| d.join("noted").join("logs"))
    .ok_or_else(|| eyre!("Could not determine data directory"))
}
