//! File logging. The terminal belongs to the UI, so tracing output goes to a
//! daily rolling file under the data directory instead of stdout.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config;

/// Install the global subscriber. The returned guard flushes pending lines on
/// drop and must live until the program exits. Returns `None` when no data
/// directory can be determined (logging is then disabled).
pub fn init_logging() -> Result<Option<WorkerGuard>> {
  let Some(log_dir) = config::data_dir().map(|dir| dir.join("logs")) else {
    return Ok(None);
  };
  std::fs::create_dir_all(&log_dir).with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

  let file_appender = tracing_appender::rolling::daily(&log_dir, "reelstack.log");
  let (writer, guard) = tracing_appender::non_blocking(file_appender);

  // Default to `reelstack=info` when RUST_LOG is not set.
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reelstack=info"));

  tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt::layer().with_writer(writer).with_ansi(false))
    .try_init()
    .context("Failed to install tracing subscriber")?;

  Ok(Some(guard))
}
