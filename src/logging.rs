use std::str::FromStr;

use tracing::metadata::LevelFilter;
use tracing::Level;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogConfig, LogFormat};
use crate::error::{RetentionError, Result};

/// Install the global tracing subscriber.
///
/// Logs go to stderr so stdout stays free for the run summary. When
/// `RUST_LOG` is set it replaces the configured level entirely.
pub fn init(config: &LogConfig, verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { config.level };

    let (json, plain) = match config.format {
        LogFormat::Json => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .json(),
            ),
            None,
        ),
        LogFormat::Human => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            ),
        ),
    };

    let env_filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => Some(
            EnvFilter::from_str(&directives)
                .map_err(|e| RetentionError::config(format!("invalid RUST_LOG: {}", e)))?,
        ),
        Err(_) => None,
    };

    let targets_filter = if env_filter.is_some() {
        None
    } else {
        Some(
            filter::Targets::new()
                .with_target("tag_retention", level)
                .with_default(LevelFilter::WARN),
        )
    };

    tracing_subscriber::registry()
        .with(json)
        .with(plain)
        .with(targets_filter)
        .with(env_filter)
        .try_init()
        .map_err(|e| RetentionError::config(format!("cannot install logger: {}", e)))
}
