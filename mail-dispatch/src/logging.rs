//! Tracing subscriber setup for the binary

use crate::config::LoggingConfig;
use crate::error::{MailError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber described by `config`
///
/// `RUST_LOG` takes precedence over the configured level when set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| MailError::Config(format!("Invalid log level {}: {}", config.level, e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match config.format.as_str() {
        "json" => builder.json().try_init(),
        "compact" => builder.compact().try_init(),
        "pretty" => builder.pretty().try_init(),
        other => {
            return Err(MailError::Config(format!("Unknown log format: {}", other)));
        }
    };

    installed.map_err(|e| MailError::Config(format!("Failed to set tracing subscriber: {}", e)))
}
