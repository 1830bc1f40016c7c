//! Log and span subscriber setup for the binaries

use crate::config::Settings;
use crate::utils::error::{FeedError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured log level. Setting
/// `FEED_LOG_JSON` switches the output to JSON lines.
pub fn init(settings: &Settings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    let result = if std::env::var("FEED_LOG_JSON").is_ok() {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| FeedError::config(format!("Failed to install log subscriber: {}", e)))
}
