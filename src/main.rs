//! Feedflow - asynchronous feed-ingestion batch processor
//!
//! Drains a Redis-backed feed queue through bounded worker pools until
//! stopped by Ctrl-C or SIGTERM. Settings come from `FEED_`-prefixed
//! environment variables, or from a YAML file when `FEED_CONFIG` is set.

#![allow(missing_docs)]

use feedflow::{FeedService, Settings, telemetry};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Print error using Display (not Debug) to preserve newlines
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = match std::env::var("FEED_CONFIG") {
        Ok(path) => Settings::from_file(&path).await?,
        Err(_) => Settings::from_env()?,
    };

    telemetry::init(&settings)?;

    let service = FeedService::new(&settings).await?;
    service.run().await?;
    Ok(())
}
