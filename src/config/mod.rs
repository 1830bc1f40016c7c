//! Runtime settings for the feed pipeline
//!
//! One flat [`Settings`] struct covers everything the binaries, the queue
//! client, and the processor need. Values come from defaults, an optional
//! YAML file, and `FEED_`-prefixed environment variables, in that order.
//! Instances are plain values passed by reference; nothing here is global.

use crate::utils::error::{FeedError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Upper bound for the float-second intervals, in seconds
const MAX_INTERVAL_SECS: f64 = 3600.0;

/// Log verbosity used when `RUST_LOG` is unset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(FeedError::config(format!("Unknown log level: {}", other))),
        }
    }
}

/// Settings for the queue client, the processor, and the binaries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Name of the Redis list the feed drains
    #[serde(default = "default_queue_name")]
    pub queue_name: String,
    /// Maximum number of records pulled per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Seconds a dequeue blocks waiting for the first record
    #[serde(default = "default_dequeue_timeout")]
    pub dequeue_timeout: f64,
    /// Number of worker loops sharing the queue
    #[serde(default = "default_worker_concurrency")]
    pub worker_concurrency: usize,
    /// Size of the record-processing pool shared by all workers
    #[serde(default = "default_processing_workers")]
    pub processing_workers: usize,
    /// Seconds a worker pauses after each processed batch (0 disables)
    #[serde(default = "default_flush_interval")]
    pub flush_interval: f64,
    /// Advisory cap on batches waiting behind the processing pool
    #[serde(default = "default_max_pending_batches")]
    pub max_pending_batches: usize,
    /// Emit batch spans and propagate trace ids
    #[serde(default = "default_true")]
    pub tracing_enabled: bool,
    /// Log verbosity when `RUST_LOG` is unset
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            queue_name: default_queue_name(),
            batch_size: default_batch_size(),
            dequeue_timeout: default_dequeue_timeout(),
            worker_concurrency: default_worker_concurrency(),
            processing_workers: default_processing_workers(),
            flush_interval: default_flush_interval(),
            max_pending_batches: default_max_pending_batches(),
            tracing_enabled: true,
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file, then layer environment overrides
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading settings from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FeedError::config(format!("Failed to read settings file: {}", e)))?;

        let mut settings: Settings = serde_yaml::from_str(&content)
            .map_err(|e| FeedError::config(format!("Failed to parse settings: {}", e)))?;

        settings.apply_env_overrides()?;
        settings.validate()?;

        debug!("Settings loaded successfully");
        Ok(settings)
    }

    /// Load settings from defaults plus environment overrides
    pub fn from_env() -> Result<Self> {
        debug!("Loading settings from environment variables");

        let mut settings = Self::default();
        settings.apply_env_overrides()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `FEED_`-prefixed environment variables on top of `self`
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = env::var("FEED_REDIS_URL") {
            self.redis_url = url;
        }
        if let Ok(name) = env::var("FEED_QUEUE_NAME") {
            self.queue_name = name;
        }
        if let Ok(batch_size) = env::var("FEED_BATCH_SIZE") {
            self.batch_size = batch_size
                .parse()
                .map_err(|e| FeedError::config(format!("Invalid FEED_BATCH_SIZE: {}", e)))?;
        }
        if let Ok(timeout) = env::var("FEED_DEQUEUE_TIMEOUT") {
            self.dequeue_timeout = timeout
                .parse()
                .map_err(|e| FeedError::config(format!("Invalid FEED_DEQUEUE_TIMEOUT: {}", e)))?;
        }
        if let Ok(workers) = env::var("FEED_WORKER_CONCURRENCY") {
            self.worker_concurrency = workers
                .parse()
                .map_err(|e| FeedError::config(format!("Invalid FEED_WORKER_CONCURRENCY: {}", e)))?;
        }
        if let Ok(workers) = env::var("FEED_PROCESSING_WORKERS") {
            self.processing_workers = workers
                .parse()
                .map_err(|e| FeedError::config(format!("Invalid FEED_PROCESSING_WORKERS: {}", e)))?;
        }
        if let Ok(interval) = env::var("FEED_FLUSH_INTERVAL") {
            self.flush_interval = interval
                .parse()
                .map_err(|e| FeedError::config(format!("Invalid FEED_FLUSH_INTERVAL: {}", e)))?;
        }
        if let Ok(pending) = env::var("FEED_MAX_PENDING_BATCHES") {
            self.max_pending_batches = pending
                .parse()
                .map_err(|e| FeedError::config(format!("Invalid FEED_MAX_PENDING_BATCHES: {}", e)))?;
        }
        if let Ok(enabled) = env::var("FEED_TRACING_ENABLED") {
            self.tracing_enabled = enabled
                .parse()
                .map_err(|e| FeedError::config(format!("Invalid FEED_TRACING_ENABLED: {}", e)))?;
        }
        if let Ok(level) = env::var("FEED_LOG_LEVEL") {
            self.log_level = level.parse()?;
        }
        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        debug!("Validating settings");

        if self.redis_url.is_empty() {
            return Err(FeedError::config("Redis URL cannot be empty"));
        }
        if self.queue_name.is_empty() {
            return Err(FeedError::config("Queue name cannot be empty"));
        }
        if self.batch_size == 0 {
            return Err(FeedError::config("Batch size cannot be 0"));
        }
        if self.worker_concurrency == 0 {
            return Err(FeedError::config("Worker concurrency cannot be 0"));
        }
        if self.processing_workers == 0 {
            return Err(FeedError::config("Processing workers cannot be 0"));
        }
        if self.max_pending_batches == 0 {
            return Err(FeedError::config("Max pending batches cannot be 0"));
        }
        // A non-positive timeout would turn the blocking pop into a
        // wait-forever call on the Redis side.
        if !self.dequeue_timeout.is_finite() || self.dequeue_timeout <= 0.0 {
            return Err(FeedError::config(
                "Dequeue timeout must be a positive number of seconds",
            ));
        }
        if self.dequeue_timeout > MAX_INTERVAL_SECS {
            return Err(FeedError::config(format!(
                "Dequeue timeout cannot exceed {} seconds",
                MAX_INTERVAL_SECS
            )));
        }
        if !self.flush_interval.is_finite() || self.flush_interval < 0.0 {
            return Err(FeedError::config("Flush interval cannot be negative"));
        }
        if self.flush_interval > MAX_INTERVAL_SECS {
            return Err(FeedError::config(format!(
                "Flush interval cannot exceed {} seconds",
                MAX_INTERVAL_SECS
            )));
        }

        Ok(())
    }

    // max and min rather than clamp: clamp passes NaN through, and
    // from_secs_f64 panics on it.

    /// Blocking dequeue timeout as a [`Duration`] (out-of-range values are clamped)
    pub fn dequeue_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.dequeue_timeout.max(0.0).min(MAX_INTERVAL_SECS))
    }

    /// Pause between processed batches as a [`Duration`] (out-of-range values are clamped)
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs_f64(self.flush_interval.max(0.0).min(MAX_INTERVAL_SECS))
    }
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_queue_name() -> String {
    "feed:inbound".to_string()
}

fn default_batch_size() -> usize {
    50
}

fn default_dequeue_timeout() -> f64 {
    1.0
}

fn default_worker_concurrency() -> usize {
    4
}

fn default_processing_workers() -> usize {
    num_cpus::get()
}

fn default_flush_interval() -> f64 {
    0.1
}

fn default_max_pending_batches() -> usize {
    8
}

fn default_true() -> bool {
    true
}
