//! Error types for the feed pipeline

use thiserror::Error;

/// Result type alias for the pipeline
pub type Result<T> = std::result::Result<T, FeedError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum FeedError {
    /// Configuration errors, fatal at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Queue transport errors, retried by the worker loop
    #[error("Queue error: {0}")]
    Queue(#[from] redis::RedisError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Per-record transform errors, counted but never fatal to a batch
    #[error("Transform error: {0}")]
    Transform(String),

    /// Lifecycle misuse and shutdown join failures
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),
}

/// Helper functions for creating specific errors
impl FeedError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn transform<S: Into<String>>(message: S) -> Self {
        Self::Transform(message.into())
    }

    pub fn lifecycle<S: Into<String>>(message: S) -> Self {
        Self::Lifecycle(message.into())
    }
}
