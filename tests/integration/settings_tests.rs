//! Settings loading and validation tests

#[cfg(test)]
mod tests {
    use feedflow::{LogLevel, Settings};
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// The library defaults describe a runnable pipeline
    #[test]
    fn test_defaults_are_sane() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.redis_url, "redis://localhost:6379");
        assert_eq!(settings.queue_name, "feed:inbound");
        assert_eq!(settings.log_level, LogLevel::Info);
        assert!(settings.tracing_enabled);
        assert!(settings.processing_workers > 0);
    }

    /// A full YAML file drives every recognized option
    #[tokio::test]
    async fn test_from_file_overrides_defaults() {
        let settings_content = r#"
queue_name: "feed:articles"
batch_size: 25
dequeue_timeout: 0.75
worker_concurrency: 3
processing_workers: 5
max_pending_batches: 16
tracing_enabled: false
log_level: "warn"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(settings_content.as_bytes()).unwrap();

        let settings = Settings::from_file(temp_file.path()).await.unwrap();

        assert_eq!(settings.queue_name, "feed:articles");
        assert_eq!(settings.batch_size, 25);
        assert_eq!(settings.dequeue_timeout, 0.75);
        assert_eq!(settings.worker_concurrency, 3);
        assert_eq!(settings.processing_workers, 5);
        assert_eq!(settings.max_pending_batches, 16);
        assert!(!settings.tracing_enabled);
        assert_eq!(settings.log_level, LogLevel::Warn);
    }

    /// Missing fields fall back to the defaults
    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"queue_name: \"feed:partial\"\n")
            .unwrap();

        let settings = Settings::from_file(temp_file.path()).await.unwrap();
        assert_eq!(settings.queue_name, "feed:partial");
        assert_eq!(settings.batch_size, 50);
        assert_eq!(settings.dequeue_timeout, 1.0);
    }

    /// A file that validates as YAML but fails the settings checks is rejected
    #[tokio::test]
    async fn test_invalid_values_rejected_at_load() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"batch_size: 0\n").unwrap();

        let result = Settings::from_file(temp_file.path()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Batch size"));
    }

    /// Environment variables override file and default values
    #[tokio::test]
    async fn test_env_layering() {
        // This test owns FEED_REDIS_URL and FEED_FLUSH_INTERVAL; no other
        // test in this binary touches them.
        unsafe {
            std::env::set_var("FEED_REDIS_URL", "redis://layered:6379");
            std::env::set_var("FEED_FLUSH_INTERVAL", "0.5");
        }

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"redis_url: \"redis://from-file:6379\"\n")
            .unwrap();

        let settings = Settings::from_file(temp_file.path()).await.unwrap();
        assert_eq!(settings.redis_url, "redis://layered:6379");
        assert_eq!(settings.flush_interval, 0.5);

        unsafe {
            std::env::remove_var("FEED_REDIS_URL");
            std::env::remove_var("FEED_FLUSH_INTERVAL");
        }
    }
}
