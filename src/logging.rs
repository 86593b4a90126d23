use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Registry,
    Layer,
};

use crate::error::{TableError, TableResult};

/// Logging configuration for CHONKER table extraction
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: PathBuf,
    /// Only honoured with the `advanced_logging` feature
    pub enable_file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            enable_file_logging: false,
        }
    }
}

/// Keeps the non-blocking file writer alive; drop it last.
pub struct LoggingGuard {
    #[cfg(feature = "advanced_logging")]
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Build the `RUST_LOG`-overridable filter, defaulting to this crate at `level`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chonker_tables={},lopdf=warn,{}", level, level)))
}

/// Initialize the logging system
pub fn init_logging(config: &LoggingConfig) -> TableResult<LoggingGuard> {
    let registry = Registry::default().with(env_filter(&config.level));

    // Console logging goes to stderr so stdout stays clean for table output
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .boxed();

    #[cfg(feature = "advanced_logging")]
    let guard = {
        if config.enable_file_logging {
            std::fs::create_dir_all(&config.log_dir).map_err(|e| {
                TableError::file_io(config.log_dir.to_string_lossy().to_string(), e)
            })?;
            let file_appender = tracing_appender::rolling::daily(&config.log_dir, "chonker-tables.log");
            let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer().with_writer(file_writer).with_ansi(false).boxed();

            registry
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .map_err(|e| TableError::configuration(format!("logging already initialized: {}", e)))?;
            LoggingGuard { _file_guard: Some(file_guard) }
        } else {
            registry
                .with(console_layer)
                .try_init()
                .map_err(|e| TableError::configuration(format!("logging already initialized: {}", e)))?;
            LoggingGuard { _file_guard: None }
        }
    };

    #[cfg(not(feature = "advanced_logging"))]
    let guard = {
        if config.enable_file_logging {
            eprintln!("File logging requires the `advanced_logging` feature; logging to stderr only");
        }
        registry
            .with(console_layer)
            .try_init()
            .map_err(|e| TableError::configuration(format!("logging already initialized: {}", e)))?;
        LoggingGuard {}
    };

    info!("🐹 CHONKER table logging initialized");
    info!("Log level: {}", config.level);

    Ok(guard)
}

/// Performance logging utilities
pub struct PerformanceTimer {
    start: std::time::Instant,
    operation: String,
}

impl PerformanceTimer {
    pub fn start(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        info!("⏱️  Starting: {}", operation);
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    pub fn checkpoint(&self, checkpoint: &str) {
        let elapsed = self.start.elapsed();
        info!("⏱️  {} - {}: {}ms", self.operation, checkpoint, elapsed.as_millis());
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for PerformanceTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        info!("⏱️  Completed {}: {}ms", self.operation, elapsed.as_millis());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.enable_file_logging);
    }

    #[test]
    fn test_timer_measures_elapsed() {
        let timer = PerformanceTimer::start("unit test");
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(timer.elapsed_ms() >= 1);
    }
}
