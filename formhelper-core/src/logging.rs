//! src/logging.rs
//!
//! Optional tracing subscriber setup for hosts that do not install their own.
//! The crate itself only emits `tracing` events; calling [`LoggerBuilder::build`]
//! is never required.

use std::{
    path::{Component, Path, PathBuf},
    str::FromStr,
    sync::atomic::{AtomicBool, Ordering},
};

use anyhow::{Context, Result};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use tokio::fs as TokioFs;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, filter::Directive, fmt::time::ChronoLocal,
    layer::SubscriberExt, util::SubscriberInitExt,
};

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Write to rolling files in this directory; `None` writes to stderr
    pub log_dir: Option<PathBuf>,
    pub log_file_prefix: CompactString,
    pub log_level: CompactString,
    pub max_log_files: usize,
    pub rotation: LogRotation,
    /// Emit JSON lines instead of the human-readable format
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Never,
    Hourly,
    Daily,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            log_file_prefix: CompactString::const_new("formhelper"),
            log_level: CompactString::const_new("info"),
            max_log_files: 10,
            rotation: LogRotation::Daily,
            json: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Logger already initialized")]
    AlreadyInitialized,

    #[error("Invalid log directory: {0}")]
    InvalidLogDirectory(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

pub struct LoggerBuilder {
    config: LoggerConfig,
}

impl LoggerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: &str) -> Self {
        self.config.log_level = CompactString::new(level);
        self
    }

    /// Install the global subscriber. The returned guard must be kept alive
    /// for file output to be flushed.
    ///
    /// The init-once flag is only set after the subscriber is installed, so a
    /// failed attempt can be retried with a corrected config.
    pub async fn build(self) -> Result<Option<WorkerGuard>> {
        validate_config(&self.config)?;
        let directive: Directive = parse_level_directive(&self.config.log_level)?;

        if LOGGING_INITIALIZED.load(Ordering::SeqCst) {
            return Err(LoggingError::AlreadyInitialized.into());
        }

        let filter: EnvFilter = EnvFilter::from_default_env().add_directive(directive);

        let (layer, guard) = match &self.config.log_dir {
            Some(dir) => {
                setup_log_directory(dir).await?;

                let file_appender = RollingFileAppender::builder()
                    .rotation(rotation_of(self.config.rotation))
                    .filename_prefix(self.config.log_file_prefix.as_str())
                    .filename_suffix(if self.config.json { "jsonl" } else { "log" })
                    .max_log_files(self.config.max_log_files)
                    .build(dir)
                    .context("Failed to create file appender")?;

                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                let layer: BoxedLayer = if self.config.json {
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_timer(ChronoLocal::rfc_3339())
                        .with_writer(non_blocking)
                        .boxed()
                } else {
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_timer(ChronoLocal::rfc_3339())
                        .with_writer(non_blocking)
                        .boxed()
                };

                (layer, Some(guard))
            }
            None => {
                let layer: BoxedLayer = if self.config.json {
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_timer(ChronoLocal::rfc_3339())
                        .with_writer(std::io::stderr)
                        .boxed()
                } else {
                    tracing_subscriber::fmt::layer()
                        .with_timer(ChronoLocal::rfc_3339())
                        .with_writer(std::io::stderr)
                        .boxed()
                };

                (layer, None)
            }
        };

        tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init()
            .context("Failed to install global tracing subscriber")?;

        LOGGING_INITIALIZED.store(true, Ordering::SeqCst);

        Ok(guard)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

const fn rotation_of(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Never => Rotation::NEVER,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
    }
}

fn validate_config(config: &LoggerConfig) -> Result<()> {
    if config.log_file_prefix.trim().is_empty() {
        return Err(
            LoggingError::ConfigError("Log file prefix must not be empty".to_string()).into(),
        );
    }

    if config.max_log_files == 0 {
        return Err(
            LoggingError::ConfigError("Max log files must be greater than 0".to_string()).into(),
        );
    }

    parse_level_directive(&config.log_level)?;

    if let Some(dir) = &config.log_dir {
        validate_log_directory(dir)?;
    }

    Ok(())
}

fn parse_level_directive(level: &str) -> Result<Directive> {
    Directive::from_str(level).map_err(|e| {
        anyhow::Error::from(LoggingError::ConfigError(format!(
            "Invalid log level '{level}': {e}"
        )))
    })
}

fn validate_log_directory(path: &Path) -> Result<()> {
    if path.components().count() == 0 {
        return Err(LoggingError::InvalidLogDirectory("Empty path".to_string()).into());
    }

    if path.components().any(|c| c == Component::ParentDir) {
        return Err(LoggingError::InvalidLogDirectory(
            "Path contains parent directory references".to_string(),
        )
        .into());
    }

    Ok(())
}

async fn setup_log_directory(log_dir: &Path) -> Result<()> {
    TokioFs::create_dir_all(log_dir)
        .await
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))
}

pub async fn init_default_logging() -> Result<Option<WorkerGuard>> {
    LoggerBuilder::new().build().await
}

pub async fn init_logging_with_config(config: LoggerConfig) -> Result<Option<WorkerGuard>> {
    LoggerBuilder::new().with_config(config).build().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logging_error(result: Result<()>) -> LoggingError {
        result
            .unwrap_err()
            .downcast::<LoggingError>()
            .expect("expected a LoggingError")
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&LoggerConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let config = LoggerConfig {
            log_file_prefix: CompactString::const_new("  "),
            ..LoggerConfig::default()
        };

        assert!(matches!(
            logging_error(validate_config(&config)),
            LoggingError::ConfigError(_)
        ));
    }

    #[test]
    fn test_parent_dir_rejected() {
        let config = LoggerConfig {
            log_dir: Some(PathBuf::from("logs/../../etc")),
            ..LoggerConfig::default()
        };

        assert!(matches!(
            logging_error(validate_config(&config)),
            LoggingError::InvalidLogDirectory(_)
        ));
    }

    #[tokio::test]
    async fn test_invalid_config_does_not_claim_global_subscriber() {
        let config = LoggerConfig {
            max_log_files: 0,
            ..LoggerConfig::default()
        };

        assert!(init_logging_with_config(config).await.is_err());
        assert!(!LOGGING_INITIALIZED.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_bad_level_is_config_error() {
        let result = LoggerBuilder::new()
            .with_level("info=notalevel")
            .build()
            .await
            .map(|_| ());

        assert!(matches!(logging_error(result), LoggingError::ConfigError(_)));
        assert!(!LOGGING_INITIALIZED.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_failed_setup_leaves_logging_uninitialized() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let not_a_dir = temp_dir.path().join("occupied");
        std::fs::write(&not_a_dir, b"x").unwrap();

        let config = LoggerConfig {
            log_dir: Some(not_a_dir),
            ..LoggerConfig::default()
        };

        assert!(init_logging_with_config(config).await.is_err());
        assert!(!LOGGING_INITIALIZED.load(Ordering::SeqCst));
    }
}
