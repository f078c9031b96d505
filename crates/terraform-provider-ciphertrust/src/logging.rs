//! Logging setup for the provider process
//!
//! Terraform captures the provider's stderr and shows it when `TF_LOG` is
//! enabled, while stdout is reserved for the plugin handshake. Events go to
//! stderr and, when `CM_LOG_DIR` is set, to a rolling file as well. The file
//! rolls daily unless `CM_LOG_ROTATION` says `hourly` or `never`.
//!
//! The level comes from `CM_LOG`, then `RUST_LOG`, then Terraform's
//! `TF_LOG_PROVIDER`, defaulting to `info`.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

pub const LOG_FILE_NAME: &str = "terraform-provider-ciphertrust.log";

const LEVEL_VARS: &[&str] = &["CM_LOG", "RUST_LOG", "TF_LOG_PROVIDER"];
const LOG_DIR_VAR: &str = "CM_LOG_DIR";
const ROTATION_VAR: &str = "CM_LOG_ROTATION";
const DEFAULT_LEVEL: &str = "info";

/// Log rotation policy for the optional log file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    Daily,
    Hourly,
    Never,
}

impl LogRotation {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "hourly" => Some(Self::Hourly),
            "never" => Some(Self::Never),
            _ => None,
        }
    }
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `ciphertrust_client=debug`
    pub level: String,
    /// Directory for the log file; no file logging when unset
    pub log_dir: Option<PathBuf>,
    pub rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            log_dir: None,
            rotation: LogRotation::Daily,
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let level = LEVEL_VARS
            .iter()
            .filter_map(|key| lookup(key))
            .map(|v| v.trim().to_lowercase())
            .find(|v| !v.is_empty())
            // Terraform's JSON level has no tracing equivalent
            .map(|v| if v == "json" { "trace".to_string() } else { v })
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string());

        let log_dir = lookup(LOG_DIR_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let rotation = lookup(ROTATION_VAR)
            .and_then(|v| LogRotation::parse(&v))
            .unwrap_or(LogRotation::Daily);

        Self {
            level,
            log_dir,
            rotation,
        }
    }
}

/// Keeps the file writer alive; dropping it flushes buffered output
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, Box<dyn std::error::Error>> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_filter(EnvFilter::new(&config.level));
    layers.push(Box::new(stderr_layer));

    let mut file_guard = None;
    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)?;
        let appender = RollingFileAppender::new(config.rotation.into(), log_dir, LOG_FILE_NAME);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        file_guard = Some(guard);

        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true)
            .with_filter(EnvFilter::new(&config.level));
        layers.push(Box::new(file_layer));
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))?;

    if let Some(log_dir) = &config.log_dir {
        tracing::debug!(log_dir = %log_dir.display(), "File logging initialized");
    }

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_level() {
        let config = LoggingConfig::from_lookup(lookup(&[]));
        assert_eq!(config.level, "info");
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_level_precedence() {
        let config = LoggingConfig::from_lookup(lookup(&[
            ("TF_LOG_PROVIDER", "TRACE"),
            ("RUST_LOG", "warn"),
        ]));
        assert_eq!(config.level, "warn");

        let config = LoggingConfig::from_lookup(lookup(&[("TF_LOG_PROVIDER", "DEBUG")]));
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_log_dir() {
        let config = LoggingConfig::from_lookup(lookup(&[("CM_LOG_DIR", "/tmp/cm-logs")]));
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/cm-logs")));
        assert_eq!(config.rotation, LogRotation::Daily);
    }

    #[test]
    fn test_log_rotation_from_env() {
        let config = LoggingConfig::from_lookup(lookup(&[("CM_LOG_ROTATION", " Hourly ")]));
        assert_eq!(config.rotation, LogRotation::Hourly);

        let config = LoggingConfig::from_lookup(lookup(&[("CM_LOG_ROTATION", "never")]));
        assert_eq!(config.rotation, LogRotation::Never);

        let config = LoggingConfig::from_lookup(lookup(&[("CM_LOG_ROTATION", "weekly")]));
        assert_eq!(config.rotation, LogRotation::Daily);
    }

    #[test]
    fn test_log_rotation_conversion() {
        assert!(matches!(Rotation::from(LogRotation::Daily), Rotation::DAILY));
        assert!(matches!(Rotation::from(LogRotation::Hourly), Rotation::HOURLY));
        assert!(matches!(Rotation::from(LogRotation::Never), Rotation::NEVER));
    }
}
