//! Logging setup for providers
//!
//! Terraform reads the plugin handshake from stdout, so logs always go to
//! stderr. The level follows `TF_LOG_PROVIDER`, then `TF_LOG`, the same
//! variables Terraform uses to configure provider logging.

use crate::error::{Result, TfplugError};
use tracing::level_filters::LevelFilter;

/// Log level for the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Parses Terraform's log level names, case-insensitively.
    /// `JSON` is Terraform's alias for trace output.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TRACE" | "JSON" => Some(LogLevel::Trace),
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARN" => Some(LogLevel::Warn),
            "ERROR" => Some(LogLevel::Error),
            "OFF" => Some(LogLevel::Off),
            _ => None,
        }
    }

    /// Reads `TF_LOG_PROVIDER`, then `TF_LOG`; defaults to `Info`
    pub fn from_env() -> Self {
        ["TF_LOG_PROVIDER", "TF_LOG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find_map(|value| Self::parse(&value))
            .unwrap_or(LogLevel::Info)
    }

    fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

/// Installs a global fmt subscriber writing to stderr.
///
/// Libraries built on this crate never call it themselves. The plugin
/// binary that serves a provider calls it once at startup, before the
/// handshake, usually as `init_logging(LogLevel::from_env())`.
/// Fails if a global subscriber is already installed.
pub fn init_logging(level: LogLevel) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(level.as_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| TfplugError::LoggingError(e.to_string()))
}
