//! Logging setup
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the binary. Logs go to stderr because stdout carries command output.

use std::env;
use std::fmt;
use std::io;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt as layer_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human readable, multi-field lines
    #[default]
    Pretty,
    /// Terse single-line output
    Compact,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error, or a full `EnvFilter` string)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Creates a configuration with the given level and format
    pub fn new(level: impl Into<String>, format: LogFormat) -> Self {
        Self {
            level: level.into(),
            format,
        }
    }

    /// Overrides level and format from `RUST_LOG` and `LOG_FORMAT` when set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = env::var("RUST_LOG") {
            self.level = level;
        }
        if let Some(format) = env::var("LOG_FORMAT").ok().and_then(|f| f.parse().ok()) {
            self.format = format;
        }
        self
    }

    /// Installs the global tracing subscriber.
    ///
    /// Returns an error if a subscriber is already installed.
    pub fn init(&self) -> Result<(), String> {
        let filter = EnvFilter::try_new(&self.level)
            .map_err(|e| format!("invalid log level '{}': {}", self.level, e))?;
        let registry = tracing_subscriber::registry().with(filter);

        let result = match self.format {
            LogFormat::Json => registry
                .with(layer_fmt::layer().json().with_target(true).with_writer(io::stderr))
                .try_init(),
            LogFormat::Pretty => registry
                .with(layer_fmt::layer().with_target(true).with_writer(io::stderr))
                .try_init(),
            LogFormat::Compact => registry
                .with(
                    layer_fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(io::stderr),
                )
                .try_init(),
        };

        result.map_err(|e| format!("failed to install log subscriber: {}", e))
    }
}
