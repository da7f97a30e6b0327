//! Logging setup
//!
//! The service recognises five levels: `info`, `warn`, `error`, `critical`
//! and `debug`. Anything else falls back to `error`. `critical` has no
//! tracing counterpart and filters like `error`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Info,
    Warn,
    #[default]
    Error,
    Critical,
    Debug,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level '{0}'")]
pub struct UnknownLogLevel(pub String);

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
            LogLevel::Debug => "debug",
        }
    }

    /// Parse a level, falling back to [`LogLevel::Error`] for unknown input
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    pub fn tracing_level(self) -> Level {
        match self {
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error | LogLevel::Critical => Level::ERROR,
            LogLevel::Debug => Level::DEBUG,
        }
    }

    /// Filter directive used when `RUST_LOG` is not set
    pub fn filter_directive(self) -> String {
        let level = match self {
            LogLevel::Critical => LogLevel::Error.as_str(),
            other => other.as_str(),
        }
        .to_string();
        if self == LogLevel::Debug {
            // sqlx logs every statement at debug
            format!("{level},sqlx=warn")
        } else {
            level
        }
    }
}

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            "debug" => Ok(LogLevel::Debug),
            _ => Err(UnknownLogLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(LogLevel::parse_lenient(&raw))
    }
}

/// Initialize tracing/logging
///
/// `RUST_LOG` takes precedence over the configured level. Debug level adds
/// source file, line and target to every record.
pub fn init_tracing(level: LogLevel, json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.filter_directive()));
    let verbose = level == LogLevel::Debug;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_file(verbose)
                    .with_line_number(verbose),
            )
            .init();
    } else {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(verbose)
                    .with_file(verbose)
                    .with_line_number(verbose),
            )
            .init();
    }
}
