//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
#[derive(Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Tracing filter directive scoped to the Movi crates.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "movi=trace",
            LogLevel::Debug => "movi=debug",
            LogLevel::Info => "movi=info",
            LogLevel::Warning => "movi=warn",
            LogLevel::Error => "movi=error",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}
