//! Log configuration

use serde::{Deserialize, Serialize};

/// Default filter used when neither `RUST_LOG` nor an explicit filter is set
pub const DEFAULT_FILTER: &str = "warn,dashboard_client=info,dashboard_cli=info";

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, one event per line
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Logging configuration shared by the workspace binaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive string, e.g. `"info,dashboard_client=debug"`
    pub filter: String,
    /// Line format
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Override the filter directive
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Switch to JSON output
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }
}
