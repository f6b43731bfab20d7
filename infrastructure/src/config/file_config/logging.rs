//! Logging settings from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// `tracing` filter used when no `-v` flag is given (e.g. "info")
    pub level: Option<String>,
    /// Write a JSONL transcript of every turn to this path
    pub transcript: Option<String>,
}
