//! Channel session settings from TOML (`[session]` section)

use reentry_application::config::{DEFAULT_IDENTITY_KEY, SessionConfig};
use serde::{Deserialize, Serialize};

/// Raw session configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Key the conversation id is stored under
    pub identity_key: String,
    /// Path of the identity file (defaults to the platform data directory)
    pub identity_file: Option<String>,
    /// Upper bound for one turn, in seconds
    pub turn_timeout_seconds: Option<u64>,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            identity_key: DEFAULT_IDENTITY_KEY.to_string(),
            identity_file: None,
            turn_timeout_seconds: Some(120),
        }
    }
}

impl FileSessionConfig {
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig::from_timeout_seconds(self.turn_timeout_seconds)
            .with_identity_key(self.identity_key.clone())
    }
}
