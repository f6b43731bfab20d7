//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application/domain types
//! at the edges.

mod endpoint;
mod logging;
mod profile;
mod session;

pub use endpoint::FileEndpointConfig;
pub use logging::FileLoggingConfig;
pub use profile::FileProfileConfig;
pub use session::FileSessionConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("endpoint.host cannot be empty")]
    EmptyHost,

    #[error("endpoint.port cannot be 0")]
    InvalidPort,

    #[error("session.turn_timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("session.identity_key cannot be empty")]
    EmptyIdentityKey,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Chat backend location
    pub endpoint: FileEndpointConfig,
    /// Channel session behaviour
    pub session: FileSessionConfig,
    /// Diagnostics and transcript
    pub logging: FileLoggingConfig,
    /// User profile sent with each turn
    pub profile: FileProfileConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.endpoint.host.trim().is_empty() {
            return Err(ConfigValidationError::EmptyHost);
        }
        if self.endpoint.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }
        if let Some(0) = self.session.turn_timeout_seconds {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.session.identity_key.trim().is_empty() {
            return Err(ConfigValidationError::EmptyIdentityKey);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[endpoint]
host = "chat.example.org"
port = 9000

[session]
identity_key = "chatId"
identity_file = "/tmp/reentry/identity.json"
turn_timeout_seconds = 45

[logging]
level = "debug"
transcript = "/tmp/reentry/transcript.jsonl"

[profile]
county = "Alameda"
release_date = "2024-03-01"
age_18_plus = true
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.endpoint.address(), "chat.example.org:9000");
        assert_eq!(config.session.identity_key, "chatId");
        assert_eq!(config.logging.level.as_deref(), Some("debug"));

        let session = config.session.to_session_config();
        assert_eq!(session.turn_timeout, Some(Duration::from_secs(45)));
        assert_eq!(session.identity_key, "chatId");

        let info = config.profile.to_user_info().unwrap();
        assert_eq!(info.county.as_deref(), Some("Alameda"));
        assert_eq!(info.age_18_plus, Some(true));
        assert!(info.email.is_none());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[endpoint]
port = 9001
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.endpoint.port, 9001);
        // Defaults should apply
        assert_eq!(config.endpoint.host, "127.0.0.1");
        assert_eq!(config.session.identity_key, "conversationId");
        assert_eq!(config.session.turn_timeout_seconds, Some(120));
        assert!(config.logging.transcript.is_none());
    }

    #[test]
    fn test_blank_profile_sends_no_user_info() {
        let toml_str = r#"
[profile]
county = "  "
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.profile.to_user_info().is_none());
        assert!(FileConfig::default().profile.to_user_info().is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(FileConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = [
            ("[endpoint]\nhost = \"\"", ConfigValidationError::EmptyHost),
            ("[endpoint]\nport = 0", ConfigValidationError::InvalidPort),
            (
                "[session]\nturn_timeout_seconds = 0",
                ConfigValidationError::InvalidTimeout,
            ),
            (
                "[session]\nidentity_key = \" \"",
                ConfigValidationError::EmptyIdentityKey,
            ),
        ];
        for (toml_str, expected) in cases {
            let config: FileConfig = toml::from_str(toml_str).unwrap();
            assert_eq!(config.validate(), Err(expected));
        }
    }
}
