//! Channel session configuration.

use std::time::Duration;

/// Storage key the conversation identity is persisted under.
pub const DEFAULT_IDENTITY_KEY: &str = "conversationId";

/// Controls how a [`ChannelSession`](crate::use_cases::channel_session::ChannelSession)
/// behaves.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Key of the identity slot in the [`IdentityStore`](crate::ports::identity_store::IdentityStore).
    pub identity_key: String,
    /// Upper bound for one turn, applied by callers around `send_and_await`.
    ///
    /// The session itself never times out a turn.
    pub turn_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            identity_key: DEFAULT_IDENTITY_KEY.to_string(),
            turn_timeout: None,
        }
    }
}

impl SessionConfig {
    /// Creates a SessionConfig from an optional timeout in seconds.
    pub fn from_timeout_seconds(seconds: Option<u64>) -> Self {
        Self {
            turn_timeout: seconds.map(Duration::from_secs),
            ..Default::default()
        }
    }

    pub fn with_identity_key(mut self, key: impl Into<String>) -> Self {
        self.identity_key = key.into();
        self
    }
}
