//! Configuration file loading for reentry-chat
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `REENTRY_CHAT_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./reentry-chat.toml` or `./.reentry-chat.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/reentry-chat/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileEndpointConfig, FileLoggingConfig, FileProfileConfig,
    FileSessionConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
