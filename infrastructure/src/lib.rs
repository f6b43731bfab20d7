//! Infrastructure layer for reentry-chat
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod identity;
pub mod logging;
pub mod transport;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileEndpointConfig, FileLoggingConfig,
    FileProfileConfig, FileSessionConfig,
};
pub use identity::FileIdentityStore;
pub use logging::JsonlConversationLogger;
pub use transport::{ScriptedTransport, TcpTransport};
