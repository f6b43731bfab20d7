//! Application-level configuration.
//!
//! - [`SessionConfig`]: identity slot and turn timeout for a channel session

pub mod session_config;

pub use session_config::{DEFAULT_IDENTITY_KEY, SessionConfig};
