//! Presentation layer for reentry-chat
//!
//! This crate contains the CLI definition, console rendering of streamed
//! replies, progress indicators, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatRepl, TurnError, execute_turn};
pub use cli::commands::Cli;
pub use output::console::{ConsoleRenderer, FAILURE_NOTICE};
pub use progress::spinner::TurnSpinner;
