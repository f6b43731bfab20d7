//! Interactive chat module
//!
//! Provides a line-editor based chat interface and the single-turn runner
//! shared with one-shot mode.

mod repl;
mod turn;

pub use repl::ChatRepl;
pub use turn::{TurnError, execute_turn};
