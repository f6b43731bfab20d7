//! Transport adapters implementing the
//! [`Transport`](reentry_application::ports::transport::Transport) port.
//!
//! - [`TcpTransport`]: newline-delimited JSON over TCP
//! - [`ScriptedTransport`]: in-process replay of a fixed frame script

mod scripted;
mod tcp;

pub use scripted::ScriptedTransport;
pub use tcp::{TcpConnection, TcpTransport};
