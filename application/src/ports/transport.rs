//! Transport port
//!
//! Defines the full-duplex text channel a
//! [`ChannelSession`](crate::use_cases::channel_session::ChannelSession)
//! talks over. Adapters (TCP, in-process scripts) live in the infrastructure
//! layer.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur at the transport level
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Failed to connect to {endpoint}: {reason}")]
    ConnectFailed { endpoint: String, reason: String },

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Connection closed by peer")]
    Closed,
}

/// Factory for connections to one chat endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Endpoint description for log lines.
    fn endpoint(&self) -> String;

    /// Establish a new connection.
    async fn connect(&self) -> Result<Box<dyn Connection>, TransportError>;
}

/// One established duplex channel.
///
/// Inbound text frames must be yielded in arrival order.
#[async_trait]
pub trait Connection: Send {
    /// Send one text frame.
    async fn send_text(&mut self, text: &str) -> Result<(), TransportError>;

    /// Wait for the next inbound text frame.
    ///
    /// Returns `None` once the peer has closed the channel. Must be
    /// cancel-safe: dropping the future must not lose a frame.
    async fn recv_text(&mut self) -> Option<Result<String, TransportError>>;

    /// Close the channel. Calling it twice is harmless.
    async fn close(&mut self);
}
