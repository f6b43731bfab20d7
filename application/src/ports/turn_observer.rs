//! Turn observer port
//!
//! Callbacks a caller hands to
//! [`ChannelSession::send_and_await`](crate::use_cases::channel_session::ChannelSession::send_and_await).
//! Implementations live in the presentation layer (console bubbles, spinner).

use reentry_domain::LogicalMessage;

/// Receives the outcome of one turn, in frame-arrival order.
///
/// `on_complete` is called at most once per turn and always last. After a
/// transport error or cancellation it is not called at all.
pub trait TurnObserver: Send + Sync {
    /// A logical message was created or grew.
    fn on_message(&self, message: &LogicalMessage);

    /// A transient status notice arrived.
    fn on_info(&self, _text: &str) {}

    /// The turn finished normally.
    fn on_complete(&self) {}
}

/// Observer that ignores every callback.
pub struct NoTurnObserver;

impl TurnObserver for NoTurnObserver {
    fn on_message(&self, _message: &LogicalMessage) {}
}
