//! Port for the structured turn transcript.
//!
//! `tracing` carries diagnostics for humans; this port records each turn of
//! a conversation (request sent, reply completed, turn failed) as a
//! machine-readable record, e.g. one JSONL line per event.

use serde_json::Value;

/// Event types written by the channel session.
pub mod event_types {
    pub const TURN_SENT: &str = "turn_sent";
    pub const TURN_COMPLETE: &str = "turn_complete";
    pub const TURN_FAILED: &str = "turn_failed";
    pub const CONVERSATION_CLEARED: &str = "conversation_cleared";
}

/// One transcript record.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// See [`event_types`].
    pub event_type: &'static str,
    /// Identity of the dialogue the event belongs to, if one exists yet.
    pub conversation_id: Option<String>,
    /// Event-specific fields.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            conversation_id: None,
            payload,
        }
    }

    pub fn in_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }
}

/// Sink for transcript records.
///
/// `log` is synchronous and infallible; an implementation that cannot write
/// drops the record rather than disturbing the turn.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Discards every record.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
