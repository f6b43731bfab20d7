//! Values the reassembler hands to its caller.

/// One chat bubble as the user perceives it.
///
/// `text` is always the full accumulated text of the bubble so far, never
/// just the latest chunk. `is_new_message` tells the UI to open a new bubble
/// instead of updating the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalMessage {
    pub text: String,
    pub is_new_message: bool,
}

impl LogicalMessage {
    pub fn new(text: impl Into<String>, is_new_message: bool) -> Self {
        Self {
            text: text.into(),
            is_new_message,
        }
    }

    /// Update to the bubble currently on screen.
    pub fn update(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }

    /// First text of a bubble opened after a break token.
    pub fn opening(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }
}

/// A single callback-worthy outcome of feeding one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    /// Deliver a logical message (`onMessage`).
    Message(LogicalMessage),
    /// Deliver a transient status notice (`onInfo`).
    Info(String),
    /// The turn is finished (`onComplete`). Always the last emission.
    Complete,
}

impl Emission {
    /// Returns true if this emission ends the turn.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Emission::Complete)
    }
}
