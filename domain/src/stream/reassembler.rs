//! Stream reassembly state machine.
//!
//! The chat backend streams one turn as a sequence of [`Frame`]s. A single
//! turn may contain several chat bubbles separated by break tokens, e.g. a
//! short "let me look that up" filler followed by the real answer. The
//! [`Reassembler`] turns that sequence into [`Emission`]s:
//!
//! | Frame | State | Result |
//! |-------|-------|--------|
//! | `MessageStart` | any | reset to `Idle` |
//! | `ContentDelta` (non-empty) | any | append, emit full text tagged with the carry bit |
//! | `ContentDelta` (empty) | any | nothing |
//! | `BreakToken` | `Accumulating` | re-emit the closed text, go `Idle`, set the carry bit |
//! | `BreakToken` | `Idle` | nothing |
//! | `MessageStop` | any | `Complete` |
//! | `Info` | any | `Info` |
//! | `Legacy` | any | message then `Complete` |
//!
//! [`Reassembler::transition`] is a pure `(state, frame) -> (state, emissions)`
//! function; [`Reassembler::feed`] is the in-place form used by sessions.

use super::frame::Frame;
use super::message::{Emission, LogicalMessage};

/// Accumulation state of the logical message being built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccumulatorState {
    /// Nothing accumulated since the last reset or break.
    #[default]
    Idle,
    /// At least one non-empty chunk appended; `text` is never empty.
    Accumulating { text: String },
}

/// Reassembles streamed frames into logical chat messages.
///
/// Owned by exactly one session; not meant to be shared across tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reassembler {
    state: AccumulatorState,
    /// Carry bit bridging a break token and the next non-empty chunk.
    pending_new_message: bool,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AccumulatorState {
        &self.state
    }

    /// Text of the logical message currently being built.
    pub fn text(&self) -> &str {
        match &self.state {
            AccumulatorState::Idle => "",
            AccumulatorState::Accumulating { text } => text,
        }
    }

    pub fn has_content(&self) -> bool {
        matches!(self.state, AccumulatorState::Accumulating { .. })
    }

    /// Whether the next non-empty chunk opens a new logical message.
    pub fn pending_new_message(&self) -> bool {
        self.pending_new_message
    }

    /// Discard everything accumulated so far.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply one frame in place and return what the caller must deliver.
    pub fn feed(&mut self, frame: Frame) -> Vec<Emission> {
        let (next, emissions) = std::mem::take(self).transition(frame);
        *self = next;
        emissions
    }

    /// Pure transition function.
    pub fn transition(self, frame: Frame) -> (Self, Vec<Emission>) {
        let Reassembler {
            state,
            pending_new_message,
        } = self;

        match frame {
            Frame::MessageStart => (Self::default(), Vec::new()),

            Frame::ContentDelta { text: chunk } if chunk.is_empty() => (
                Self {
                    state,
                    pending_new_message,
                },
                Vec::new(),
            ),

            Frame::ContentDelta { text: chunk } => {
                let mut text = match state {
                    AccumulatorState::Idle => String::new(),
                    AccumulatorState::Accumulating { text } => text,
                };
                text.push_str(&chunk);
                let message = if pending_new_message {
                    LogicalMessage::opening(text.clone())
                } else {
                    LogicalMessage::update(text.clone())
                };
                (
                    Self {
                        state: AccumulatorState::Accumulating { text },
                        pending_new_message: false,
                    },
                    vec![Emission::Message(message)],
                )
            }

            Frame::BreakToken => match state {
                AccumulatorState::Accumulating { text } if !text.is_empty() => (
                    Self {
                        state: AccumulatorState::Idle,
                        pending_new_message: true,
                    },
                    vec![Emission::Message(LogicalMessage::update(text))],
                ),
                state => (
                    Self {
                        state,
                        pending_new_message,
                    },
                    Vec::new(),
                ),
            },

            Frame::MessageStop => (
                Self {
                    state,
                    pending_new_message,
                },
                vec![Emission::Complete],
            ),

            Frame::Info { text } => (
                Self {
                    state,
                    pending_new_message,
                },
                vec![Emission::Info(text)],
            ),

            Frame::Legacy { text } => (
                Self {
                    state,
                    pending_new_message,
                },
                vec![
                    Emission::Message(LogicalMessage::update(text)),
                    Emission::Complete,
                ],
            ),
        }
    }
}
