//! Domain layer for reentry-chat
//!
//! This crate contains the streaming protocol types and the reassembly state
//! machine. It has no dependencies on transports, storage or presentation.
//!
//! # Core Concepts
//!
//! - **Frame**: one discrete inbound unit on the streaming channel
//! - **Logical message**: one chat bubble, possibly built from many frames
//! - **Break token**: ends one logical message inside a single stream
//! - **Conversation identity**: opaque key grouping all turns of a dialogue

pub mod conversation;
pub mod stream;

// Re-export commonly used types
pub use conversation::{
    entities::{ChatMessage, ContentText, ConversationId, Role, UserInfo},
    envelope::{OutboundEnvelope, SEND_MESSAGE_ACTION, TurnRequest},
    history::{Sender, TranscriptEntry, normalize_history},
};
pub use stream::{
    frame::{Frame, FrameError, classify_frame, parse_frame},
    message::{Emission, LogicalMessage},
    reassembler::{AccumulatorState, Reassembler},
    splitter::{BREAK_TOKEN, BreakTokenSplitter, frames_for_model_stream},
};
