//! Streaming chat protocol.
//!
//! - [`frame`]: classification of inbound payloads into [`frame::Frame`]s
//! - [`reassembler`]: the state machine turning frames into logical messages
//! - [`message`]: what the reassembler emits
//! - [`splitter`]: server-side break-token detection over model output

pub mod frame;
pub mod message;
pub mod reassembler;
pub mod splitter;
