//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod channel_session;
pub mod conversation_identity;
