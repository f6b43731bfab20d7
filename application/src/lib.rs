//! Application layer for reentry-chat
//!
//! This crate contains the channel session use case, port definitions, and
//! session configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::SessionConfig;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    identity_store::{IdentityStore, MemoryIdentityStore, StorageError},
    transport::{Connection, Transport, TransportError},
    turn_observer::{NoTurnObserver, TurnObserver},
};
pub use use_cases::channel_session::{ChannelSession, SessionError, TurnSummary};
pub use use_cases::conversation_identity::ConversationIdentity;
