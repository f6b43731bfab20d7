//! Conversation domain.
//!
//! - [`entities`]: identity, wire history entries, user profile
//! - [`envelope`]: the outbound request sent once per turn
//! - [`history`]: UI transcript and its normalization

pub mod entities;
pub mod envelope;
pub mod history;
