//! Conversation identity bookkeeping.
//!
//! The identity is created lazily on the first turn, recovered from the
//! [`IdentityStore`] when a previous run left one behind, and destroyed only
//! by an explicit [`clear`](ConversationIdentity::clear). The first storage
//! failure switches the identity to memory-only for the rest of the process.

use crate::ports::identity_store::{IdentityStore, StorageError};
use reentry_domain::ConversationId;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ConversationIdentity {
    store: Arc<dyn IdentityStore>,
    key: String,
    current: Option<ConversationId>,
    memory_only: bool,
}

impl ConversationIdentity {
    pub fn new(store: Arc<dyn IdentityStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            current: None,
            memory_only: false,
        }
    }

    /// Identity in use, without creating one.
    pub fn current(&self) -> Option<&ConversationId> {
        self.current.as_ref()
    }

    /// True once a storage failure has been seen.
    pub fn is_memory_only(&self) -> bool {
        self.memory_only
    }

    /// Identity for the next turn: cached, recovered, or freshly generated.
    pub fn get_or_create(&mut self) -> ConversationId {
        if let Some(id) = &self.current {
            return id.clone();
        }

        let id = match self.recover() {
            Some(id) => {
                info!("Recovered conversation {}", id);
                id
            }
            None => {
                let id = ConversationId::generate();
                info!("Started conversation {}", id);
                self.persist(&id);
                id
            }
        };
        self.current = Some(id.clone());
        id
    }

    /// Forget the identity; the next turn starts a new dialogue.
    pub fn clear(&mut self) {
        if let Some(old) = self.current.take() {
            debug!("Clearing conversation {}", old);
        }
        if self.memory_only {
            return;
        }
        if let Err(e) = self.store.remove(&self.key) {
            self.degrade(e);
        }
    }

    fn recover(&mut self) -> Option<ConversationId> {
        if self.memory_only {
            return None;
        }
        match self.store.load(&self.key) {
            Ok(Some(raw)) => {
                let recovered = ConversationId::recover(raw);
                if recovered.is_none() {
                    debug!("Ignoring blank stored conversation id");
                }
                recovered
            }
            Ok(None) => None,
            Err(e) => {
                self.degrade(e);
                None
            }
        }
    }

    fn persist(&mut self, id: &ConversationId) {
        if self.memory_only {
            return;
        }
        if let Err(e) = self.store.save(&self.key, id.as_str()) {
            self.degrade(e);
        }
    }

    fn degrade(&mut self, error: StorageError) {
        warn!(
            "Conversation identity storage failed, continuing in memory only: {}",
            error
        );
        self.memory_only = true;
    }
}
