//! Channel session: one conversation over one streaming connection.
//!
//! [`ChannelSession`] owns a single connection, the [`Reassembler`] fed by
//! it, and the conversation identity. A turn looks like:
//!
//! ```text
//! open() ──► send(request) ──► frames … ──► messageStop ──► link closed
//!   │                             │
//!   └── idempotent                └── classified, reassembled, delivered
//!                                     to the TurnObserver in arrival order
//! ```
//!
//! [`send_and_await`](ChannelSession::send_and_await) runs the whole turn.
//! Malformed and unrecognized frames are logged and dropped; only transport
//! failures and cancellation reach the caller.
//!
//! # Concurrency
//!
//! One turn at a time per session. The connection lives behind an async
//! mutex that a running turn holds until it finishes, so overlapping turns
//! from several callers queue up instead of interleaving; they are not a
//! supported use. [`close`](ChannelSession::close) is the exception: it
//! cancels the running turn first, which then fails with
//! [`SessionError::Cancelled`].

use crate::config::SessionConfig;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, event_types,
};
use crate::ports::identity_store::IdentityStore;
use crate::ports::transport::{Connection, Transport, TransportError};
use crate::ports::turn_observer::TurnObserver;
use crate::use_cases::conversation_identity::ConversationIdentity;
use reentry_domain::{
    ConversationId, Emission, FrameError, OutboundEnvelope, Reassembler, TurnRequest, parse_frame,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Errors surfaced to the caller of a session operation
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Not connected")]
    NotConnected,

    #[error("Connection error: {0}")]
    Connection(#[from] TransportError),

    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Turn cancelled")]
    Cancelled,
}

impl SessionError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SessionError::Cancelled)
    }
}

/// Counters for one finished turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnSummary {
    /// Raw frames read from the connection.
    pub frames_received: usize,
    /// Frames dropped as unparseable or unrecognized.
    pub frames_dropped: usize,
    /// `on_message` calls made.
    pub messages_delivered: usize,
    /// Logical messages opened by a break token.
    pub bubbles_opened: usize,
    /// Full text of the last logical message delivered.
    pub final_text: String,
}

/// An established connection and the accumulator it feeds.
struct OpenLink {
    connection: Box<dyn Connection>,
    reassembler: Reassembler,
}

enum Inbound {
    Cancelled,
    Received(Option<Result<String, TransportError>>),
}

/// Explicitly constructed session for one conversation.
///
/// Several conversations need several sessions; nothing is shared between
/// them.
pub struct ChannelSession<T: Transport + ?Sized> {
    transport: Arc<T>,
    identity: Mutex<ConversationIdentity>,
    link: tokio::sync::Mutex<Option<OpenLink>>,
    connected: AtomicBool,
    cancel: Mutex<CancellationToken>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl<T: Transport + ?Sized> ChannelSession<T> {
    pub fn new(
        transport: Arc<T>,
        identity_store: Arc<dyn IdentityStore>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            transport,
            identity: Mutex::new(ConversationIdentity::new(
                identity_store,
                config.identity_key.clone(),
            )),
            link: tokio::sync::Mutex::new(None),
            connected: AtomicBool::new(false),
            cancel: Mutex::new(CancellationToken::new()),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Record turns to a structured transcript.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Whether a connection is established.
    ///
    /// False while a `connect()` is still in progress.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Identity of the current dialogue, if one was created or recovered.
    pub fn conversation_id(&self) -> Option<ConversationId> {
        self.identity
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .current()
            .cloned()
    }

    /// Connect if not already connected.
    ///
    /// Calls made while another call is connecting wait for it and then
    /// observe the established connection. [`close`](Self::close) aborts a
    /// pending connect with [`SessionError::Cancelled`].
    pub async fn open(&self) -> Result<(), SessionError> {
        let cancel = self.cancel_token();
        let mut link = self.link.lock().await;
        until_cancelled(&cancel, self.open_link(&mut link)).await
    }

    /// Send one turn over an already open connection.
    pub async fn send(&self, request: &TurnRequest) -> Result<(), SessionError> {
        let mut link = self.link.lock().await;
        if link.is_none() {
            debug!("send() called without an open connection");
            return Err(SessionError::NotConnected);
        }
        self.send_on_link(&mut link, request).await
    }

    /// Run a whole turn: open if needed, send, and deliver the reply.
    ///
    /// Returns after `messageStop` (or a legacy complete response), having
    /// called `observer.on_complete()` exactly once. A transport failure, a
    /// peer close before `messageStop`, or [`close`](Self::close) end the
    /// turn with an error and no completion callback.
    pub async fn send_and_await(
        &self,
        request: &TurnRequest,
        observer: &dyn TurnObserver,
    ) -> Result<TurnSummary, SessionError> {
        let cancel = self.cancel_token();
        let mut link = self.link.lock().await;

        // Nothing reaches the server once the turn is cancelled.
        let mut sent = until_cancelled(&cancel, self.open_link(&mut link)).await;
        if sent.is_ok() {
            sent = until_cancelled(&cancel, self.send_on_link(&mut link, request)).await;
        }
        if let Err(e) = sent {
            if e.is_cancelled() {
                debug!("Turn cancelled before the request was sent");
            }
            self.shutdown(&mut link).await;
            return Err(e);
        }

        let result = self.receive_turn(&mut link, &cancel, observer).await;
        match &result {
            Ok(summary) => self.log_event(
                ConversationEvent::new(
                    event_types::TURN_COMPLETE,
                    serde_json::json!({
                        "frames_received": summary.frames_received,
                        "frames_dropped": summary.frames_dropped,
                        "messages_delivered": summary.messages_delivered,
                        "bubbles_opened": summary.bubbles_opened,
                        "final_text": summary.final_text,
                    }),
                ),
            ),
            Err(e) => self.log_event(ConversationEvent::new(
                event_types::TURN_FAILED,
                serde_json::json!({ "error": e.to_string() }),
            )),
        }
        result
    }

    /// Close the connection. Always safe, including when already closed.
    ///
    /// A turn in flight is cancelled. The accumulator is reset; the
    /// conversation identity is kept.
    pub async fn close(&self) {
        {
            let mut token = self.cancel.lock().unwrap_or_else(|e| e.into_inner());
            token.cancel();
            *token = CancellationToken::new();
        }

        let mut link = self.link.lock().await;
        if link.is_some() {
            self.shutdown(&mut link).await;
            info!("Session closed");
        } else {
            debug!("close() on an already closed session");
        }
    }

    /// Forget the conversation identity; the next turn starts a new dialogue.
    pub fn clear_conversation(&self) {
        let mut identity = self.identity.lock().unwrap_or_else(|e| e.into_inner());
        let old = identity.current().map(|id| id.to_string());
        identity.clear();
        drop(identity);

        let mut event = ConversationEvent::new(event_types::CONVERSATION_CLEARED, serde_json::json!({}));
        if let Some(old) = old {
            event = event.in_conversation(old);
        }
        self.conversation_logger.log(event);
    }

    fn cancel_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    async fn open_link(&self, link: &mut Option<OpenLink>) -> Result<(), SessionError> {
        if link.is_some() {
            debug!("Session already connected to {}", self.transport.endpoint());
            return Ok(());
        }

        debug!("Connecting to {}", self.transport.endpoint());
        let connection = self.transport.connect().await.map_err(|e| {
            warn!("Connection to {} failed: {}", self.transport.endpoint(), e);
            SessionError::Connection(e)
        })?;
        info!("Connected to {}", self.transport.endpoint());

        *link = Some(OpenLink {
            connection,
            reassembler: Reassembler::new(),
        });
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn send_on_link(
        &self,
        link: &mut Option<OpenLink>,
        request: &TurnRequest,
    ) -> Result<(), SessionError> {
        let Some(open) = link.as_mut() else {
            return Err(SessionError::NotConnected);
        };

        let conversation_id = self
            .identity
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_or_create();
        let body = OutboundEnvelope::new(request, &conversation_id).to_json()?;
        debug!(
            "Sending turn ({} history entries, {} bytes)",
            request.history.len(),
            body.len()
        );
        trace!("Session sending: {}", body);

        if let Err(e) = open.connection.send_text(&body).await {
            warn!("Send failed, closing connection: {}", e);
            self.shutdown(link).await;
            return Err(SessionError::Connection(e));
        }

        self.log_event(ConversationEvent::new(
            event_types::TURN_SENT,
            serde_json::json!({
                "message": request.message,
                "history_len": request.history.len(),
                "has_user_info": request.user_info.is_some(),
            }),
        ));
        Ok(())
    }

    async fn receive_turn(
        &self,
        link: &mut Option<OpenLink>,
        cancel: &CancellationToken,
        observer: &dyn TurnObserver,
    ) -> Result<TurnSummary, SessionError> {
        let mut summary = TurnSummary::default();

        loop {
            let inbound = match link.as_mut() {
                Some(open) => tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Inbound::Cancelled,
                    next = open.connection.recv_text() => Inbound::Received(next),
                },
                None => return Err(SessionError::NotConnected),
            };

            let raw = match inbound {
                Inbound::Cancelled => {
                    debug!("Turn cancelled after {} frames", summary.frames_received);
                    self.shutdown(link).await;
                    return Err(SessionError::Cancelled);
                }
                Inbound::Received(None) => {
                    warn!(
                        "Connection closed before messageStop ({} frames)",
                        summary.frames_received
                    );
                    self.shutdown(link).await;
                    return Err(SessionError::Connection(TransportError::Closed));
                }
                Inbound::Received(Some(Err(e))) => {
                    warn!("Transport error mid-stream: {}", e);
                    self.shutdown(link).await;
                    return Err(SessionError::Connection(e));
                }
                Inbound::Received(Some(Ok(raw))) => raw,
            };

            summary.frames_received += 1;
            trace!("Session received: {}", raw);

            let frame = match parse_frame(&raw) {
                Ok(frame) => frame,
                Err(FrameError::Parse { error, .. }) => {
                    warn!("Dropping unparseable frame: {}", error);
                    summary.frames_dropped += 1;
                    continue;
                }
                Err(FrameError::Unrecognized(reason)) => {
                    debug!("Dropping unrecognized frame: {}", reason);
                    summary.frames_dropped += 1;
                    continue;
                }
            };
            trace!("Stream: {}", frame.kind());

            let emissions = match link.as_mut() {
                Some(open) => open.reassembler.feed(frame),
                None => Vec::new(),
            };

            let mut complete = false;
            for emission in emissions {
                match emission {
                    Emission::Message(message) => {
                        summary.messages_delivered += 1;
                        if message.is_new_message {
                            summary.bubbles_opened += 1;
                        }
                        observer.on_message(&message);
                        summary.final_text = message.text;
                    }
                    Emission::Info(text) => observer.on_info(&text),
                    Emission::Complete => complete = true,
                }
            }

            if complete {
                debug!(
                    "Turn complete ({} frames, {} dropped, {} messages)",
                    summary.frames_received, summary.frames_dropped, summary.messages_delivered
                );
                observer.on_complete();
                self.shutdown(link).await;
                return Ok(summary);
            }
        }
    }

    /// Close and drop the link, resetting its accumulator.
    async fn shutdown(&self, link: &mut Option<OpenLink>) {
        self.connected.store(false, Ordering::SeqCst);
        if let Some(mut open) = link.take() {
            open.connection.close().await;
        }
    }

    fn log_event(&self, event: ConversationEvent) {
        let event = match self.conversation_id() {
            Some(id) => event.in_conversation(id.to_string()),
            None => event,
        };
        self.conversation_logger.log(event);
    }
}

/// Run `step` unless `cancel` fires first; an already cancelled token wins.
async fn until_cancelled<R>(
    cancel: &CancellationToken,
    step: impl Future<Output = Result<R, SessionError>>,
) -> Result<R, SessionError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SessionError::Cancelled),
        result = step => result,
    }
}
