//! In-process transport that answers every turn with a fixed frame script.
//!
//! Used for offline runs (`--replay`, `--simulate`) and for exercising the
//! session without a backend. Each connection plays the script once after
//! the first request and then behaves as if the peer closed the channel.

use async_trait::async_trait;
use reentry_application::ports::transport::{Connection, Transport, TransportError};
use reentry_domain::{Frame, frames_for_model_stream};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// Transport backed by a recorded or synthesized frame script.
#[derive(Debug, Clone)]
pub struct ScriptedTransport {
    script: Vec<String>,
    frame_delay: Duration,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    /// Script of raw text frames, sent verbatim (malformed lines included).
    pub fn from_raw(script: Vec<String>) -> Self {
        Self {
            script,
            frame_delay: Duration::ZERO,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn from_frames(frames: &[Frame]) -> Self {
        Self::from_raw(frames.iter().map(Frame::to_wire).collect())
    }

    /// Replay a JSONL capture: one raw frame per non-blank line.
    pub fn from_jsonl_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let script: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        debug!(
            "Loaded {} frames from {}",
            script.len(),
            path.as_ref().display()
        );
        Ok(Self::from_raw(script))
    }

    /// Stream `text` word by word as a model would, splitting out
    /// `BREAK_TOKEN` markers into break frames.
    pub fn simulated(text: &str) -> Self {
        let frames = frames_for_model_stream(text.split_inclusive(' '));
        Self::from_frames(&frames)
    }

    /// Pause before yielding each frame.
    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = delay;
        self
    }

    /// Every request sent over any connection, oldest first.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn script_len(&self) -> usize {
        self.script.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn endpoint(&self) -> String {
        format!("scripted ({} frames)", self.script.len())
    }

    async fn connect(&self) -> Result<Box<dyn Connection>, TransportError> {
        Ok(Box::new(ScriptedConnection {
            script: self.script.clone(),
            pending: VecDeque::new(),
            started: false,
            closed: false,
            frame_delay: self.frame_delay,
            requests: Arc::clone(&self.requests),
        }))
    }
}

struct ScriptedConnection {
    script: Vec<String>,
    pending: VecDeque<String>,
    started: bool,
    closed: bool,
    frame_delay: Duration,
    requests: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
        if !self.started {
            self.started = true;
            self.pending = self.script.iter().cloned().collect();
        }
        Ok(())
    }

    async fn recv_text(&mut self) -> Option<Result<String, TransportError>> {
        if self.closed {
            return None;
        }
        if !self.started {
            return std::future::pending().await;
        }
        if !self.frame_delay.is_zero() {
            tokio::time::sleep(self.frame_delay).await;
        }
        self.pending.pop_front().map(Ok)
    }

    async fn close(&mut self) {
        self.closed = true;
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reentry_application::{ChannelSession, MemoryIdentityStore, SessionConfig, TurnObserver};
    use reentry_domain::{LogicalMessage, TurnRequest};

    #[derive(Default)]
    struct Bubbles(Mutex<Vec<(String, bool)>>);

    impl TurnObserver for Bubbles {
        fn on_message(&self, message: &LogicalMessage) {
            self.0
                .lock()
                .unwrap()
                .push((message.text.clone(), message.is_new_message));
        }
    }

    async fn drain(connection: &mut Box<dyn Connection>) -> Vec<String> {
        let mut frames = Vec::new();
        while let Some(frame) = connection.recv_text().await {
            frames.push(frame.unwrap());
        }
        frames
    }

    #[tokio::test]
    async fn plays_script_after_first_request() {
        let transport = ScriptedTransport::from_frames(&[Frame::MessageStart, Frame::MessageStop]);
        let mut connection = transport.connect().await.unwrap();

        connection.send_text("hello").await.unwrap();
        assert_eq!(
            drain(&mut connection).await,
            vec![r#"{"type":"messageStart"}"#, r#"{"type":"messageStop"}"#]
        );
        assert_eq!(transport.requests(), vec!["hello"]);
    }

    #[tokio::test]
    async fn replays_jsonl_capture_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("turn.jsonl");
        std::fs::write(
            &path,
            "{\"type\":\"messageStart\"}\n\nnot json\n{\"type\":\"messageStop\"}\n",
        )
        .unwrap();

        let transport = ScriptedTransport::from_jsonl_file(&path).unwrap();
        assert_eq!(transport.script_len(), 3);

        let mut connection = transport.connect().await.unwrap();
        connection.send_text("{}").await.unwrap();
        assert_eq!(drain(&mut connection).await[1], "not json");
    }

    #[tokio::test]
    async fn closed_connection_yields_nothing() {
        let transport = ScriptedTransport::simulated("hi");
        let mut connection = transport.connect().await.unwrap();
        connection.send_text("{}").await.unwrap();
        connection.close().await;

        assert!(connection.recv_text().await.is_none());
        assert_eq!(
            connection.send_text("{}").await.unwrap_err(),
            TransportError::Closed
        );
    }

    #[tokio::test]
    async fn simulated_stream_drives_a_session() {
        let transport = Arc::new(ScriptedTransport::simulated(
            "Let me check. BREAK_TOKEN There are two shelters nearby.",
        ));
        let session = ChannelSession::new(
            Arc::clone(&transport),
            Arc::new(MemoryIdentityStore::new()),
            &SessionConfig::default(),
        );
        let bubbles = Bubbles::default();

        let summary = session
            .send_and_await(&TurnRequest::new("shelters?"), &bubbles)
            .await
            .unwrap();

        assert_eq!(summary.bubbles_opened, 1);
        assert_eq!(summary.final_text.trim(), "There are two shelters nearby.");
        let bubbles = bubbles.0.lock().unwrap();
        assert!(bubbles.iter().any(|(text, _)| text.trim() == "Let me check."));
        assert_eq!(bubbles.iter().filter(|(_, is_new)| *is_new).count(), 1);
        assert_eq!(transport.requests().len(), 1);
    }
}
