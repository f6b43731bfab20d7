//! JSONL transcript writer.
//!
//! Each [`ConversationEvent`] becomes one JSON line carrying `type`,
//! `timestamp`, the conversation id when known, and the event payload.
//! The file is opened in append mode so transcripts accumulate across runs.

use reentry_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Transcript logger that appends one JSON object per line.
pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open (or create) the transcript at `path`.
    ///
    /// Returns `None`, after a warning, if the file cannot be opened; the
    /// chat then runs without a transcript.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create transcript directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open transcript {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn to_record(event: ConversationEvent) -> Value {
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

    let mut record = Map::new();
    record.insert("type".into(), Value::String(event.event_type.to_string()));
    record.insert("timestamp".into(), Value::String(timestamp));
    if let Some(id) = event.conversation_id {
        record.insert("conversation_id".into(), Value::String(id));
    }
    match event.payload {
        Value::Object(fields) => {
            for (key, value) in fields {
                record.entry(key).or_insert(value);
            }
        }
        Value::Null => {}
        other => {
            record.insert("data".into(), other);
        }
    }
    Value::Object(record)
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let Ok(line) = serde_json::to_string(&to_record(event)) else {
            return;
        };

        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(writer, "{}", line);
        // Flush every record; a crashed chat still leaves a readable transcript.
        let _ = writer.flush();
    }
}

impl Drop for JsonlConversationLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reentry_application::ports::conversation_logger::event_types;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn writes_one_record_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("transcript.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();

        logger.log(
            ConversationEvent::new(
                event_types::TURN_SENT,
                serde_json::json!({"message": "Any shelters?", "history_len": 3}),
            )
            .in_conversation("conv-1"),
        );
        logger.log(ConversationEvent::new(
            event_types::TURN_FAILED,
            serde_json::json!({"error": "Connection closed by peer"}),
        ));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["type"], "turn_sent");
        assert_eq!(records[0]["conversation_id"], "conv-1");
        assert_eq!(records[0]["history_len"], 3);
        assert!(records[0]["timestamp"].as_str().unwrap().ends_with('Z'));
        assert!(records[1].get("conversation_id").is_none());
    }

    #[test]
    fn payload_cannot_override_envelope_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();

        logger.log(ConversationEvent::new(
            event_types::TURN_COMPLETE,
            serde_json::json!({"type": "spoofed", "final_text": "ok"}),
        ));
        logger.log(ConversationEvent::new(
            event_types::CONVERSATION_CLEARED,
            serde_json::json!("just a string"),
        ));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records[0]["type"], "turn_complete");
        assert_eq!(records[0]["final_text"], "ok");
        assert_eq!(records[1]["data"], "just a string");
    }

    #[test]
    fn appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.jsonl");

        for _ in 0..2 {
            let logger = JsonlConversationLogger::new(&path).unwrap();
            logger.log(ConversationEvent::new(
                event_types::CONVERSATION_CLEARED,
                serde_json::json!({}),
            ));
        }
        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn unwritable_path_disables_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        assert!(JsonlConversationLogger::new(blocker.join("transcript.jsonl")).is_none());
    }
}
