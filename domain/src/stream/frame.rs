//! Inbound frames on the streaming chat channel.
//!
//! Every text payload received from the chat backend is classified into a
//! [`Frame`] before it reaches the [`Reassembler`](super::reassembler::Reassembler).
//! Classification never panics: a payload that is not JSON becomes
//! [`FrameError::Parse`], and valid JSON with no usable shape becomes
//! [`FrameError::Unrecognized`]. Both are recovered by the caller.
//!
//! # Wire shapes
//!
//! ```text
//! { "type": "messageStart" }
//! { "type": "contentBlockDelta", "data": { "delta": { "text": "..." } } }
//! { "type": "breakTokenType" }
//! { "type": "messageStop" }
//! { "type": "info", "data": { "message": "..." } }   or   "data": "..."
//! { "message": "..." }                                 legacy, untagged
//! ```

use serde_json::{Value, json};
use thiserror::Error;

/// Tag of the frame that opens a fresh assistant turn.
pub const MESSAGE_START: &str = "messageStart";
/// Tag of a streamed text chunk.
pub const CONTENT_BLOCK_DELTA: &str = "contentBlockDelta";
/// Tag of the frame that splits one stream into several chat bubbles.
pub const BREAK_TOKEN_TYPE: &str = "breakTokenType";
/// Tag of the terminal frame of a streamed turn.
pub const MESSAGE_STOP: &str = "messageStop";
/// Tag of a transient status notice.
pub const INFO: &str = "info";

/// One discrete inbound unit on the streaming channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// The server started a fresh turn; any unflushed text is discarded.
    MessageStart,
    /// A chunk of assistant text (may be empty).
    ContentDelta { text: String },
    /// Ends the current logical message; the next chunk opens a new one.
    BreakToken,
    /// End of the streamed turn.
    MessageStop,
    /// Status notice shown outside the chat bubbles.
    Info { text: String },
    /// Complete, non-streaming response (`{"message": ...}` without a tag).
    Legacy { text: String },
}

impl Frame {
    /// Convenience constructor for a text chunk.
    pub fn delta(text: impl Into<String>) -> Self {
        Frame::ContentDelta { text: text.into() }
    }

    /// Convenience constructor for a status notice.
    pub fn info(text: impl Into<String>) -> Self {
        Frame::Info { text: text.into() }
    }

    /// Convenience constructor for a legacy complete response.
    pub fn legacy(text: impl Into<String>) -> Self {
        Frame::Legacy { text: text.into() }
    }

    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::MessageStart => MESSAGE_START,
            Frame::ContentDelta { .. } => CONTENT_BLOCK_DELTA,
            Frame::BreakToken => BREAK_TOKEN_TYPE,
            Frame::MessageStop => MESSAGE_STOP,
            Frame::Info { .. } => INFO,
            Frame::Legacy { .. } => "legacy",
        }
    }

    /// Render the frame in the shape the chat backend sends it.
    pub fn to_value(&self) -> Value {
        match self {
            Frame::MessageStart => json!({ "type": MESSAGE_START }),
            Frame::ContentDelta { text } => json!({
                "type": CONTENT_BLOCK_DELTA,
                "data": { "delta": { "text": text } }
            }),
            Frame::BreakToken => json!({ "type": BREAK_TOKEN_TYPE }),
            Frame::MessageStop => json!({ "type": MESSAGE_STOP }),
            Frame::Info { text } => json!({ "type": INFO, "data": { "message": text } }),
            Frame::Legacy { text } => json!({ "message": text }),
        }
    }

    /// Serialized wire text of [`to_value`](Self::to_value).
    pub fn to_wire(&self) -> String {
        self.to_value().to_string()
    }
}

/// Reasons a payload could not be turned into a [`Frame`].
///
/// Neither variant is fatal to a session: the frame is dropped and the
/// stream continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Failed to parse frame: {error}\nRaw frame: {raw}")]
    Parse { error: String, raw: String },

    #[error("Unrecognized frame: {0}")]
    Unrecognized(String),
}

/// Parse raw text received from the transport and classify it.
pub fn parse_frame(raw: &str) -> Result<Frame, FrameError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| FrameError::Parse {
        error: e.to_string(),
        raw: raw.to_string(),
    })?;
    classify_frame(&value)
}

/// Classify an already-parsed payload.
///
/// An explicit `type` tag wins. Without a recognized tag, a top-level string
/// `message` field makes the payload a [`Frame::Legacy`] response.
pub fn classify_frame(value: &Value) -> Result<Frame, FrameError> {
    let tag = value.get("type").and_then(Value::as_str);

    match tag {
        Some(MESSAGE_START) => return Ok(Frame::MessageStart),
        Some(CONTENT_BLOCK_DELTA) => {
            // The server defaults a missing chunk to "", which is a no-op downstream.
            let text = value
                .pointer("/data/delta/text")
                .and_then(Value::as_str)
                .unwrap_or_default();
            return Ok(Frame::delta(text));
        }
        Some(BREAK_TOKEN_TYPE) => return Ok(Frame::BreakToken),
        Some(MESSAGE_STOP) => return Ok(Frame::MessageStop),
        Some(INFO) => {
            return extract_info_text(value)
                .map(Frame::info)
                .ok_or_else(|| FrameError::Unrecognized("info frame without text".into()));
        }
        _ => {}
    }

    if let Some(text) = value.get("message").and_then(Value::as_str) {
        return Ok(Frame::legacy(text));
    }

    Err(FrameError::Unrecognized(match tag {
        Some(other) => format!("unknown type '{}'", other),
        None => "no type tag or message field".to_string(),
    }))
}

/// Info text lives either at `data.message` or directly in `data`.
fn extract_info_text(value: &Value) -> Option<&str> {
    let data = value.get("data")?;
    if let Some(s) = data.as_str() {
        return Some(s);
    }
    data.get("message").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_message_start() {
        let json = json!({"type": "messageStart", "data": {"role": "assistant"}});
        assert_eq!(classify_frame(&json).unwrap(), Frame::MessageStart);
    }

    #[test]
    fn classify_content_delta() {
        let json = json!({
            "type": "contentBlockDelta",
            "data": {"delta": {"text": "Hello"}, "contentBlockIndex": 0}
        });
        assert_eq!(classify_frame(&json).unwrap(), Frame::delta("Hello"));
    }

    #[test]
    fn content_delta_without_text_is_empty() {
        let json = json!({"type": "contentBlockDelta", "data": {"delta": {}}});
        assert_eq!(classify_frame(&json).unwrap(), Frame::delta(""));

        let json = json!({"type": "contentBlockDelta"});
        assert_eq!(classify_frame(&json).unwrap(), Frame::delta(""));
    }

    #[test]
    fn classify_break_and_stop() {
        assert_eq!(
            classify_frame(&json!({"type": "breakTokenType"})).unwrap(),
            Frame::BreakToken
        );
        assert_eq!(
            classify_frame(&json!({"type": "messageStop", "data": {"stopReason": "end_turn"}}))
                .unwrap(),
            Frame::MessageStop
        );
    }

    #[test]
    fn info_text_from_object_or_string() {
        let nested = json!({"type": "info", "data": {"message": "Searching resources..."}});
        assert_eq!(
            classify_frame(&nested).unwrap(),
            Frame::info("Searching resources...")
        );

        let flat = json!({"type": "info", "data": "Still working"});
        assert_eq!(classify_frame(&flat).unwrap(), Frame::info("Still working"));
    }

    #[test]
    fn info_without_text_is_unrecognized() {
        let json = json!({"type": "info", "data": {"progress": 3}});
        assert!(matches!(
            classify_frame(&json),
            Err(FrameError::Unrecognized(_))
        ));
    }

    #[test]
    fn untagged_message_is_legacy() {
        let json = json!({"message": "An unexpected error occurred."});
        assert_eq!(
            classify_frame(&json).unwrap(),
            Frame::legacy("An unexpected error occurred.")
        );
    }

    #[test]
    fn unknown_tag_with_message_falls_back_to_legacy() {
        let json = json!({"type": "contentBlockStop", "message": "done"});
        assert_eq!(classify_frame(&json).unwrap(), Frame::legacy("done"));
    }

    #[test]
    fn explicit_tag_wins_over_message_field() {
        let json = json!({"type": "messageStop", "message": "ignored"});
        assert_eq!(classify_frame(&json).unwrap(), Frame::MessageStop);
    }

    #[test]
    fn unknown_shapes_are_unrecognized() {
        let err = classify_frame(&json!({"type": "metadata", "usage": {}})).unwrap_err();
        assert_eq!(err, FrameError::Unrecognized("unknown type 'metadata'".into()));

        assert!(matches!(
            classify_frame(&json!({"message": 42})),
            Err(FrameError::Unrecognized(_))
        ));
        assert!(matches!(
            classify_frame(&json!(["messageStart"])),
            Err(FrameError::Unrecognized(_))
        ));
    }

    #[test]
    fn parse_error_keeps_raw_text() {
        let err = parse_frame("{not json").unwrap_err();
        match err {
            FrameError::Parse { raw, .. } => assert_eq!(raw, "{not json"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn wire_text_classifies_back_to_the_same_frame() {
        let frames = [
            Frame::MessageStart,
            Frame::delta("chunk"),
            Frame::BreakToken,
            Frame::MessageStop,
            Frame::info("note"),
            Frame::legacy("whole answer"),
        ];
        for frame in frames {
            assert_eq!(parse_frame(&frame.to_wire()).unwrap(), frame);
        }
    }
}
