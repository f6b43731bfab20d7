//! Server-side break-token detection.
//!
//! The model marks bubble boundaries by writing the literal [`BREAK_TOKEN`]
//! into its output. Because output arrives in arbitrary chunks, the marker
//! can be split across several deltas (`"...BRE"`, `"AK_TO"`, `"KEN..."`).
//! [`BreakTokenSplitter`] buffers a possible partial marker at the end of
//! each chunk and rewrites the text stream into `contentBlockDelta` and
//! `breakTokenType` frames.

use super::frame::Frame;

/// Marker the model writes between two chat bubbles.
pub const BREAK_TOKEN: &str = "BREAK_TOKEN";

/// Incremental splitter for one model response.
#[derive(Debug, Default)]
pub struct BreakTokenSplitter {
    /// Tail of the previous chunk that may start a marker.
    buffer: String,
}

impl BreakTokenSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text held back waiting for the next chunk.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Feed one model text chunk.
    pub fn push(&mut self, delta: &str) -> Vec<Frame> {
        let mut pending = std::mem::take(&mut self.buffer);
        pending.push_str(delta);

        let mut frames = Vec::new();
        let mut rest = pending.as_str();
        while let Some(idx) = rest.find(BREAK_TOKEN) {
            push_text(&mut frames, &rest[..idx]);
            frames.push(Frame::BreakToken);
            rest = &rest[idx + BREAK_TOKEN.len()..];
        }

        let keep = partial_marker_len(rest);
        let (emit, hold) = rest.split_at(rest.len() - keep);
        push_text(&mut frames, emit);
        self.buffer = hold.to_string();
        frames
    }

    /// End of the model response: an incomplete marker is plain text.
    pub fn finish(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        push_text(&mut frames, &std::mem::take(&mut self.buffer));
        frames
    }
}

/// Frame a complete model response the way the chat backend streams it.
pub fn frames_for_model_stream<I, S>(chunks: I) -> Vec<Frame>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut splitter = BreakTokenSplitter::new();
    let mut frames = vec![Frame::MessageStart];
    for chunk in chunks {
        frames.extend(splitter.push(chunk.as_ref()));
    }
    frames.extend(splitter.finish());
    frames.push(Frame::MessageStop);
    frames
}

fn push_text(frames: &mut Vec<Frame>, text: &str) {
    if !text.is_empty() {
        frames.push(Frame::delta(text));
    }
}

/// Length of the longest proper prefix of the marker that `text` ends with.
fn partial_marker_len(text: &str) -> usize {
    (1..BREAK_TOKEN.len())
        .rev()
        .find(|&n| text.ends_with(&BREAK_TOKEN[..n]))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::message::{Emission, LogicalMessage};
    use crate::stream::reassembler::Reassembler;

    #[test]
    fn plain_text_passes_through() {
        let mut splitter = BreakTokenSplitter::new();
        assert_eq!(splitter.push("Hello"), vec![Frame::delta("Hello")]);
        assert!(splitter.finish().is_empty());
    }

    #[test]
    fn whole_marker_inside_one_chunk() {
        let mut splitter = BreakTokenSplitter::new();
        assert_eq!(
            splitter.push("One momentBREAK_TOKENHere are shelters"),
            vec![
                Frame::delta("One moment"),
                Frame::BreakToken,
                Frame::delta("Here are shelters"),
            ]
        );
    }

    #[test]
    fn marker_split_across_chunks() {
        let mut splitter = BreakTokenSplitter::new();
        assert_eq!(splitter.push("Looking...BRE"), vec![Frame::delta("Looking...")]);
        assert_eq!(splitter.buffered(), "BRE");
        assert!(splitter.push("AK_TO").is_empty());
        assert_eq!(splitter.buffered(), "BREAK_TO");
        assert_eq!(
            splitter.push("KENFound it"),
            vec![Frame::BreakToken, Frame::delta("Found it")]
        );
        assert_eq!(splitter.buffered(), "");
    }

    #[test]
    fn false_start_is_released_as_text() {
        let mut splitter = BreakTokenSplitter::new();
        assert_eq!(splitter.push("Whole wheat B"), vec![Frame::delta("Whole wheat ")]);
        assert_eq!(splitter.push("READ"), vec![Frame::delta("BREAD")]);
    }

    #[test]
    fn several_markers_in_one_chunk() {
        let mut splitter = BreakTokenSplitter::new();
        assert_eq!(
            splitter.push("BREAK_TOKENaBREAK_TOKENBREAK_TOKENb"),
            vec![
                Frame::BreakToken,
                Frame::delta("a"),
                Frame::BreakToken,
                Frame::BreakToken,
                Frame::delta("b"),
            ]
        );
    }

    #[test]
    fn dangling_partial_marker_flushed_on_finish() {
        let mut splitter = BreakTokenSplitter::new();
        assert_eq!(splitter.push("The end BREAK"), vec![Frame::delta("The end ")]);
        assert_eq!(splitter.finish(), vec![Frame::delta("BREAK")]);
        assert!(splitter.finish().is_empty());
    }

    #[test]
    fn model_stream_reassembles_into_bubbles() {
        let frames = frames_for_model_stream(["Let me check.", "BREAK_", "TOKENCall ", "211."]);
        assert_eq!(frames.first(), Some(&Frame::MessageStart));
        assert_eq!(frames.last(), Some(&Frame::MessageStop));

        let mut reassembler = Reassembler::new();
        let bubbles: Vec<LogicalMessage> = frames
            .into_iter()
            .flat_map(|f| reassembler.feed(f))
            .filter_map(|e| match e {
                Emission::Message(m) => Some(m),
                _ => None,
            })
            .collect();
        assert_eq!(
            bubbles,
            vec![
                LogicalMessage::update("Let me check."),
                LogicalMessage::update("Let me check."),
                LogicalMessage::opening("Call "),
                LogicalMessage::update("Call 211."),
            ]
        );
    }
}
