//! UI transcript and its normalization into wire history.
//!
//! The chat screen keeps more than the backend should see: a canned welcome
//! bubble, failure notices, and empty bot placeholders that are shown while a
//! reply is still streaming. [`normalize_history`] strips those.

use super::entities::{ChatMessage, Role};

/// Who a transcript entry is shown as coming from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One bubble in the UI transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub sender: Sender,
    pub text: String,
    /// Locally generated (welcome text, failure notice); never sent upstream.
    pub synthetic: bool,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            synthetic: false,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            synthetic: false,
        }
    }

    /// Bot bubble produced by the client itself.
    pub fn synthetic(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            synthetic: true,
        }
    }
}

/// Convert the UI transcript into the `messages` array of the envelope.
///
/// Synthetic entries and bot bubbles with no text are dropped; order is kept.
pub fn normalize_history(entries: &[TranscriptEntry]) -> Vec<ChatMessage> {
    entries
        .iter()
        .filter(|entry| !entry.synthetic)
        .filter(|entry| !(entry.sender == Sender::Bot && entry.text.trim().is_empty()))
        .map(|entry| {
            let role = match entry.sender {
                Sender::User => Role::User,
                Sender::Bot => Role::Assistant,
            };
            ChatMessage::new(role, entry.text.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_welcome_and_placeholders() {
        let transcript = vec![
            TranscriptEntry::synthetic("Welcome! I can help you find reentry resources."),
            TranscriptEntry::user("I need a job"),
            TranscriptEntry::bot("Here are employment programs..."),
            TranscriptEntry::user("In Oakland?"),
            TranscriptEntry::bot(""),
        ];

        let history = normalize_history(&transcript);
        assert_eq!(
            history,
            vec![
                ChatMessage::user("I need a job"),
                ChatMessage::assistant("Here are employment programs..."),
                ChatMessage::user("In Oakland?"),
            ]
        );
    }

    #[test]
    fn failure_notices_are_not_sent() {
        let transcript = vec![
            TranscriptEntry::user("hello"),
            TranscriptEntry::synthetic("Sorry, something went wrong."),
            TranscriptEntry::user("hello again"),
        ];
        let history = normalize_history(&transcript);
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|m| m.role == Role::User));
    }

    #[test]
    fn empty_transcript_gives_empty_history() {
        assert!(normalize_history(&[]).is_empty());
    }
}
