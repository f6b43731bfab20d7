//! Conversation entities shared by the outbound envelope and the UI log.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque key correlating every turn of one dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap a previously persisted identity. Blank input is rejected.
    pub fn recover(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Speaker of a history entry on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Text block inside a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentText {
    pub text: String,
}

/// One prior turn as the backend expects it:
/// `{"role": "user", "content": [{"text": "..."}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentText>,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentText { text: text.into() }],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// Text of the last content block, if any.
    pub fn text(&self) -> Option<&str> {
        self.content.last().map(|c| c.text.as_str())
    }
}

/// Optional profile gathered during onboarding.
///
/// Sent with every turn so answers can be tailored (county resources,
/// age-specific programs). Absent fields are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(rename = "age18Plus", skip_serializing_if = "Option::is_none")]
    pub age_18_plus: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl UserInfo {
    /// True when no profile field is filled in.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generated_ids_are_distinct() {
        let a = ConversationId::generate();
        let b = ConversationId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn recover_rejects_blank_values() {
        assert!(ConversationId::recover("   ").is_none());
        assert_eq!(
            ConversationId::recover(" conv-7 \n").unwrap().as_str(),
            "conv-7"
        );
    }

    #[test]
    fn chat_message_wire_shape() {
        let value = serde_json::to_value(ChatMessage::assistant("Hello")).unwrap();
        assert_eq!(
            value,
            json!({"role": "assistant", "content": [{"text": "Hello"}]})
        );
    }

    #[test]
    fn user_info_uses_camel_case_and_omits_missing() {
        let info = UserInfo {
            county: Some("Alameda".into()),
            age_18_plus: Some(true),
            release_date: Some("2025-03-01".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(
            value,
            json!({"county": "Alameda", "releaseDate": "2025-03-01", "age18Plus": true})
        );
        assert!(UserInfo::default().is_empty());
        assert!(!info.is_empty());
    }
}
