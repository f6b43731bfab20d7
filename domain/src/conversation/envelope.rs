//! Outbound request envelope, sent once per turn.

use super::entities::{ChatMessage, ConversationId, UserInfo};
use serde::Serialize;

/// Route key the chat backend dispatches on.
pub const SEND_MESSAGE_ACTION: &str = "sendMessage";

/// A conversation turn as submitted by the caller.
///
/// `history` is taken as-is; it is already normalized and normally ends with
/// the new user utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnRequest {
    pub message: String,
    pub history: Vec<ChatMessage>,
    pub user_info: Option<UserInfo>,
}

impl TurnRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_user_info(mut self, user_info: Option<UserInfo>) -> Self {
        self.user_info = user_info;
        self
    }
}

/// Wire envelope:
/// `{"action", "message", "messages", "conversationId", "userInfo"}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEnvelope<'a> {
    pub action: &'static str,
    pub message: &'a str,
    pub messages: &'a [ChatMessage],
    pub conversation_id: &'a ConversationId,
    pub user_info: Option<&'a UserInfo>,
}

impl<'a> OutboundEnvelope<'a> {
    pub fn new(request: &'a TurnRequest, conversation_id: &'a ConversationId) -> Self {
        Self {
            action: SEND_MESSAGE_ACTION,
            message: &request.message,
            messages: &request.history,
            conversation_id,
            user_info: request.user_info.as_ref(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn envelope_carries_every_field() {
        let request = TurnRequest::new("Where can I find housing?")
            .with_history(vec![
                ChatMessage::user("Hi"),
                ChatMessage::assistant("Hello! How can I help?"),
                ChatMessage::user("Where can I find housing?"),
            ])
            .with_user_info(Some(UserInfo {
                county: Some("Marin".into()),
                ..Default::default()
            }));
        let id = ConversationId::recover("conv-1").unwrap();

        let json: Value =
            serde_json::from_str(&OutboundEnvelope::new(&request, &id).to_json().unwrap())
                .unwrap();
        assert_eq!(json["action"], "sendMessage");
        assert_eq!(json["message"], "Where can I find housing?");
        assert_eq!(json["conversationId"], "conv-1");
        assert_eq!(json["userInfo"], json!({"county": "Marin"}));
        assert_eq!(json["messages"].as_array().unwrap().len(), 3);
        assert_eq!(json["messages"][1]["role"], "assistant");
    }

    #[test]
    fn missing_profile_serializes_as_null() {
        let request = TurnRequest::new("hello");
        let id = ConversationId::recover("c").unwrap();
        let json = serde_json::to_value(OutboundEnvelope::new(&request, &id)).unwrap();
        assert!(json["userInfo"].is_null());
        assert_eq!(json["messages"], json!([]));
    }
}
