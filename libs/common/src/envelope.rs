//! Wire format shared by the relay server and its clients.
//!
//! Every frame exchanged over the chat socket is one JSON envelope:
//!
//! ```json
//! { "username": "Alice", "message": { "type": "text", "text": "hi" } }
//! ```
//!
//! Presence announcements additionally carry a top-level `userCount`.

use serde::{Deserialize, Serialize};

/// Text a client sends with `type: "system"` to announce itself.
pub const ACTIVATION_TEXT: &str = "Active";

/// Display names the server itself speaks under.
pub mod sender {
    pub const SYSTEM: &str = "System";
    pub const AI: &str = "AI";
}

/// The `message.type` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    System,
    Text,
}

/// The inner `message` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub text: String,
}

/// One chat frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub username: String,
    /// Number of active users; only present on presence announcements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_count: Option<i64>,
    pub message: MessageBody,
}

impl Envelope {
    /// A plain text envelope attributed to `username`.
    pub fn text(username: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            user_count: None,
            message: MessageBody {
                kind: MessageKind::Text,
                text: text.into(),
            },
        }
    }

    /// A presence announcement from the server with the current user count.
    ///
    /// The body is typed `text` so clients render it inline with chat.
    pub fn presence(text: impl Into<String>, user_count: i64) -> Self {
        Self {
            user_count: Some(user_count),
            ..Self::text(sender::SYSTEM, text)
        }
    }

    /// The frame a client sends to join the chat under `username`.
    pub fn activation(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            user_count: None,
            message: MessageBody {
                kind: MessageKind::System,
                text: ACTIVATION_TEXT.to_string(),
            },
        }
    }

    /// Whether this is a join announcement (`{type: "system", text: "Active"}`).
    pub fn is_activation(&self) -> bool {
        self.message.kind == MessageKind::System && self.message.text == ACTIVATION_TEXT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_serializes_user_count_between_username_and_message() {
        let env = Envelope::presence("Alice joined", 1);
        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(
            json,
            r#"{"username":"System","userCount":1,"message":{"type":"text","text":"Alice joined"}}"#
        );
    }

    #[test]
    fn chat_envelope_omits_user_count() {
        let json = serde_json::to_value(Envelope::text("Bob", "hey")).unwrap();
        assert!(json.get("userCount").is_none());
        assert_eq!(json["message"]["type"], "text");
    }

    #[test]
    fn activation_is_recognised() {
        assert!(Envelope::activation("Alice").is_activation());
        assert!(!Envelope::text("Alice", "Active").is_activation());

        let mut env = Envelope::activation("Alice");
        env.message.text = "active".to_string();
        assert!(!env.is_activation());
    }

    #[test]
    fn rejects_unknown_message_type() {
        let raw = r#"{"username":"a","message":{"type":"image","text":"x"}}"#;
        assert!(serde_json::from_str::<Envelope>(raw).is_err());
    }

    #[test]
    fn rejects_missing_text() {
        let raw = r#"{"username":"a","message":{"type":"text"}}"#;
        assert!(serde_json::from_str::<Envelope>(raw).is_err());
    }
}
