//! Envelopes the server originates, and the texts they carry.

use relay_common::envelope::sender;
use relay_common::Envelope;

// ---------------------------------------------------------------------------
// Localized texts
// ---------------------------------------------------------------------------

pub const JOINED_SUFFIX: &str = "bergabung dalam chat";
pub const LEFT_SUFFIX: &str = "meninggalkan chat";
pub const GENERATION_FAILED_TEXT: &str = "Maaf, terjadi kesalahan saat memproses permintaan AI";

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Broadcast after `username` activates.
pub fn joined(username: &str, user_count: i64) -> Envelope {
    Envelope::presence(format!("{username} {JOINED_SUFFIX}"), user_count)
}

/// Broadcast after an activated `username` disconnects.
pub fn left(username: &str, user_count: i64) -> Envelope {
    Envelope::presence(format!("{username} {LEFT_SUFFIX}"), user_count)
}

/// The generated answer, attributed to the AI.
pub fn ai_reply(text: impl Into<String>) -> Envelope {
    Envelope::text(sender::AI, text)
}

/// Sent privately to the asker when generation fails.
pub fn generation_failed() -> Envelope {
    Envelope::text(sender::SYSTEM, GENERATION_FAILED_TEXT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joined_matches_wire_shape() {
        let json = serde_json::to_value(joined("Alice", 1)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "username": "System",
                "userCount": 1,
                "message": { "text": "Alice bergabung dalam chat", "type": "text" }
            })
        );
    }

    #[test]
    fn left_carries_count() {
        let env = left("Alice", 0);
        assert_eq!(env.user_count, Some(0));
        assert_eq!(env.message.text, "Alice meninggalkan chat");
    }

    #[test]
    fn failure_has_no_user_count() {
        let env = generation_failed();
        assert_eq!(env.username, "System");
        assert!(env.user_count.is_none());
    }
}
