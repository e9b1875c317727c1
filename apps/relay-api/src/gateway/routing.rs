//! Inbound frame classification.

use relay_common::{Envelope, MessageKind};
use serde::Deserialize;
use serde_json::Value;

use crate::error::MalformedInput;

/// What to do with one inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// `{type: "system", text: "Active"}`: join under `username`. Not rebroadcast.
    Activate { username: String },
    /// Text mentioning the AI: ask the generator, then broadcast.
    Generate { prompt: String, original: Value },
    /// Everything else: rebroadcast as received.
    Chat { original: Value },
}

/// Parse and classify a raw frame.
///
/// `original` is the client's JSON object as sent, so rebroadcasts keep any
/// extra fields.
pub fn classify(raw: &str) -> Result<Route, MalformedInput> {
    let original: Value = serde_json::from_str(raw).map_err(MalformedInput::InvalidJson)?;
    let envelope = Envelope::deserialize(&original).map_err(MalformedInput::InvalidShape)?;

    if envelope.is_activation() {
        return Ok(Route::Activate {
            username: envelope.username,
        });
    }

    if envelope.message.kind == MessageKind::Text && is_ai_trigger(&envelope.message.text) {
        return Ok(Route::Generate {
            prompt: envelope.message.text,
            original,
        });
    }

    Ok(Route::Chat { original })
}

/// True when `text` contains the letters "ai" in any case, anywhere.
///
/// This is a plain substring match, not a command: "Aiming", "Aisha" and
/// "said" all trigger.
pub fn is_ai_trigger(text: &str) -> bool {
    text.to_uppercase().contains("AI")
}
