use std::time::Duration;

use thiserror::Error;

use crate::gateway::endpoint::ConnectionId;

/// Why a call to the text generation provider produced no reply.
///
/// Every variant is handled the same way by the relay: the sender gets a
/// private apology and nothing is broadcast.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("provider error: {0}")]
    Provider(String),

    #[error("provider response contained no text")]
    MalformedResponse,

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
}

/// An inbound frame that cannot be routed. Logged and dropped.
#[derive(Debug, Error)]
pub enum MalformedInput {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("payload is not a chat envelope: {0}")]
    InvalidShape(#[source] serde_json::Error),

    #[error("binary frame is not valid UTF-8")]
    NotUtf8,
}

/// A single recipient could not be handed a frame.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("connection {0} is not open")]
    NotOpen(ConnectionId),

    #[error("connection {0} writer has shut down")]
    WriterGone(ConnectionId),
}
