//! Inbound frame dispatch: activation, plain chat and AI requests.

use crate::error::MalformedInput;

use super::events;
use super::fanout::send_direct;
use super::relay::Relay;
use super::routing::{self, Route};
use super::session::{GatewaySession, GenerationOutcome};

/// Handle one text frame from the client.
///
/// Malformed frames are logged and dropped; the connection stays open.
pub fn handle_frame(relay: &Relay, session: &mut GatewaySession, raw: &str) {
    let route = match routing::classify(raw) {
        Ok(route) => route,
        Err(e) => {
            reject(session, &e);
            return;
        }
    };

    match route {
        Route::Activate { username } => {
            relay.presence().activate(session.endpoint(), &username);
        }
        Route::Generate { prompt, original } => {
            tracing::debug!(connection_id = %session.id(), "AI request queued");
            session.spawn_generation(
                relay.generator(),
                relay.generation_timeout(),
                prompt,
                original,
            );
        }
        Route::Chat { original } => {
            relay.dispatcher().broadcast(&original);
        }
    }
}

/// Handle a binary frame. Only UTF-8 payloads are accepted.
pub fn handle_binary(relay: &Relay, session: &mut GatewaySession, bytes: &[u8]) {
    match std::str::from_utf8(bytes) {
        Ok(raw) => handle_frame(relay, session, raw),
        Err(_) => reject(session, &MalformedInput::NotUtf8),
    }
}

/// Deliver the result of an AI request.
///
/// On success everyone sees the question, then the answer. On failure only
/// the asker hears about it, and nothing is broadcast.
pub fn complete_generation(relay: &Relay, session: &GatewaySession, outcome: GenerationOutcome) {
    match outcome.result {
        Ok(reply) => {
            let dispatcher = relay.dispatcher();
            dispatcher.broadcast(&outcome.original);
            dispatcher.broadcast(&events::ai_reply(reply));
        }
        Err(e) => {
            tracing::error!(%e, connection_id = %session.id(), "error generating AI response");
            send_direct(session.endpoint(), &events::generation_failed());
        }
    }
}

/// Tear down after the transport closed or errored.
pub fn handle_disconnect(relay: &Relay, session: &GatewaySession) {
    session.endpoint().close();
    relay.presence().disconnect(session.id());
}

fn reject(session: &GatewaySession, error: &MalformedInput) {
    tracing::warn!(%error, connection_id = %session.id(), "dropping malformed frame");
}
