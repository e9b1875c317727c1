//! WebSocket upgrade handler and per-connection event loop.

use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::routes::health;
use crate::AppState;

use super::endpoint::{Liveness, LivenessFlag};
use super::handler;
use super::relay::Relay;
use super::session::GatewaySession;

/// Chat clients connect to `/` directly; `/gateway` is an explicit alias.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/gateway", get(ws_upgrade))
}

/// Upgrade WebSocket requests, greet everything else.
async fn root(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<AppState>,
) -> Response {
    match ws {
        Ok(ws) => upgrade(ws, state.relay),
        Err(_) => health::greeting().await.into_response(),
    }
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    upgrade(ws, state.relay)
}

fn upgrade(ws: WebSocketUpgrade, relay: Arc<Relay>) -> Response {
    ws.on_upgrade(move |socket| handle_connection(socket, relay))
}

async fn handle_connection(socket: WebSocket, relay: Arc<Relay>) {
    let (ws_tx, mut ws_rx) = socket.split();
    let (endpoint, outbound) = relay.accept();
    let connection_id = endpoint.id();
    tracing::info!(%connection_id, "client connected");

    let writer = tokio::spawn(write_frames(ws_tx, outbound, endpoint.liveness_flag()));
    let mut session = GatewaySession::new(endpoint);

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handler::handle_frame(&relay, &mut session, text.as_str());
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        handler::handle_binary(&relay, &mut session, &bytes);
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => {
                        session.endpoint().begin_close();
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::debug!(?e, %connection_id, "ws read error");
                        break;
                    }
                }
            }

            Some(outcome) = session.next_generation(), if session.has_pending() => {
                handler::complete_generation(&relay, &session, outcome);
            }
        }
    }

    handler::handle_disconnect(&relay, &session);
    // Aborts any AI requests still in flight for this connection.
    drop(session);
    writer.abort();

    tracing::info!(%connection_id, "connection closed");
}

/// Drain the endpoint's queue into the socket until either side goes away.
async fn write_frames(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut outbound: UnboundedReceiver<Utf8Bytes>,
    liveness: LivenessFlag,
) {
    while let Some(frame) = outbound.recv().await {
        if ws_tx.send(Message::Text(frame)).await.is_err() {
            liveness.advance(Liveness::Closed);
            break;
        }
    }
}
