#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::time;
use tokio_tungstenite::{tungstenite, MaybeTlsStream, WebSocketStream};

use relay_api::config::Config;
use relay_api::error::GenerationError;
use relay_api::generation::TextGenerator;
use relay_api::AppState;

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How a [`ScriptedGenerator`] answers a given prompt.
#[derive(Clone)]
pub enum Script {
    Reply(String),
    Fail,
    /// Wait until [`ScriptedGenerator::release`] is called, then reply.
    Gate(String),
}

/// In-process generator with canned answers per prompt.
pub struct ScriptedGenerator {
    scripts: Mutex<HashMap<String, Script>>,
    prompts: Mutex<Vec<String>>,
    gate: Semaphore,
}

impl ScriptedGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(HashMap::new()),
            prompts: Mutex::new(Vec::new()),
            gate: Semaphore::new(0),
        })
    }

    pub fn on(&self, prompt: &str, script: Script) {
        self.scripts.lock().insert(prompt.to_string(), script);
    }

    /// Let one gated request through.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().push(prompt.to_string());
        let script = self.scripts.lock().get(prompt).cloned();
        match script {
            Some(Script::Reply(text)) => Ok(text),
            Some(Script::Gate(text)) => {
                if let Ok(permit) = self.gate.acquire().await {
                    permit.forget();
                }
                Ok(text)
            }
            Some(Script::Fail) | None => {
                Err(GenerationError::Provider("no scripted reply".to_string()))
            }
        }
    }
}

pub fn test_config() -> Config {
    Config {
        google_api_key: "test-key".to_string(),
        gemini_model: "gemini-1.5-flash".to_string(),
        gemini_api_url: "http://127.0.0.1:9".to_string(),
        generation_timeout: Duration::from_secs(5),
        port: 0,
    }
}

pub fn test_state(generator: Arc<dyn TextGenerator>) -> AppState {
    AppState::new(test_config(), generator)
}

/// Start an actual TCP server for WebSocket testing.
pub async fn start_server(generator: Arc<dyn TextGenerator>) -> (SocketAddr, AppState) {
    let state = test_state(generator);
    let app = relay_api::routes::router().with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

pub async fn connect(addr: SocketAddr) -> Client {
    let url = format!("ws://{addr}/");
    let (ws, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");
    ws
}

pub async fn send_json(ws: &mut Client, value: &Value) {
    ws.send(tungstenite::Message::Text(value.to_string().into()))
        .await
        .expect("ws send");
}

pub async fn send_raw(ws: &mut Client, raw: &str) {
    ws.send(tungstenite::Message::Text(raw.to_string().into()))
        .await
        .expect("ws send");
}

/// Read the next text frame as JSON, failing after 5 seconds.
pub async fn recv_json(ws: &mut Client) -> Value {
    loop {
        let msg = time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timeout waiting for frame")
            .expect("stream ended")
            .expect("ws read error");
        match msg {
            tungstenite::Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("frame is JSON");
            }
            tungstenite::Message::Ping(_) | tungstenite::Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

/// Assert that no text frame arrives within `wait`.
pub async fn expect_silence(ws: &mut Client, wait: Duration) {
    if let Ok(Some(Ok(tungstenite::Message::Text(text)))) = time::timeout(wait, ws.next()).await {
        panic!("expected no frame, got {}", text.as_str());
    }
}

pub fn activation(username: &str) -> Value {
    serde_json::json!({ "username": username, "message": { "type": "system", "text": "Active" } })
}

pub fn chat(username: &str, text: &str) -> Value {
    serde_json::json!({ "username": username, "message": { "type": "text", "text": text } })
}

/// Connect and activate, consuming the caller's own join announcement.
pub async fn join(addr: SocketAddr, username: &str) -> Client {
    let mut ws = connect(addr).await;
    send_json(&mut ws, &activation(username)).await;
    let joined = recv_json(&mut ws).await;
    assert_eq!(joined["username"], "System");
    ws
}

/// Wait until the server has processed `n` activations/disconnects.
pub async fn wait_for_user_count(state: &AppState, n: i64) {
    time::timeout(Duration::from_secs(5), async {
        while state.relay.presence().user_count() != n {
            time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("user count never settled");
}
