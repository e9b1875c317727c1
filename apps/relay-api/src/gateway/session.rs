//! Per-connection state owned by the connection task.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;

use crate::error::GenerationError;
use crate::generation::{self, TextGenerator};

use super::endpoint::{ConnectionId, Endpoint};

/// Result of one AI request, handed back to the connection loop.
#[derive(Debug)]
pub struct GenerationOutcome {
    /// The triggering frame as the client sent it.
    pub original: Value,
    pub result: Result<String, GenerationError>,
}

/// State for a single WebSocket connection.
///
/// AI requests run as separate tasks so a slow provider never stalls this
/// connection's reads or anyone else's delivery. Their outcomes are yielded
/// in the order the requests were made, and dropping the session aborts any
/// still in flight.
pub struct GatewaySession {
    endpoint: Endpoint,
    pending: VecDeque<JoinHandle<GenerationOutcome>>,
}

impl GatewaySession {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            pending: VecDeque::new(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.endpoint.id()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Start an AI request for `prompt`.
    pub fn spawn_generation(
        &mut self,
        generator: Arc<dyn TextGenerator>,
        timeout: Duration,
        prompt: String,
        original: Value,
    ) {
        let handle = tokio::spawn(async move {
            let result = generation::generate_with_timeout(generator.as_ref(), &prompt, timeout).await;
            GenerationOutcome { original, result }
        });
        self.pending.push_back(handle);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Wait for the oldest outstanding request. `None` when nothing is pending.
    ///
    /// Cancel-safe: an unfinished request stays queued.
    pub async fn next_generation(&mut self) -> Option<GenerationOutcome> {
        loop {
            let joined = self.pending.front_mut()?.await;
            self.pending.pop_front();
            match joined {
                Ok(outcome) => return Some(outcome),
                Err(e) => {
                    tracing::warn!(?e, connection_id = %self.endpoint.id(), "generation task failed");
                }
            }
        }
    }
}

impl Drop for GatewaySession {
    fn drop(&mut self) {
        for handle in &self.pending {
            handle.abort();
        }
    }
}
