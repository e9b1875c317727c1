//! Broadcast dispatcher: fans a frame out to every activated connection.
//!
//! Delivery is best-effort and at-most-once. A recipient that is closed or
//! whose writer has gone away is skipped; the remaining recipients still get
//! the frame and the caller never sees the failure.

use std::sync::Arc;

use axum::extract::ws::Utf8Bytes;
use serde::Serialize;

use super::endpoint::Endpoint;
use super::registry::ConnectionRegistry;

/// Cloneable handle over the shared registry.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Serialize `envelope` once and deliver it to every open endpoint.
    ///
    /// Returns the number of endpoints the frame was handed to.
    pub fn broadcast<T: Serialize + ?Sized>(&self, envelope: &T) -> usize {
        match encode(envelope) {
            Some(frame) => self.broadcast_frame(frame),
            None => 0,
        }
    }

    /// Deliver an already encoded frame to every open endpoint.
    pub fn broadcast_frame(&self, frame: Utf8Bytes) -> usize {
        let mut delivered = 0;
        self.registry.for_each_open(|endpoint| {
            // State may have changed since iteration picked this endpoint up;
            // `send` re-checks it.
            match endpoint.send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::debug!(%e, "skipping broadcast recipient"),
            }
        });
        tracing::trace!(recipients = delivered, "broadcast delivered");
        delivered
    }
}

/// Send `envelope` to a single endpoint. A closed endpoint is a no-op.
///
/// Returns whether the frame was queued.
pub fn send_direct<T: Serialize + ?Sized>(endpoint: &Endpoint, envelope: &T) -> bool {
    let Some(frame) = encode(envelope) else {
        return false;
    };
    match endpoint.send(frame) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(%e, "direct reply dropped");
            false
        }
    }
}

fn encode<T: Serialize + ?Sized>(envelope: &T) -> Option<Utf8Bytes> {
    match serde_json::to_string(envelope) {
        Ok(json) => Some(json.into()),
        Err(e) => {
            tracing::error!(?e, "failed to serialize envelope");
            None
        }
    }
}
