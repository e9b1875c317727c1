//! Join/leave transitions and the process-wide presence counter.
//!
//! Per connection: `Connected → Active → Disconnected`. Only the manager
//! touches the counter, and it does so under one lock together with the
//! registry change so concurrent joins and leaves cannot lose updates.

use std::sync::Arc;

use parking_lot::Mutex;

use super::endpoint::{ConnectionId, Endpoint};
use super::events;
use super::fanout::Dispatcher;
use super::registry::ConnectionRegistry;

pub struct PresenceManager {
    registry: Arc<ConnectionRegistry>,
    dispatcher: Dispatcher,
    user_count: Mutex<i64>,
}

impl PresenceManager {
    pub fn new(registry: Arc<ConnectionRegistry>, dispatcher: Dispatcher) -> Self {
        Self {
            registry,
            dispatcher,
            user_count: Mutex::new(0),
        }
    }

    /// `Connected → Active`. Registers the endpoint under `username`, bumps
    /// the counter and announces the join. Returns the new count.
    ///
    /// Activating an already active endpoint counts it again.
    pub fn activate(&self, endpoint: &Endpoint, username: &str) -> i64 {
        let mut count = self.user_count.lock();
        self.registry.register(endpoint.clone(), username.to_string());
        *count += 1;

        // Announce under the lock so counts reach clients in order.
        let recipients = self.dispatcher.broadcast(&events::joined(username, *count));
        tracing::info!(
            connection_id = %endpoint.id(),
            %username,
            user_count = *count,
            recipients,
            "joined the chat"
        );
        *count
    }

    /// `Active → Disconnected`. Returns the new count, or `None` if the
    /// connection never activated (nothing is announced in that case).
    pub fn disconnect(&self, id: ConnectionId) -> Option<i64> {
        let mut count = self.user_count.lock();
        let Some(username) = self.registry.unregister(id) else {
            tracing::debug!(connection_id = %id, "unactivated connection closed");
            return None;
        };
        *count -= 1;

        let recipients = self.dispatcher.broadcast(&events::left(&username, *count));
        tracing::info!(
            connection_id = %id,
            %username,
            user_count = *count,
            recipients,
            "disconnected"
        );
        Some(*count)
    }

    pub fn user_count(&self) -> i64 {
        *self.user_count.lock()
    }
}
