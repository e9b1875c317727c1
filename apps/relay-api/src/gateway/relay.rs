//! The relay core shared by every connection task.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Utf8Bytes;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::generation::TextGenerator;

use super::endpoint::Endpoint;
use super::fanout::Dispatcher;
use super::presence::PresenceManager;
use super::registry::ConnectionRegistry;

/// Registry, dispatcher and presence state for one server, plus the
/// generator used for AI replies.
pub struct Relay {
    registry: Arc<ConnectionRegistry>,
    dispatcher: Dispatcher,
    presence: PresenceManager,
    generator: Arc<dyn TextGenerator>,
    generation_timeout: Duration,
}

impl Relay {
    pub fn new(generator: Arc<dyn TextGenerator>, generation_timeout: Duration) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = Dispatcher::new(registry.clone());
        let presence = PresenceManager::new(registry.clone(), dispatcher.clone());
        Self {
            registry,
            dispatcher,
            presence,
            generator,
            generation_timeout,
        }
    }

    /// Allocate an id and outbound queue for a newly accepted connection.
    ///
    /// The endpoint is not registered until it activates.
    pub fn accept(&self) -> (Endpoint, UnboundedReceiver<Utf8Bytes>) {
        Endpoint::channel(self.registry.allocate_id())
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn presence(&self) -> &PresenceManager {
        &self.presence
    }

    pub fn generator(&self) -> Arc<dyn TextGenerator> {
        self.generator.clone()
    }

    pub fn generation_timeout(&self) -> Duration {
        self.generation_timeout
    }
}
