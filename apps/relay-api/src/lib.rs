pub mod config;
pub mod error;
pub mod gateway;
pub mod generation;
pub mod routes;

use std::sync::Arc;

use config::Config;
use gateway::Relay;
use generation::TextGenerator;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(config: Config, generator: Arc<dyn TextGenerator>) -> Self {
        let relay = Relay::new(generator, config.generation_timeout);
        Self {
            config: Arc::new(config),
            relay: Arc::new(relay),
        }
    }
}
