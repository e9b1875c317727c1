pub mod endpoint;
pub mod events;
pub mod fanout;
pub mod handler;
pub mod presence;
pub mod registry;
pub mod relay;
pub mod routing;
pub mod server;
pub mod session;

pub use relay::Relay;
