pub mod envelope;

pub use envelope::{Envelope, MessageBody, MessageKind};
