//! Outbound half of a single chat connection.
//!
//! The socket writer runs in its own task and drains an unbounded queue, so
//! handing a frame to an [`Endpoint`] never waits on the network.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use axum::extract::ws::Utf8Bytes;
use tokio::sync::mpsc;

use crate::error::DeliveryError;

/// Stable per-connection id, assigned at accept time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Liveness {
    Open = 0,
    Closing = 1,
    Closed = 2,
}

impl Liveness {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Liveness::Open,
            1 => Liveness::Closing,
            _ => Liveness::Closed,
        }
    }
}

/// Shared liveness cell. Cloned into the writer task so it can mark the
/// connection closed without holding a sender.
#[derive(Debug, Clone)]
pub struct LivenessFlag(Arc<AtomicU8>);

impl LivenessFlag {
    fn new() -> Self {
        Self(Arc::new(AtomicU8::new(Liveness::Open as u8)))
    }

    pub fn get(&self) -> Liveness {
        Liveness::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move towards `Closed`. Never reopens.
    pub fn advance(&self, to: Liveness) {
        self.0.fetch_max(to as u8, Ordering::AcqRel);
    }
}

/// Handle for delivering frames to one connection.
#[derive(Debug, Clone)]
pub struct Endpoint {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Utf8Bytes>,
    liveness: LivenessFlag,
}

impl Endpoint {
    /// Create an endpoint and the queue its writer task drains.
    pub fn channel(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<Utf8Bytes>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let endpoint = Self {
            id,
            tx,
            liveness: LivenessFlag::new(),
        };
        (endpoint, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness.get()
    }

    pub fn liveness_flag(&self) -> LivenessFlag {
        self.liveness.clone()
    }

    pub fn is_open(&self) -> bool {
        self.liveness() == Liveness::Open
    }

    /// Queue a frame. Checks liveness at the moment of the send.
    pub fn send(&self, frame: Utf8Bytes) -> Result<(), DeliveryError> {
        if !self.is_open() {
            return Err(DeliveryError::NotOpen(self.id));
        }
        self.tx.send(frame).map_err(|_| {
            self.liveness.advance(Liveness::Closed);
            DeliveryError::WriterGone(self.id)
        })
    }

    /// The peer asked to close; stop accepting frames.
    pub fn begin_close(&self) {
        self.liveness.advance(Liveness::Closing);
    }

    pub fn close(&self) {
        self.liveness.advance(Liveness::Closed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_queues_frame_while_open() {
        let (endpoint, mut rx) = Endpoint::channel(ConnectionId::new(1));
        endpoint.send(Utf8Bytes::from("hello")).unwrap();
        assert_eq!(rx.try_recv().unwrap().as_str(), "hello");
    }

    #[test]
    fn send_fails_once_closing() {
        let (endpoint, mut rx) = Endpoint::channel(ConnectionId::new(1));
        endpoint.begin_close();
        assert_eq!(endpoint.liveness(), Liveness::Closing);
        assert_eq!(
            endpoint.send(Utf8Bytes::from("x")),
            Err(DeliveryError::NotOpen(ConnectionId::new(1)))
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_writer_marks_endpoint_closed() {
        let (endpoint, rx) = Endpoint::channel(ConnectionId::new(7));
        drop(rx);
        assert_eq!(
            endpoint.send(Utf8Bytes::from("x")),
            Err(DeliveryError::WriterGone(ConnectionId::new(7)))
        );
        assert_eq!(endpoint.liveness(), Liveness::Closed);
    }

    #[test]
    fn liveness_never_moves_backwards() {
        let (endpoint, _rx) = Endpoint::channel(ConnectionId::new(1));
        endpoint.close();
        endpoint.begin_close();
        assert_eq!(endpoint.liveness(), Liveness::Closed);
    }

    #[test]
    fn clones_share_liveness() {
        let (endpoint, _rx) = Endpoint::channel(ConnectionId::new(1));
        let flag = endpoint.liveness_flag();
        let copy = endpoint.clone();
        flag.advance(Liveness::Closed);
        assert!(!copy.is_open());
    }

    #[test]
    fn connection_id_display() {
        assert_eq!(ConnectionId::new(42).to_string(), "conn-42");
    }
}
