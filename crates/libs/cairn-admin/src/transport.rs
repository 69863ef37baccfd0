//! Transport seam.
//!
//! The physical link (Bluetooth, USB serial, TCP) frames and moves whole
//! encoded [`MeshPacket`](cairn_proto::MeshPacket) buffers; this layer
//! only needs a way to hand buffers down and a stream of buffers coming
//! back up. Nothing here is reliable or ordered — that is the point.

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Errors from the physical link.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransportError {
    #[error("transport closed")]
    Closed,

    #[error("transport send failed: {0}")]
    Send(String),
}

/// Outbound half of the link: accepts one encoded packet per call, with
/// no delivery or ordering guarantee.
#[async_trait]
pub trait MeshTransport: Send + Sync + 'static {
    async fn send_frame(&self, frame: Vec<u8>) -> Result<(), TransportError>;
}

/// A channel-backed transport for tests and in-process wiring: outbound
/// frames are pushed into an unbounded queue the other side drains.
#[derive(Debug)]
pub struct ChannelTransport {
    outbound: mpsc::UnboundedSender<Vec<u8>>,
}

impl ChannelTransport {
    /// Returns the transport and the receiving end of its outbound queue.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        (Self { outbound }, rx)
    }
}

#[async_trait]
impl MeshTransport for ChannelTransport {
    async fn send_frame(&self, frame: Vec<u8>) -> Result<(), TransportError> {
        self.outbound.send(frame).map_err(|_| TransportError::Closed)
    }
}
