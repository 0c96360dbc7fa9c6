use std::sync::mpsc::{channel, Receiver, Sender};

use bytes::Bytes;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// In-process transport for tests: the send half of an `mpsc` channel.
///
/// Batches arrive on the paired receiver exactly as sent; chunk boundaries
/// are preserved so tests can exercise fragmented delivery deterministically.
pub struct MemoryTransport {
    tx: Sender<Bytes>,
}

impl MemoryTransport {
    /// Create a connected transport/receiver pair.
    pub fn pair() -> (Self, Receiver<Bytes>) {
        let (tx, rx) = channel();
        (Self { tx }, rx)
    }
}

impl Transport for MemoryTransport {
    fn send(&mut self, bytes: Bytes) -> Result<()> {
        self.tx
            .send(bytes)
            .map_err(|_| TransportError::ConnectionClosed)
    }
}
