use bytes::Bytes;

use crate::error::{Result, TransportError};

/// The send half of a transport as seen by the codec.
///
/// Implementations own delivery: the codec hands over one `Bytes` batch and
/// assumes the transport either accepts all of it or fails the call.
pub trait Transport {
    /// Hand a batch of bytes to the transport.
    fn send(&mut self, bytes: Bytes) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, bytes: Bytes) -> Result<()> {
        (**self).send(bytes)
    }
}

/// The receive half of a transport as seen by the codec.
///
/// Whoever pumps the connection translates its notifications into these
/// events, in arrival order. `Data` chunks may split frames at arbitrary
/// byte boundaries; the streaming decoder reassembles them.
#[derive(Debug)]
pub enum TransportEvent {
    /// A chunk of bytes arrived.
    Data(Bytes),
    /// The peer closed the connection.
    Closed,
    /// The transport failed; no further events will follow.
    Error(TransportError),
}
