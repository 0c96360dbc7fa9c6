use std::io::{ErrorKind, Write};

use bytes::Bytes;
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Adapts any blocking `Write` stream into a [`Transport`].
///
/// Retries `Interrupted` and `WouldBlock`, and maps a zero-length write to
/// `ConnectionClosed` — a stream that accepts nothing is gone, not slow.
pub struct StreamTransport<W> {
    inner: W,
}

impl<W: Write> StreamTransport<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the transport and return the inner stream.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl<W: Write> Transport for StreamTransport<W> {
    fn send(&mut self, bytes: Bytes) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => return Err(TransportError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        trace!(len = bytes.len(), "sent batch");
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sends_all_bytes() {
        let mut transport = StreamTransport::new(Vec::new());
        transport.send(Bytes::from_static(b"hello")).unwrap();
        transport.send(Bytes::from_static(b" world")).unwrap();
        assert_eq!(transport.into_inner(), b"hello world");
    }

    #[test]
    fn retries_interrupted_write() {
        struct InterruptOnce {
            tripped: bool,
            data: Vec<u8>,
        }

        impl Write for InterruptOnce {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if !self.tripped {
                    self.tripped = true;
                    return Err(std::io::Error::from(ErrorKind::Interrupted));
                }
                self.data.extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut transport = StreamTransport::new(InterruptOnce {
            tripped: false,
            data: Vec::new(),
        });
        transport.send(Bytes::from_static(b"retry")).unwrap();
        assert_eq!(transport.into_inner().data, b"retry");
    }

    #[test]
    fn zero_write_is_connection_closed() {
        struct ZeroWriter;

        impl Write for ZeroWriter {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Ok(0)
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut transport = StreamTransport::new(ZeroWriter);
        let err = transport.send(Bytes::from_static(b"x")).unwrap_err();
        assert!(matches!(err, TransportError::ConnectionClosed));
    }
}
