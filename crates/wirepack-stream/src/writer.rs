use bytes::Bytes;
use tracing::trace;
use wirepack_buffers::{BufferListWriter, Writer};
use wirepack_packet::{write_value, Header, ObjectFormat, Value};
use wirepack_transport::{Transport, TransportError};

use crate::error::{Result, StreamError};

/// Default accumulated-size threshold for [`FlushPolicy::Buffered`]: 64 KiB.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 64 * 1024;

/// When accumulated bytes are handed to the transport.
#[derive(Debug, Clone, Copy)]
pub enum FlushPolicy {
    /// Every primitive write goes straight out. No batching, no buffering
    /// latency.
    Direct,
    /// Flush once the outermost composite write completes — N nested writes
    /// become one transport send.
    Delayed,
    /// Like `Delayed`, but also flush mid-composite whenever the buffer
    /// reaches `threshold`, bounding memory growth on deeply nested or very
    /// large values.
    Buffered { threshold: usize },
}

/// A [`Writer`] that forwards accumulated bytes to a transport, keyed on
/// the encoder's context nesting.
///
/// The encoder brackets every frame with `push_context`/`pop_context`;
/// nested frames nest the brackets. Whatever the policy, the outermost
/// `pop_context` always flushes — no bytes are left behind after the last
/// matching pop. Transport failures are captured during encoding and
/// surfaced by [`PacketWriter::send_value`]/[`PacketWriter::flush`].
pub struct PacketWriter<T> {
    transport: T,
    buf: BufferListWriter,
    depth: usize,
    total: usize,
    policy: FlushPolicy,
    error: Option<TransportError>,
}

impl<T: Transport> PacketWriter<T> {
    pub fn direct(transport: T) -> Self {
        Self::with_policy(transport, FlushPolicy::Direct)
    }

    pub fn delayed(transport: T) -> Self {
        Self::with_policy(transport, FlushPolicy::Delayed)
    }

    pub fn buffered(transport: T) -> Self {
        Self::with_policy(
            transport,
            FlushPolicy::Buffered {
                threshold: DEFAULT_FLUSH_THRESHOLD,
            },
        )
    }

    pub fn with_policy(transport: T, policy: FlushPolicy) -> Self {
        Self {
            transport,
            buf: BufferListWriter::new(),
            depth: 0,
            total: 0,
            policy,
            error: None,
        }
    }

    /// Encode one value and hand it to the transport per the flush policy.
    pub fn send_value(&mut self, value: &Value, format: &dyn ObjectFormat) -> Result<Header> {
        let header = write_value(self, value, format)?;
        if let Some(err) = self.error.take() {
            return Err(err.into());
        }
        Ok(header)
    }

    /// Force out anything still buffered.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_now();
        match self.error.take() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Bytes accumulated but not yet handed to the transport.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the writer and return the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn flush_now(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let batch = self.buf.buffer();
        self.buf.reset();
        trace!(len = batch.len(), depth = self.depth, "flushing to transport");
        if let Err(err) = self.transport.send(batch) {
            // Keep the first failure; the caller sees it at the packet level.
            self.error.get_or_insert(err);
        }
    }

    fn after_write(&mut self, written: usize) -> usize {
        self.total += written;
        if matches!(self.policy, FlushPolicy::Direct) {
            self.flush_now();
        }
        self.total
    }
}

impl<T: Transport> Writer for PacketWriter<T> {
    fn write_u8(&mut self, value: u8) -> usize {
        let before = self.buf.len();
        let after = self.buf.write_u8(value);
        self.after_write(after - before)
    }

    fn write_u16(&mut self, value: u16) -> usize {
        let before = self.buf.len();
        let after = self.buf.write_u16(value);
        self.after_write(after - before)
    }

    fn write_u32(&mut self, value: u32) -> usize {
        let before = self.buf.len();
        let after = self.buf.write_u32(value);
        self.after_write(after - before)
    }

    fn write_f64(&mut self, value: f64) -> usize {
        let before = self.buf.len();
        let after = self.buf.write_f64(value);
        self.after_write(after - before)
    }

    fn write_str(&mut self, value: &str) -> usize {
        let before = self.buf.len();
        let after = self.buf.write_str(value);
        self.after_write(after - before)
    }

    fn write_bytes(&mut self, value: Bytes) -> usize {
        let before = self.buf.len();
        let after = self.buf.write_bytes(value);
        self.after_write(after - before)
    }

    fn write_writer(&mut self, other: BufferListWriter) -> usize {
        let before = self.buf.len();
        let after = self.buf.write_writer(other);
        self.after_write(after - before)
    }

    fn push_context(&mut self) {
        self.depth += 1;
    }

    fn pop_context(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        match self.policy {
            FlushPolicy::Direct => {}
            FlushPolicy::Delayed => {
                if self.depth == 0 {
                    self.flush_now();
                }
            }
            FlushPolicy::Buffered { threshold } => {
                if self.depth == 0 || self.buf.len() >= threshold {
                    self.flush_now();
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.total
    }

    fn reset(&mut self) {
        self.buf.reset();
        self.total = 0;
        self.depth = 0;
    }
}
