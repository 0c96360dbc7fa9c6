use bytes::{BufMut, Bytes, BytesMut};

use crate::list_writer::BufferListWriter;
use crate::traits::Writer;

/// Writer over one pre-sized allocation at an advancing offset.
///
/// Used to build small frames whose total size is known up front — booleans,
/// numbers, dates — as a single allocation instead of one per field.
///
/// # Panics
///
/// Writes that would exceed the declared capacity panic; the capacity is
/// computed from the frame's header record before construction, so an
/// overflow is a caller bug, not a runtime condition.
#[derive(Debug)]
pub struct FixedWriter {
    buf: BytesMut,
    capacity: usize,
}

impl FixedWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    fn ensure(&self, extra: usize) {
        assert!(
            self.buf.len() + extra <= self.capacity,
            "fixed writer overflow ({} + {extra} > {})",
            self.buf.len(),
            self.capacity
        );
    }

    /// Consume the writer, yielding the filled buffer.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Writer for FixedWriter {
    fn write_u8(&mut self, value: u8) -> usize {
        self.ensure(1);
        self.buf.put_u8(value);
        self.buf.len()
    }

    fn write_u16(&mut self, value: u16) -> usize {
        self.ensure(2);
        self.buf.put_u16_le(value);
        self.buf.len()
    }

    fn write_u32(&mut self, value: u32) -> usize {
        self.ensure(4);
        self.buf.put_u32_le(value);
        self.buf.len()
    }

    fn write_f64(&mut self, value: f64) -> usize {
        self.ensure(8);
        self.buf.put_f64_le(value);
        self.buf.len()
    }

    fn write_str(&mut self, value: &str) -> usize {
        self.ensure(value.len());
        self.buf.put_slice(value.as_bytes());
        self.buf.len()
    }

    fn write_bytes(&mut self, value: Bytes) -> usize {
        self.ensure(value.len());
        self.buf.put_slice(&value);
        self.buf.len()
    }

    fn write_writer(&mut self, other: BufferListWriter) -> usize {
        for fragment in other.into_fragments() {
            self.ensure(fragment.len());
            self.buf.put_slice(&fragment);
        }
        self.buf.len()
    }

    fn len(&self) -> usize {
        self.buf.len()
    }

    fn reset(&mut self) {
        self.buf.clear();
    }
}
