use bytes::Bytes;

use crate::list_writer::BufferListWriter;
use crate::traits::Writer;

/// Size-only writer: accumulates a byte count, stores nothing.
///
/// Lets an encoder precompute a dynamic frame's content size by running the
/// same write sequence it will later replay against a real sink.
#[derive(Debug, Default)]
pub struct LengthWriter {
    total: usize,
}

impl LengthWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Writer for LengthWriter {
    fn write_u8(&mut self, _value: u8) -> usize {
        self.total += 1;
        self.total
    }

    fn write_u16(&mut self, _value: u16) -> usize {
        self.total += 2;
        self.total
    }

    fn write_u32(&mut self, _value: u32) -> usize {
        self.total += 4;
        self.total
    }

    fn write_f64(&mut self, _value: f64) -> usize {
        self.total += 8;
        self.total
    }

    fn write_str(&mut self, value: &str) -> usize {
        self.total += value.len();
        self.total
    }

    fn write_bytes(&mut self, value: Bytes) -> usize {
        self.total += value.len();
        self.total
    }

    fn write_writer(&mut self, other: BufferListWriter) -> usize {
        self.total += other.len();
        self.total
    }

    fn len(&self) -> usize {
        self.total
    }

    fn reset(&mut self) {
        self.total = 0;
    }
}
