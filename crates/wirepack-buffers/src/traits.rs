use bytes::Bytes;

use crate::error::Result;
use crate::list_writer::BufferListWriter;

/// Sequential byte sink.
///
/// Every `write_*` method returns the new total written length. Composite
/// encoders bracket each atomic unit with `push_context`/`pop_context`;
/// plain in-memory sinks ignore the signal, transport-buffered sinks use it
/// to decide when to flush.
pub trait Writer {
    /// Append one byte.
    fn write_u8(&mut self, value: u8) -> usize;

    /// Append a `u16`, little-endian.
    fn write_u16(&mut self, value: u16) -> usize;

    /// Append a `u32`, little-endian.
    fn write_u32(&mut self, value: u32) -> usize;

    /// Append an IEEE-754 double, little-endian.
    fn write_f64(&mut self, value: f64) -> usize;

    /// Append a string's UTF-8 bytes.
    fn write_str(&mut self, value: &str) -> usize;

    /// Append an owned buffer. Fragment-list sinks take the buffer as-is,
    /// without copying.
    fn write_bytes(&mut self, value: Bytes) -> usize;

    /// Append a sequence of owned buffers.
    fn write_fragments(&mut self, fragments: &[Bytes]) -> usize {
        let mut len = self.len();
        for fragment in fragments {
            len = self.write_bytes(fragment.clone());
        }
        len
    }

    /// Append everything another writer has accumulated.
    fn write_writer(&mut self, other: BufferListWriter) -> usize;

    /// Enter one level of composite nesting.
    fn push_context(&mut self) {}

    /// Leave one level of composite nesting.
    fn pop_context(&mut self) {}

    /// Total bytes written so far.
    fn len(&self) -> usize;

    /// True if nothing has been written.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard all written content.
    fn reset(&mut self);
}

/// Sequential byte source with a save/restore cursor.
///
/// `read_bytes` returns a zero-copy view whenever the requested span lies in
/// one underlying allocation; `slice` always returns an independent copy.
/// Reads past the available data fail with `UnexpectedEof` — incompleteness
/// is signalled, never silently truncated.
pub trait Reader {
    /// Read one byte.
    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a `u16`, little-endian.
    fn read_u16(&mut self) -> Result<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Read a `u32`, little-endian.
    fn read_u32(&mut self) -> Result<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read an IEEE-754 double, little-endian.
    fn read_f64(&mut self) -> Result<f64> {
        let b = self.read_bytes(8)?;
        Ok(f64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Read `len` bytes as a UTF-8 string.
    fn read_str(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Read `len` bytes, zero-copy where the implementation allows it.
    fn read_bytes(&mut self, len: usize) -> Result<Bytes>;

    /// Read `len` bytes as an independent materialized copy.
    fn slice(&mut self, len: usize) -> Result<Bytes>;

    /// True if fewer than `n` bytes remain from the current offset.
    fn check_eof(&self, n: usize) -> bool;

    /// Advance the cursor `n` bytes without materializing anything.
    fn skip(&mut self, n: usize) -> Result<()>;

    /// Move the cursor to an absolute offset.
    fn seek(&mut self, offset: usize) -> Result<()>;

    /// Current absolute offset.
    fn position(&self) -> usize;

    /// Bytes remaining from the current offset.
    fn remaining(&self) -> usize;

    /// Save the cursor onto the context stack.
    fn pushd(&mut self);

    /// Pop the most recent saved cursor and restore it.
    fn popd(&mut self);

    /// Pop the most recent saved cursor without moving.
    fn forget(&mut self);

    /// Reclaim storage the cursor has fully passed. Never changes the result
    /// of any subsequent read.
    fn reduce(&mut self);
}
