use bytes::Bytes;

use crate::error::{BufferError, Result};
use crate::traits::Reader;

/// Flat cursor over one contiguous buffer.
///
/// `read_bytes` returns zero-copy subviews of the backing buffer.
#[derive(Debug)]
pub struct BufferReader {
    buf: Bytes,
    offset: usize,
    contexts: Vec<usize>,
}

impl BufferReader {
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self {
            buf: buf.into(),
            offset: 0,
            contexts: Vec::new(),
        }
    }

    fn eof_error(&self, needed: usize) -> BufferError {
        BufferError::UnexpectedEof {
            needed,
            available: self.remaining(),
        }
    }
}

impl Reader for BufferReader {
    fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        if self.check_eof(len) {
            return Err(self.eof_error(len));
        }
        let out = self.buf.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(out)
    }

    fn slice(&mut self, len: usize) -> Result<Bytes> {
        if self.check_eof(len) {
            return Err(self.eof_error(len));
        }
        let out = Bytes::copy_from_slice(&self.buf[self.offset..self.offset + len]);
        self.offset += len;
        Ok(out)
    }

    fn check_eof(&self, n: usize) -> bool {
        self.remaining() < n
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        if self.check_eof(n) {
            return Err(self.eof_error(n));
        }
        self.offset += n;
        Ok(())
    }

    fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.buf.len() {
            return Err(BufferError::SeekOutOfRange {
                offset,
                len: self.buf.len(),
            });
        }
        self.offset = offset;
        Ok(())
    }

    fn position(&self) -> usize {
        self.offset
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    fn pushd(&mut self) {
        self.contexts.push(self.offset);
    }

    fn popd(&mut self) {
        if let Some(saved) = self.contexts.pop() {
            self.offset = saved;
        }
    }

    fn forget(&mut self) {
        self.contexts.pop();
    }

    fn reduce(&mut self) {
        // Single allocation; nothing to reclaim piecewise.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_advance_the_cursor() {
        let mut reader = BufferReader::new(Bytes::from_static(&[
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
        ]));
        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_u16().unwrap(), 0x0302);
        assert_eq!(reader.read_u32().unwrap(), 0x0706_0504);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn read_bytes_is_zero_copy() {
        let backing = Bytes::from_static(b"0123456789");
        let mut reader = BufferReader::new(backing.clone());
        reader.skip(2).unwrap();
        let view = reader.read_bytes(4).unwrap();
        assert_eq!(view.as_ref(), b"2345");
        assert_eq!(view.as_ptr(), backing[2..].as_ptr());
    }

    #[test]
    fn eof_is_reported_not_truncated() {
        let mut reader = BufferReader::new(Bytes::from_static(b"ab"));
        let err = reader.read_u32().unwrap_err();
        assert!(matches!(
            err,
            BufferError::UnexpectedEof {
                needed: 4,
                available: 2
            }
        ));
        // Failed read must not move the cursor.
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn context_stack_restores_position() {
        let mut reader = BufferReader::new(Bytes::from_static(b"abcdef"));
        reader.skip(1).unwrap();
        reader.pushd();
        reader.read_bytes(3).unwrap();
        reader.popd();
        assert_eq!(reader.position(), 1);
        assert_eq!(reader.read_str(2).unwrap(), "bc");
    }

    #[test]
    fn seek_out_of_range_is_hard_error() {
        let mut reader = BufferReader::new(Bytes::from_static(b"abc"));
        assert!(matches!(
            reader.seek(4),
            Err(BufferError::SeekOutOfRange { offset: 4, len: 3 })
        ));
        reader.seek(3).unwrap();
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn invalid_utf8_string_read() {
        let mut reader = BufferReader::new(Bytes::from_static(&[0xFF, 0xFE]));
        assert!(matches!(reader.read_str(2), Err(BufferError::Utf8(_))));
    }
}
