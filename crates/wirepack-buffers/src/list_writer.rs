use bytes::{Bytes, BytesMut};

use crate::traits::Writer;

/// Growable writer backed by an ordered list of owned fragments.
///
/// Fixed-width fields land in small freshly-allocated fragments; caller
/// buffers are appended as-is, never copied. [`BufferListWriter::buffer`]
/// collapses the list into one contiguous buffer on demand and caches the
/// result until the next write invalidates it.
#[derive(Debug, Default)]
pub struct BufferListWriter {
    fragments: Vec<Bytes>,
    total: usize,
    cached: Option<Bytes>,
}

impl BufferListWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_fragment(&mut self, fragment: Bytes) -> usize {
        if !fragment.is_empty() {
            self.total += fragment.len();
            self.fragments.push(fragment);
            self.cached = None;
        }
        self.total
    }

    /// The accumulated fragments, in write order.
    pub fn fragments(&self) -> &[Bytes] {
        &self.fragments
    }

    /// Consume the writer, yielding its fragments without copying.
    pub fn into_fragments(self) -> Vec<Bytes> {
        self.fragments
    }

    /// All written content as one contiguous buffer.
    ///
    /// Concatenates on first call and caches; the cache is dropped by any
    /// subsequent write or [`Writer::reset`].
    pub fn buffer(&mut self) -> Bytes {
        if let Some(cached) = &self.cached {
            return cached.clone();
        }
        let collapsed = if self.fragments.len() == 1 {
            self.fragments[0].clone()
        } else {
            let mut merged = BytesMut::with_capacity(self.total);
            for fragment in &self.fragments {
                merged.extend_from_slice(fragment);
            }
            merged.freeze()
        };
        self.cached = Some(collapsed.clone());
        collapsed
    }
}

impl Writer for BufferListWriter {
    fn write_u8(&mut self, value: u8) -> usize {
        self.push_fragment(Bytes::copy_from_slice(&[value]))
    }

    fn write_u16(&mut self, value: u16) -> usize {
        self.push_fragment(Bytes::copy_from_slice(&value.to_le_bytes()))
    }

    fn write_u32(&mut self, value: u32) -> usize {
        self.push_fragment(Bytes::copy_from_slice(&value.to_le_bytes()))
    }

    fn write_f64(&mut self, value: f64) -> usize {
        self.push_fragment(Bytes::copy_from_slice(&value.to_le_bytes()))
    }

    fn write_str(&mut self, value: &str) -> usize {
        self.push_fragment(Bytes::copy_from_slice(value.as_bytes()))
    }

    fn write_bytes(&mut self, value: Bytes) -> usize {
        self.push_fragment(value)
    }

    fn write_writer(&mut self, other: BufferListWriter) -> usize {
        for fragment in other.into_fragments() {
            self.push_fragment(fragment);
        }
        self.total
    }

    fn len(&self) -> usize {
        self.total
    }

    fn reset(&mut self) {
        self.fragments.clear();
        self.total = 0;
        self.cached = None;
    }
}
