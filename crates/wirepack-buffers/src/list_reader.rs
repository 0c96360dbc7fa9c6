use bytes::{Bytes, BytesMut};

use crate::error::{BufferError, Result};
use crate::traits::Reader;

/// Largest fragment size `reduce` will keep alive for a partially-consumed
/// head. Above this, a mostly-consumed head fragment is replaced by a copy
/// of its live tail. Tuning constant, not a correctness invariant.
pub const DEFAULT_RETAIN_THRESHOLD: usize = 100_000;

/// Cursor over an ordered list of owned byte fragments.
///
/// Reads that stay inside one fragment return zero-copy subviews. A read
/// spanning a fragment boundary first *consolidates*: the minimal run of
/// fragments covering the request is merged into one, spliced into the list
/// in place of the originals, and the read is then satisfied as a plain
/// subview of the merged fragment. Consolidation renumbers fragments, so it
/// bumps an epoch counter; saved cursors from an earlier epoch are restored
/// by absolute-offset reseek instead of their stale fragment coordinates.
///
/// Cursor invariant: `offset == len(fragments[..frag_index]) + frag_offset`.
#[derive(Debug)]
pub struct BufferListReader {
    fragments: Vec<Bytes>,
    total: usize,
    offset: usize,
    frag_index: usize,
    frag_offset: usize,
    epoch: u64,
    contexts: Vec<SavedCursor>,
    retain_threshold: usize,
}

#[derive(Debug, Clone, Copy)]
struct SavedCursor {
    offset: usize,
    frag_index: usize,
    frag_offset: usize,
    epoch: u64,
}

impl Default for BufferListReader {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferListReader {
    pub fn new() -> Self {
        Self::with_retain_threshold(DEFAULT_RETAIN_THRESHOLD)
    }

    pub fn with_retain_threshold(retain_threshold: usize) -> Self {
        Self {
            fragments: Vec::new(),
            total: 0,
            offset: 0,
            frag_index: 0,
            frag_offset: 0,
            epoch: 0,
            contexts: Vec::new(),
            retain_threshold,
        }
    }

    /// Build a reader over an existing list of fragments.
    pub fn from_fragments<I>(fragments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Bytes>,
    {
        let mut reader = Self::new();
        for fragment in fragments {
            reader.append(fragment.into());
        }
        reader
    }

    /// Append a fragment of received bytes. Never copies.
    pub fn append(&mut self, fragment: Bytes) {
        if fragment.is_empty() {
            return;
        }
        self.total += fragment.len();
        self.fragments.push(fragment);
    }

    /// Total logical length (consumed and unconsumed) currently held.
    pub fn total_len(&self) -> usize {
        self.total
    }

    /// Number of physically separate fragments currently held.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Consolidation epoch; bumped whenever fragment indices shift.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn eof_error(&self, needed: usize) -> BufferError {
        BufferError::UnexpectedEof {
            needed,
            available: self.remaining(),
        }
    }

    /// Re-establish `frag_offset < len(fragments[frag_index])` after an
    /// advance, walking forward over as many fragments as needed.
    fn normalize(&mut self) {
        while self.frag_index < self.fragments.len()
            && self.frag_offset >= self.fragments[self.frag_index].len()
        {
            self.frag_offset -= self.fragments[self.frag_index].len();
            self.frag_index += 1;
        }
    }

    fn advance(&mut self, n: usize) {
        self.offset += n;
        self.frag_offset += n;
        self.normalize();
    }

    /// Merge the minimal run of fragments covering a `len`-byte read from
    /// the current cursor into one fragment, splicing it in place.
    fn consolidate(&mut self, len: usize) {
        let need = self.frag_offset + len;
        let mut end = self.frag_index;
        let mut span = 0usize;
        while span < need {
            span += self.fragments[end].len();
            end += 1;
        }

        let mut merged = BytesMut::with_capacity(span);
        for fragment in &self.fragments[self.frag_index..end] {
            merged.extend_from_slice(fragment);
        }
        self.fragments
            .splice(self.frag_index..end, std::iter::once(merged.freeze()));
        self.epoch += 1;
    }

    /// Recompute fragment coordinates for an absolute offset, scanning from
    /// whichever end of the fragment list is closer.
    fn reseek(&mut self, target: usize) {
        self.offset = target;
        if target * 2 <= self.total {
            let mut idx = 0usize;
            let mut rem = target;
            while idx < self.fragments.len() && rem >= self.fragments[idx].len() {
                rem -= self.fragments[idx].len();
                idx += 1;
            }
            self.frag_index = idx;
            self.frag_offset = rem;
        } else {
            let mut idx = self.fragments.len();
            let mut start = self.total;
            while idx > 0 && start > target {
                idx -= 1;
                start -= self.fragments[idx].len();
            }
            self.frag_index = idx;
            self.frag_offset = target - start;
            self.normalize();
        }
    }

    fn restore(&mut self, saved: SavedCursor) {
        if saved.epoch == self.epoch {
            self.offset = saved.offset;
            self.frag_index = saved.frag_index;
            self.frag_offset = saved.frag_offset;
        } else {
            // Fragment indices have shifted since the save; the absolute
            // offset is still addressable because reclamation is gated on an
            // empty context stack.
            self.reseek(saved.offset);
        }
    }
}

impl Reader for BufferListReader {
    fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        if self.check_eof(len) {
            return Err(self.eof_error(len));
        }
        if len == 0 {
            return Ok(Bytes::new());
        }
        if self.frag_offset + len > self.fragments[self.frag_index].len() {
            self.consolidate(len);
        }
        let out = self.fragments[self.frag_index].slice(self.frag_offset..self.frag_offset + len);
        self.advance(len);
        Ok(out)
    }

    fn slice(&mut self, len: usize) -> Result<Bytes> {
        if self.check_eof(len) {
            return Err(self.eof_error(len));
        }
        let mut out = BytesMut::with_capacity(len);
        let mut idx = self.frag_index;
        let mut off = self.frag_offset;
        let mut rem = len;
        while rem > 0 {
            let fragment = &self.fragments[idx];
            let take = rem.min(fragment.len() - off);
            out.extend_from_slice(&fragment[off..off + take]);
            rem -= take;
            idx += 1;
            off = 0;
        }
        self.advance(len);
        Ok(out.freeze())
    }

    fn check_eof(&self, n: usize) -> bool {
        self.remaining() < n
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        if self.check_eof(n) {
            return Err(self.eof_error(n));
        }
        self.advance(n);
        Ok(())
    }

    fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.total {
            return Err(BufferError::SeekOutOfRange {
                offset,
                len: self.total,
            });
        }
        self.reseek(offset);
        Ok(())
    }

    fn position(&self) -> usize {
        self.offset
    }

    fn remaining(&self) -> usize {
        self.total - self.offset
    }

    fn pushd(&mut self) {
        self.contexts.push(SavedCursor {
            offset: self.offset,
            frag_index: self.frag_index,
            frag_offset: self.frag_offset,
            epoch: self.epoch,
        });
    }

    fn popd(&mut self) {
        if let Some(saved) = self.contexts.pop() {
            self.restore(saved);
        }
    }

    fn forget(&mut self) {
        self.contexts.pop();
    }

    /// Reclaim fragments the cursor has fully passed.
    ///
    /// No-op while saved contexts are outstanding — a context may still
    /// reference the consumed region. Rebases the absolute offset, so
    /// callers must not hold offsets into reclaimed territory across calls.
    fn reduce(&mut self) {
        if !self.contexts.is_empty() {
            return;
        }

        if self.offset >= self.total {
            if !self.fragments.is_empty() {
                self.fragments.clear();
                self.epoch += 1;
            }
            self.total = 0;
            self.offset = 0;
            self.frag_index = 0;
            self.frag_offset = 0;
            return;
        }

        if self.frag_index > 0 {
            let dropped: usize = self
                .fragments
                .drain(..self.frag_index)
                .map(|f| f.len())
                .sum();
            self.total -= dropped;
            self.offset -= dropped;
            self.frag_index = 0;
            self.epoch += 1;
        }

        // A huge head fragment pinned by a small live tail would otherwise
        // be retained indefinitely; past half-consumed, copy the tail out.
        let head_len = self.fragments[0].len();
        if head_len > self.retain_threshold && self.frag_offset > head_len / 2 {
            let tail = Bytes::copy_from_slice(&self.fragments[0][self.frag_offset..]);
            self.total -= self.frag_offset;
            self.offset -= self.frag_offset;
            self.fragments[0] = tail;
            self.frag_offset = 0;
            self.epoch += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_fragment_reader() -> BufferListReader {
        // 20B + 123B + 1B, values chosen so every byte is identifiable.
        let f1: Vec<u8> = (0u8..20).collect();
        let f2: Vec<u8> = (20u8..143).collect();
        let f3: Vec<u8> = vec![143];
        BufferListReader::from_fragments([f1, f2, f3])
    }

    fn flat_reader() -> crate::reader::BufferReader {
        let all: Vec<u8> = (0u8..144).collect();
        crate::reader::BufferReader::new(all)
    }

    #[test]
    fn boundary_crossing_reads_match_flat_reader() {
        let mut listed = three_fragment_reader();
        let mut flat = flat_reader();

        for len in [64usize, 80] {
            let a = listed.slice(len).unwrap();
            let b = flat.slice(len).unwrap();
            assert_eq!(a, b);
        }
        assert_eq!(listed.remaining(), 0);
    }

    #[test]
    fn read_within_fragment_is_zero_copy() {
        let f1 = Bytes::from_static(b"0123456789");
        let mut reader = BufferListReader::new();
        reader.append(f1.clone());
        reader.append(Bytes::from_static(b"abcdef"));

        let view = reader.read_bytes(4).unwrap();
        assert_eq!(view.as_ref(), b"0123");
        assert_eq!(view.as_ptr(), f1.as_ptr());
        assert_eq!(reader.fragment_count(), 2);
        assert_eq!(reader.epoch(), 0);
    }

    #[test]
    fn boundary_read_consolidates_minimal_run() {
        let mut reader = BufferListReader::from_fragments([
            b"aaaa".to_vec(),
            b"bbbb".to_vec(),
            b"cccc".to_vec(),
            b"dddd".to_vec(),
        ]);
        reader.skip(2).unwrap();

        // Spans fragments 0-2 but not 3.
        let bytes = reader.read_bytes(9).unwrap();
        assert_eq!(bytes.as_ref(), b"aabbbbccc");
        assert_eq!(reader.fragment_count(), 2);
        assert_eq!(reader.epoch(), 1);

        // Remaining bytes unaffected.
        assert_eq!(reader.read_bytes(5).unwrap().as_ref(), b"cdddd");
    }

    #[test]
    fn slice_copies_without_consolidating() {
        let mut reader =
            BufferListReader::from_fragments([b"aaaa".to_vec(), b"bbbb".to_vec()]);
        let copy = reader.slice(6).unwrap();
        assert_eq!(copy.as_ref(), b"aaaabb");
        assert_eq!(reader.fragment_count(), 2);
        assert_eq!(reader.epoch(), 0);
    }

    #[test]
    fn context_survives_consolidation() {
        let mut reader =
            BufferListReader::from_fragments([b"aaaa".to_vec(), b"bbbb".to_vec(), b"cc".to_vec()]);
        reader.skip(2).unwrap();

        reader.pushd();
        // Crossing read consolidates and bumps the epoch.
        reader.read_bytes(6).unwrap();
        assert_eq!(reader.epoch(), 1);
        reader.popd();

        assert_eq!(reader.position(), 2);
        assert_eq!(reader.read_bytes(4).unwrap().as_ref(), b"aabb");
    }

    #[test]
    fn nested_contexts_restore_in_order() {
        let mut reader = BufferListReader::from_fragments([b"abcdef".to_vec()]);
        reader.pushd();
        reader.skip(2).unwrap();
        reader.pushd();
        reader.skip(3).unwrap();
        reader.popd();
        assert_eq!(reader.position(), 2);
        reader.popd();
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn reduce_drops_consumed_fragments() {
        let mut reader = BufferListReader::from_fragments([
            b"aaaa".to_vec(),
            b"bbbb".to_vec(),
            b"cccc".to_vec(),
        ]);
        reader.skip(6).unwrap();
        reader.reduce();

        assert_eq!(reader.fragment_count(), 2);
        assert_eq!(reader.total_len(), 8);
        assert_eq!(reader.position(), 2);
        assert_eq!(reader.read_bytes(6).unwrap().as_ref(), b"bbcccc");
    }

    #[test]
    fn reduce_resets_when_fully_consumed() {
        let mut reader = BufferListReader::from_fragments([b"aaaa".to_vec()]);
        reader.skip(4).unwrap();
        reader.reduce();
        assert_eq!(reader.fragment_count(), 0);
        assert_eq!(reader.total_len(), 0);
        assert_eq!(reader.position(), 0);

        reader.append(Bytes::from_static(b"zz"));
        assert_eq!(reader.read_bytes(2).unwrap().as_ref(), b"zz");
    }

    #[test]
    fn reduce_is_transparent_to_reads() {
        let chunk: Vec<u8> = (0u8..32).collect();
        let mut with_reduce = BufferListReader::from_fragments([chunk.clone()]);
        let mut without = BufferListReader::from_fragments([chunk]);
        for reader in [&mut with_reduce, &mut without] {
            reader.append(Bytes::from_static(b"tail-data"));
            reader.skip(30).unwrap();
        }

        with_reduce.reduce();
        assert_eq!(
            with_reduce.read_bytes(8).unwrap(),
            without.read_bytes(8).unwrap()
        );
    }

    #[test]
    fn reduce_copies_tail_of_oversized_head() {
        let big: Vec<u8> = (0..200u8).collect();
        let mut reader = BufferListReader::with_retain_threshold(100);
        reader.append(Bytes::from(big));
        reader.skip(150).unwrap();
        reader.reduce();

        // Only the 50-byte live tail is retained.
        assert_eq!(reader.total_len(), 50);
        assert_eq!(reader.position(), 0);
        let tail = reader.read_bytes(50).unwrap();
        assert_eq!(tail.first(), Some(&150u8));
        assert_eq!(tail.last(), Some(&199u8));
    }

    #[test]
    fn reduce_keeps_head_under_half_consumed() {
        let big: Vec<u8> = (0..200u8).collect();
        let mut reader = BufferListReader::with_retain_threshold(100);
        reader.append(Bytes::from(big));
        reader.skip(40).unwrap();
        reader.reduce();

        assert_eq!(reader.total_len(), 200);
        assert_eq!(reader.position(), 40);
    }

    #[test]
    fn reduce_deferred_while_context_held() {
        let mut reader =
            BufferListReader::from_fragments([b"aaaa".to_vec(), b"bbbb".to_vec()]);
        reader.pushd();
        reader.skip(6).unwrap();
        reader.reduce();
        assert_eq!(reader.fragment_count(), 2);

        reader.popd();
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_bytes(4).unwrap().as_ref(), b"aaaa");
    }

    #[test]
    fn stale_context_restored_by_offset_after_consolidation() {
        let mut reader = BufferListReader::from_fragments([
            b"aa".to_vec(),
            b"bb".to_vec(),
            b"cc".to_vec(),
            b"dd".to_vec(),
        ]);
        reader.skip(3).unwrap();
        reader.pushd();

        // Consolidate far ahead of the saved cursor; its fragment index is
        // now stale but its absolute offset is not.
        reader.read_bytes(4).unwrap();
        reader.popd();

        assert_eq!(reader.position(), 3);
        assert_eq!(reader.read_bytes(3).unwrap().as_ref(), b"bcc");
    }

    #[test]
    fn seek_from_either_end() {
        let mut reader = BufferListReader::from_fragments([
            b"aaaa".to_vec(),
            b"bbbb".to_vec(),
            b"cccc".to_vec(),
        ]);
        reader.seek(10).unwrap();
        assert_eq!(reader.read_bytes(2).unwrap().as_ref(), b"cc");
        reader.seek(2).unwrap();
        assert_eq!(reader.read_bytes(4).unwrap().as_ref(), b"aabb");
        reader.seek(12).unwrap();
        assert_eq!(reader.remaining(), 0);
        assert!(matches!(
            reader.seek(13),
            Err(BufferError::SeekOutOfRange { offset: 13, len: 12 })
        ));
    }

    #[test]
    fn numeric_reads_across_boundaries() {
        // A u32 split 1/3 across two fragments.
        let mut reader =
            BufferListReader::from_fragments([vec![0x78], vec![0x56, 0x34, 0x12]]);
        assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
    }

    #[test]
    fn incomplete_read_leaves_cursor_unmoved() {
        let mut reader = BufferListReader::from_fragments([b"abc".to_vec()]);
        reader.skip(1).unwrap();
        assert!(reader.read_bytes(5).is_err());
        assert_eq!(reader.position(), 1);

        reader.append(Bytes::from_static(b"def"));
        assert_eq!(reader.read_bytes(5).unwrap().as_ref(), b"bcdef");
    }
}
