use bytes::Bytes;
use tracing::{debug, trace};
use wirepack_buffers::{BufferListReader, Reader};
use wirepack_packet::{read_header, Packet, PacketError, SEPARATOR};
use wirepack_transport::TransportEvent;

use crate::error::{Result, StreamError};

/// Default ceiling on a single frame's declared content size: 16 MiB.
pub const DEFAULT_MAX_CONTENT_SIZE: usize = 16 * 1024 * 1024;

/// Configuration for the streaming decoder.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Largest content size a frame may declare before the stream is
    /// rejected; bounds how much an unfinished frame can force us to buffer.
    pub max_content_size: usize,
    /// Passed through to the fragment reader's reclamation logic; see
    /// [`wirepack_buffers::DEFAULT_RETAIN_THRESHOLD`].
    pub retain_threshold: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_content_size: DEFAULT_MAX_CONTENT_SIZE,
            retain_threshold: wirepack_buffers::DEFAULT_RETAIN_THRESHOLD,
        }
    }
}

/// Reassembles complete packets out of arbitrarily-chunked input.
///
/// Each received chunk is appended as a fragment; the drain loop then peels
/// off as many complete frames as the accumulated bytes allow. An
/// incomplete frame leaves the cursor at its start, to be retried when the
/// next chunk arrives. Any terminal error (bad marker, unknown type, bad
/// footer, oversized frame) poisons the decoder permanently — a
/// desynchronized byte stream is not repaired.
#[derive(Debug)]
pub struct PacketDecoder {
    reader: BufferListReader,
    config: DecoderConfig,
    poisoned: bool,
}

impl Default for PacketDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketDecoder {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            reader: BufferListReader::with_retain_threshold(config.retain_threshold),
            config,
            poisoned: false,
        }
    }

    /// Bytes received but not yet consumed by a complete frame.
    pub fn pending_bytes(&self) -> usize {
        self.reader.remaining()
    }

    /// True once a terminal error has been observed.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Append one transport chunk and collect every packet it completes.
    pub fn push(&mut self, chunk: Bytes) -> Result<Vec<Packet>> {
        let mut batch = Vec::new();
        self.push_with(chunk, |packet| batch.push(packet))?;
        Ok(batch)
    }

    /// Append one transport chunk, handing each completed packet to the
    /// callback as it is peeled off.
    pub fn push_with(&mut self, chunk: Bytes, mut on_packet: impl FnMut(Packet)) -> Result<()> {
        if self.poisoned {
            return Err(StreamError::Poisoned);
        }
        self.reader.append(chunk);

        let mut emitted = 0usize;
        loop {
            match self.next_packet() {
                Ok(Some(packet)) => {
                    emitted += 1;
                    on_packet(packet);
                }
                Ok(None) => break,
                Err(err) => {
                    debug!(error = %err, "terminal decode error, poisoning stream");
                    self.poisoned = true;
                    return Err(err);
                }
            }
        }

        if emitted > 0 {
            self.reader.reduce();
            trace!(
                packets = emitted,
                pending = self.reader.remaining(),
                fragments = self.reader.fragment_count(),
                "drained chunk"
            );
        }
        Ok(())
    }

    /// Feed one transport event.
    ///
    /// `Data` chunks are decoded as in [`PacketDecoder::push`]. `Closed`
    /// discards any in-progress partial frame — nothing was materialized,
    /// so there is nothing to roll back. A transport `Error` is relayed
    /// unmodified after discarding state.
    pub fn handle_event(&mut self, event: TransportEvent) -> Result<Vec<Packet>> {
        match event {
            TransportEvent::Data(chunk) => self.push(chunk),
            TransportEvent::Closed => {
                self.discard();
                Ok(Vec::new())
            }
            TransportEvent::Error(err) => {
                self.discard();
                Err(err.into())
            }
        }
    }

    fn discard(&mut self) {
        trace!(pending = self.reader.remaining(), "discarding decoder state");
        self.reader = BufferListReader::with_retain_threshold(self.config.retain_threshold);
    }

    /// Attempt to peel one complete frame off the cursor. `Ok(None)` means
    /// the next frame is still incomplete; the cursor has not moved.
    fn next_packet(&mut self) -> Result<Option<Packet>> {
        let start = self.reader.position();
        let header = read_header(&mut self.reader)?;
        if header.is_partial() {
            return Ok(None);
        }
        if !header.is_valid() {
            return Err(PacketError::InvalidHeader.into());
        }
        if header.content_size > self.config.max_content_size {
            return Err(StreamError::ContentTooLarge {
                size: header.content_size,
                max: self.config.max_content_size,
            });
        }

        // Take the whole frame (header included) as one view; consolidation
        // inside the reader guarantees contiguity.
        self.reader.seek(start).map_err(PacketError::from)?;
        let frame = self
            .reader
            .read_bytes(header.packet_size())
            .map_err(PacketError::from)?;

        let footer = frame[frame.len() - 1];
        if footer != SEPARATOR {
            return Err(PacketError::BadFooter { byte: footer }.into());
        }

        let packet = Packet::from_bytes(frame)?.ok_or(PacketError::Truncated)?;
        Ok(Some(packet))
    }
}
