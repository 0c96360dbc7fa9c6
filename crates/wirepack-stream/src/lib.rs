//! Streaming frame reassembly and transport-buffered packet writing.
//!
//! [`PacketDecoder`] turns arbitrarily-chunked transport bytes back into
//! complete packets: chunks are appended as fragments (no copying), whole
//! frames are peeled off as zero-copy views, and consumed fragments are
//! reclaimed. A frame split across chunks simply waits — the cursor never
//! moves past the start of an incomplete frame.
//!
//! [`PacketWriter`] batches the many small writes a nested encode produces
//! into few transport sends, keyed on the encoder's context nesting.

pub mod decoder;
pub mod error;
pub mod writer;

#[cfg(feature = "async")]
pub mod codec;

pub use decoder::{DecoderConfig, PacketDecoder, DEFAULT_MAX_CONTENT_SIZE};
pub use error::{Result, StreamError};
pub use writer::{FlushPolicy, PacketWriter, DEFAULT_FLUSH_THRESHOLD};

#[cfg(feature = "async")]
pub use codec::PacketCodec;
