/// Errors surfaced while streaming packets over a transport.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Packet-level failure: malformed header, bad footer, truncation.
    #[error(transparent)]
    Packet(#[from] wirepack_packet::PacketError),

    /// A frame declared more content than the decoder allows to buffer.
    #[error("frame content too large ({size} bytes, max {max})")]
    ContentTooLarge { size: usize, max: usize },

    /// The transport rejected a send.
    #[error(transparent)]
    Transport(#[from] wirepack_transport::TransportError),

    /// An I/O error occurred while framing.
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The decoder hit a terminal error earlier; the stream is assumed
    /// desynchronized and no further decoding is attempted.
    #[error("stream poisoned by an earlier terminal error")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StreamError>;
