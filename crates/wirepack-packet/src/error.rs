use crate::object::ObjectFormatError;

/// Errors that can occur during packet encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    /// Cursor-level failure (short read, bad seek, invalid UTF-8).
    #[error(transparent)]
    Buffer(#[from] wirepack_buffers::BufferError),

    /// The frame header carries a wrong marker byte or an unrecognized
    /// type byte. Terminal for the stream; no resynchronization is
    /// attempted.
    #[error("invalid packet header")]
    InvalidHeader,

    /// The footer byte did not match the separator constant — the stream
    /// is desynchronized.
    #[error("bad frame footer byte 0x{byte:02X}")]
    BadFooter { byte: u8 },

    /// Declared sizes promise more nested content than the frame holds.
    #[error("truncated frame content")]
    Truncated,

    /// Dynamic content does not fit the 4-byte length field.
    #[error("content too large for frame ({size} bytes, max {max})")]
    ContentTooLarge { size: usize, max: usize },

    /// Unknown typed-array element kind shortcode.
    #[error("unknown typed-array kind 0x{byte:02X}")]
    UnknownViewKind { byte: u8 },

    /// The pluggable object format failed to stringify or parse.
    #[error("object format error: {0}")]
    Object(ObjectFormatError),
}

pub type Result<T> = std::result::Result<T, PacketError>;
