/// Errors that can occur while reading through a byte cursor.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    /// Fewer bytes remain than the read requested.
    #[error("unexpected end of data ({needed} bytes needed, {available} available)")]
    UnexpectedEof { needed: usize, available: usize },

    /// A seek targeted an offset outside the addressable range.
    #[error("seek to {offset} out of range (length {len})")]
    SeekOutOfRange { offset: usize, len: usize },

    /// A string read produced invalid UTF-8.
    #[error("invalid UTF-8 in string field: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, BufferError>;
