/// Marker and footer byte shared by every frame. The marker is a structural
/// sanity check, the footer a desync detector — neither carries data, and no
/// resynchronization scan is ever performed on them.
pub const SEPARATOR: u8 = 0x5E;

/// Closed enumeration of frame type bytes, plus two classification
/// sentinels that never appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketType {
    BooleanTrue = 0x01,
    BooleanFalse = 0x02,
    /// Magnitude as `u32`; the sign lives entirely in the tag.
    PositiveInteger = 0x03,
    NegativeInteger = 0x04,
    /// IEEE-754 double, little-endian.
    Double = 0x05,
    /// Epoch milliseconds in a `Double`-shaped payload.
    Date = 0x06,
    Null = 0x07,
    Undefined = 0x08,
    /// UTF-8 bytes.
    String = 0x09,
    /// Raw bytes.
    Buffer = 0x0A,
    /// `u32` element count, then concatenated self-framed elements.
    ArrayWithSize = 0x0B,
    /// 1-byte element-kind shortcode, then raw bytes.
    ArrayBufferWithSize = 0x0C,
    /// UTF-8 text produced by the pluggable object format.
    ObjectStringified = 0x0D,

    /// Sentinel: marker mismatch or unrecognized type byte. Terminal.
    NotValid = 0xFE,
    /// Sentinel: not enough bytes yet to classify the frame. Retry later.
    PartialHeader = 0xFF,
}

impl PacketType {
    /// Classify a wire type byte. Sentinel values are not wire bytes.
    pub fn from_wire(byte: u8) -> Option<Self> {
        Some(match byte {
            0x01 => Self::BooleanTrue,
            0x02 => Self::BooleanFalse,
            0x03 => Self::PositiveInteger,
            0x04 => Self::NegativeInteger,
            0x05 => Self::Double,
            0x06 => Self::Date,
            0x07 => Self::Null,
            0x08 => Self::Undefined,
            0x09 => Self::String,
            0x0A => Self::Buffer,
            0x0B => Self::ArrayWithSize,
            0x0C => Self::ArrayBufferWithSize,
            0x0D => Self::ObjectStringified,
            _ => return None,
        })
    }

    /// The byte written to the wire for this type.
    pub fn to_wire(self) -> u8 {
        self as u8
    }

    /// Fixed-size types imply their content size from the tag alone.
    pub fn fixed_content_size(self) -> Option<usize> {
        match self {
            Self::Null | Self::Undefined | Self::BooleanTrue | Self::BooleanFalse => Some(0),
            Self::PositiveInteger | Self::NegativeInteger => Some(4),
            Self::Double | Self::Date => Some(8),
            _ => None,
        }
    }

    /// Dynamic-size types carry an explicit 4-byte content length.
    pub fn is_dynamic_size(self) -> bool {
        matches!(
            self,
            Self::String
                | Self::Buffer
                | Self::ArrayWithSize
                | Self::ArrayBufferWithSize
                | Self::ObjectStringified
        )
    }
}

/// Element kind of an `ArrayBufferWithSize` payload.
///
/// Shortcode 0 is an untyped byte view; the rest identify the numeric
/// element type of a typed view over the raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ViewKind {
    Bytes = 0,
    I8 = 1,
    U8 = 2,
    I16 = 3,
    U16 = 4,
    I32 = 5,
    U32 = 6,
    F32 = 7,
    F64 = 8,
}

impl ViewKind {
    pub fn from_wire(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Self::Bytes,
            1 => Self::I8,
            2 => Self::U8,
            3 => Self::I16,
            4 => Self::U16,
            5 => Self::I32,
            6 => Self::U32,
            7 => Self::F32,
            8 => Self::F64,
            _ => return None,
        })
    }

    pub fn to_wire(self) -> u8 {
        self as u8
    }

    /// Bytes per element of this view kind.
    pub fn element_size(self) -> usize {
        match self {
            Self::Bytes | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }
}
