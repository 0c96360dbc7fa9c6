use wirepack_buffers::Reader;

use crate::error::Result;
use crate::tags::{PacketType, SEPARATOR};

/// Marker byte + type byte.
pub const FIXED_HEADER_SIZE: usize = 2;
/// Marker byte + type byte + `u32` content length.
pub const DYNAMIC_HEADER_SIZE: usize = 6;
/// One trailing separator byte per frame.
pub const FOOTER_SIZE: usize = 1;

/// Classification of one frame: its type and the sizes that locate its
/// content. Recomputed on every decode attempt — cheap and never persisted
/// apart from its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub packet_type: PacketType,
    pub header_size: usize,
    pub content_size: usize,
}

impl Header {
    /// Total wire size of the frame: header + content + footer.
    pub fn packet_size(&self) -> usize {
        self.header_size + self.content_size + FOOTER_SIZE
    }

    /// True for a header successfully classified from complete bytes.
    pub fn is_valid(&self) -> bool {
        !matches!(
            self.packet_type,
            PacketType::NotValid | PacketType::PartialHeader
        )
    }

    /// True while more bytes are needed before the frame can be classified.
    pub fn is_partial(&self) -> bool {
        self.packet_type == PacketType::PartialHeader
    }

    pub(crate) fn partial() -> Self {
        Self {
            packet_type: PacketType::PartialHeader,
            header_size: 0,
            content_size: 0,
        }
    }

    pub(crate) fn not_valid() -> Self {
        Self {
            packet_type: PacketType::NotValid,
            header_size: 0,
            content_size: 0,
        }
    }
}

/// Pure classification: map a type tag (and, for dynamic types, a content
/// size) to its header record. Sentinels classify as `NotValid`.
pub fn declare_header(packet_type: PacketType, content_size: usize) -> Header {
    if let Some(fixed) = packet_type.fixed_content_size() {
        Header {
            packet_type,
            header_size: FIXED_HEADER_SIZE,
            content_size: fixed,
        }
    } else if packet_type.is_dynamic_size() {
        Header {
            packet_type,
            header_size: DYNAMIC_HEADER_SIZE,
            content_size,
        }
    } else {
        Header::not_valid()
    }
}

/// Read and classify one frame header from the reader.
///
/// Returns a `PartialHeader` record — with the cursor restored to the frame
/// start — while the header, content, or footer bytes are not all available
/// yet; this is the non-destructive "is a full frame here yet" query the
/// streaming decoder retries on. On a valid header the cursor is left at
/// the first content byte.
pub fn read_header<R: Reader + ?Sized>(reader: &mut R) -> Result<Header> {
    if reader.check_eof(FIXED_HEADER_SIZE) {
        return Ok(Header::partial());
    }

    reader.pushd();
    let marker = reader.read_u8()?;
    if marker != SEPARATOR {
        reader.popd();
        return Ok(Header::not_valid());
    }

    let type_byte = reader.read_u8()?;
    let Some(packet_type) = PacketType::from_wire(type_byte) else {
        reader.popd();
        return Ok(Header::not_valid());
    };

    let header = if packet_type.is_dynamic_size() {
        if reader.check_eof(4) {
            reader.popd();
            return Ok(Header::partial());
        }
        let content_size = reader.read_u32()? as usize;
        declare_header(packet_type, content_size)
    } else {
        declare_header(packet_type, 0)
    };

    // Look ahead for the whole frame before committing the cursor.
    if reader.check_eof(header.content_size + FOOTER_SIZE) {
        reader.popd();
        return Ok(Header::partial());
    }

    reader.forget();
    Ok(header)
}

/// Slice-based variant of [`read_header`] for callers that hold contiguous
/// bytes rather than a cursor. Never consumes anything.
pub fn peek_header(buf: &[u8]) -> Header {
    if buf.len() < FIXED_HEADER_SIZE {
        return Header::partial();
    }
    if buf[0] != SEPARATOR {
        return Header::not_valid();
    }
    let Some(packet_type) = PacketType::from_wire(buf[1]) else {
        return Header::not_valid();
    };

    let header = if packet_type.is_dynamic_size() {
        if buf.len() < DYNAMIC_HEADER_SIZE {
            return Header::partial();
        }
        let content_size = u32::from_le_bytes(buf[2..6].try_into().expect("4-byte slice")) as usize;
        declare_header(packet_type, content_size)
    } else {
        declare_header(packet_type, 0)
    };

    if buf.len() < header.packet_size() {
        return Header::partial();
    }
    header
}

#[cfg(test)]
mod tests {
    use wirepack_buffers::{BufferListReader, BufferReader};

    use super::*;

    #[test]
    fn declares_fixed_sizes_from_tag_alone() {
        let header = declare_header(PacketType::Double, 999);
        assert_eq!(header.header_size, FIXED_HEADER_SIZE);
        assert_eq!(header.content_size, 8);
        assert_eq!(header.packet_size(), 11);

        let header = declare_header(PacketType::Null, 999);
        assert_eq!(header.content_size, 0);
        assert_eq!(header.packet_size(), 3);
    }

    #[test]
    fn declares_dynamic_sizes_from_argument() {
        let header = declare_header(PacketType::String, 5);
        assert_eq!(header.header_size, DYNAMIC_HEADER_SIZE);
        assert_eq!(header.content_size, 5);
        assert_eq!(header.packet_size(), 12);
    }

    #[test]
    fn sentinels_declare_not_valid() {
        assert!(!declare_header(PacketType::NotValid, 0).is_valid());
        assert!(!declare_header(PacketType::PartialHeader, 0).is_valid());
    }

    #[test]
    fn reads_complete_fixed_header() {
        let bytes = vec![SEPARATOR, PacketType::Null.to_wire(), SEPARATOR];
        let mut reader = BufferReader::new(bytes);
        let header = read_header(&mut reader).unwrap();
        assert_eq!(header.packet_type, PacketType::Null);
        // Cursor sits at the first content byte (here: the footer).
        assert_eq!(reader.position(), FIXED_HEADER_SIZE);
    }

    #[test]
    fn partial_on_missing_length_field() {
        let bytes = vec![SEPARATOR, PacketType::String.to_wire(), 0x05, 0x00];
        let mut reader = BufferReader::new(bytes);
        let header = read_header(&mut reader).unwrap();
        assert!(header.is_partial());
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn partial_until_content_and_footer_available() {
        let mut bytes = vec![SEPARATOR, PacketType::String.to_wire()];
        bytes.extend_from_slice(&5u32.to_le_bytes());
        bytes.extend_from_slice(b"hell"); // one content byte and footer missing

        let mut reader = BufferReader::new(bytes);
        let header = read_header(&mut reader).unwrap();
        assert!(header.is_partial());
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn invalid_on_wrong_marker() {
        let bytes = vec![SEPARATOR ^ 0xFF, PacketType::Null.to_wire(), SEPARATOR];
        let mut reader = BufferReader::new(bytes);
        let header = read_header(&mut reader).unwrap();
        assert_eq!(header.packet_type, PacketType::NotValid);
    }

    #[test]
    fn invalid_on_unknown_type_byte() {
        let bytes = vec![SEPARATOR, 0x7F, SEPARATOR];
        let mut reader = BufferReader::new(bytes);
        let header = read_header(&mut reader).unwrap();
        assert_eq!(header.packet_type, PacketType::NotValid);
    }

    #[test]
    fn retry_succeeds_after_more_bytes_arrive() {
        let mut reader = BufferListReader::new();
        reader.append(bytes::Bytes::copy_from_slice(&[
            SEPARATOR,
            PacketType::PositiveInteger.to_wire(),
        ]));
        assert!(read_header(&mut reader).unwrap().is_partial());

        let mut rest = 42u32.to_le_bytes().to_vec();
        rest.push(SEPARATOR);
        reader.append(bytes::Bytes::from(rest));

        let header = read_header(&mut reader).unwrap();
        assert_eq!(header.packet_type, PacketType::PositiveInteger);
        assert_eq!(header.content_size, 4);
    }

    #[test]
    fn peek_header_matches_reader_variant() {
        let mut bytes = vec![SEPARATOR, PacketType::Buffer.to_wire()];
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(b"abc");
        bytes.push(SEPARATOR);

        let peeked = peek_header(&bytes);
        let mut reader = BufferReader::new(bytes);
        assert_eq!(peeked, read_header(&mut reader).unwrap());
        assert_eq!(peeked.packet_size(), 10);
    }
}
