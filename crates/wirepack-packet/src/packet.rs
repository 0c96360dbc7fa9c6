use bytes::Bytes;
use wirepack_buffers::{BufferListWriter, BufferReader};

use crate::decode::{parse_array_at, parse_array_length, parse_array_slice, read_value};
use crate::encode::write_value;
use crate::error::{PacketError, Result};
use crate::header::{peek_header, Header};
use crate::object::ObjectFormat;
use crate::value::Value;

/// One complete encoded frame: parsed header plus its wire bytes.
///
/// Decoding is lazy — holding a `Packet` costs one `Bytes` view; the value
/// (or a single array element) is materialized only on request.
#[derive(Debug, Clone)]
pub struct Packet {
    header: Header,
    bytes: Bytes,
}

impl Packet {
    /// Encode a value into a standalone packet.
    pub fn from_value(value: &Value, format: &dyn ObjectFormat) -> Result<Self> {
        let mut writer = BufferListWriter::new();
        let header = write_value(&mut writer, value, format)?;
        Ok(Self {
            header,
            bytes: writer.buffer(),
        })
    }

    /// Wrap bytes that start with a complete frame.
    ///
    /// Returns `Ok(None)` if the frame is not complete yet. Trailing bytes
    /// beyond the frame are ignored.
    pub fn from_bytes(bytes: Bytes) -> Result<Option<Self>> {
        let header = peek_header(&bytes);
        if header.is_partial() {
            return Ok(None);
        }
        if !header.is_valid() {
            return Err(PacketError::InvalidHeader);
        }
        let frame = bytes.slice(..header.packet_size());
        Ok(Some(Self {
            header,
            bytes: frame,
        }))
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Total wire size of this packet.
    pub fn wire_size(&self) -> usize {
        self.bytes.len()
    }

    /// The packet's wire bytes (zero-copy view).
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    /// Fully decode the packet's value.
    pub fn decode(&self, format: &dyn ObjectFormat) -> Result<Value> {
        let mut reader = BufferReader::new(self.bytes.clone());
        read_value(&mut reader, format)?.ok_or(PacketError::Truncated)
    }

    /// Element count, if this packet frames an array.
    pub fn array_length(&self) -> Result<Option<u32>> {
        parse_array_length(&mut self.reader())
    }

    /// Decode a single array element by index, by-passing its siblings.
    pub fn array_at(&self, index: u32, format: &dyn ObjectFormat) -> Result<Option<Value>> {
        parse_array_at(&mut self.reader(), index, format)
    }

    /// Decode a range of array elements, sequence-slice bounds semantics.
    pub fn array_slice(
        &self,
        start: Option<i64>,
        end: Option<i64>,
        format: &dyn ObjectFormat,
    ) -> Result<Option<Vec<Value>>> {
        parse_array_slice(&mut self.reader(), start, end, format)
    }

    fn reader(&self) -> BufferReader {
        BufferReader::new(self.bytes.clone())
    }
}

/// Encode one value to its complete wire bytes.
pub fn encode_value(value: &Value, format: &dyn ObjectFormat) -> Result<Bytes> {
    Ok(Packet::from_value(value, format)?.bytes())
}

/// Decode one value from wire bytes. `Ok(None)` if the frame is incomplete.
pub fn decode_value(bytes: impl Into<Bytes>, format: &dyn ObjectFormat) -> Result<Option<Value>> {
    let mut reader = BufferReader::new(bytes.into());
    read_value(&mut reader, format)
}
