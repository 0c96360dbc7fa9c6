use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use wirepack_packet::{
    encode_value, peek_header, JsonFormat, ObjectFormat, Packet, PacketError, Value, SEPARATOR,
};

use crate::decoder::DEFAULT_MAX_CONTENT_SIZE;
use crate::error::StreamError;

/// `tokio_util::codec` adapter: plugs the packet format into `Framed`
/// transports.
///
/// Semantically equivalent to [`crate::PacketDecoder`] but driven by the
/// codec contract's single `BytesMut` accumulation buffer instead of a
/// fragment list.
#[derive(Debug)]
pub struct PacketCodec<F = JsonFormat> {
    format: F,
    max_content_size: usize,
}

impl PacketCodec<JsonFormat> {
    pub fn new() -> Self {
        Self::with_format(JsonFormat)
    }
}

impl Default for PacketCodec<JsonFormat> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ObjectFormat> PacketCodec<F> {
    pub fn with_format(format: F) -> Self {
        Self {
            format,
            max_content_size: DEFAULT_MAX_CONTENT_SIZE,
        }
    }

    pub fn max_content_size(mut self, max_content_size: usize) -> Self {
        self.max_content_size = max_content_size;
        self
    }
}

impl<F: ObjectFormat> Decoder for PacketCodec<F> {
    type Item = Packet;
    type Error = StreamError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Packet>, StreamError> {
        let header = peek_header(src);
        if header.is_partial() {
            return Ok(None);
        }
        if !header.is_valid() {
            return Err(PacketError::InvalidHeader.into());
        }
        if header.content_size > self.max_content_size {
            return Err(StreamError::ContentTooLarge {
                size: header.content_size,
                max: self.max_content_size,
            });
        }

        let frame = src.split_to(header.packet_size()).freeze();
        let footer = frame[frame.len() - 1];
        if footer != SEPARATOR {
            return Err(PacketError::BadFooter { byte: footer }.into());
        }
        let packet = Packet::from_bytes(frame)?.ok_or(PacketError::Truncated)?;
        Ok(Some(packet))
    }
}

impl<F: ObjectFormat> Encoder<&Value> for PacketCodec<F> {
    type Error = StreamError;

    fn encode(&mut self, item: &Value, dst: &mut BytesMut) -> Result<(), StreamError> {
        let bytes = encode_value(item, &self.format)?;
        dst.reserve(bytes.len());
        dst.put_slice(&bytes);
        Ok(())
    }
}

impl<F: ObjectFormat> Encoder<Value> for PacketCodec<F> {
    type Error = StreamError;

    fn encode(&mut self, item: Value, dst: &mut BytesMut) -> Result<(), StreamError> {
        Encoder::<&Value>::encode(self, &item, dst)
    }
}
