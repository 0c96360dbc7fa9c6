use wirepack_buffers::{BufferListWriter, FixedWriter, LengthWriter, Writer};

use crate::error::{PacketError, Result};
use crate::header::{declare_header, Header};
use crate::object::ObjectFormat;
use crate::tags::{PacketType, SEPARATOR};
use crate::value::Value;

/// Largest content a dynamic frame can declare.
const MAX_CONTENT: usize = u32::MAX as usize;

enum FixedPayload {
    None,
    U32(u32),
    F64(f64),
}

/// Encode one value as a complete frame into the writer.
///
/// The writer sees `push_context`/`pop_context` around the frame, so
/// transport-buffered sinks treat every nested write as one atomic unit.
/// Returns the finalized header record — for dynamic types the content
/// size only exists once the content has been produced.
pub fn write_value<W: Writer + ?Sized>(
    writer: &mut W,
    value: &Value,
    format: &dyn ObjectFormat,
) -> Result<Header> {
    match value {
        Value::Null => Ok(write_fixed(writer, PacketType::Null, FixedPayload::None)),
        Value::Undefined => Ok(write_fixed(
            writer,
            PacketType::Undefined,
            FixedPayload::None,
        )),
        Value::Bool(true) => Ok(write_fixed(
            writer,
            PacketType::BooleanTrue,
            FixedPayload::None,
        )),
        Value::Bool(false) => Ok(write_fixed(
            writer,
            PacketType::BooleanFalse,
            FixedPayload::None,
        )),
        Value::Int(v) => {
            let magnitude = v.unsigned_abs();
            if magnitude <= u64::from(u32::MAX) {
                let tag = if *v < 0 {
                    PacketType::NegativeInteger
                } else {
                    PacketType::PositiveInteger
                };
                Ok(write_fixed(writer, tag, FixedPayload::U32(magnitude as u32)))
            } else {
                // Out of u32 range: the double framing carries it instead.
                Ok(write_fixed(
                    writer,
                    PacketType::Double,
                    FixedPayload::F64(*v as f64),
                ))
            }
        }
        Value::Double(v) => Ok(write_fixed(
            writer,
            PacketType::Double,
            FixedPayload::F64(*v),
        )),
        Value::Date(millis) => Ok(write_fixed(
            writer,
            PacketType::Date,
            FixedPayload::F64(*millis),
        )),
        Value::String(s) => write_dynamic(writer, PacketType::String, s.len(), |w| {
            w.write_str(s);
        }),
        Value::Bytes(bytes) => write_dynamic(writer, PacketType::Buffer, bytes.len(), |w| {
            w.write_bytes(bytes.clone());
        }),
        Value::Array(items) => {
            let count = u32::try_from(items.len()).map_err(|_| PacketError::ContentTooLarge {
                size: items.len(),
                max: MAX_CONTENT,
            })?;
            // Element sizes are unknown until encoded, so the content is
            // produced into a sub-writer first and spliced in fragment-wise.
            let mut content = BufferListWriter::new();
            content.write_u32(count);
            for item in items {
                write_value(&mut content, item, format)?;
            }
            let content_size = content.len();
            write_dynamic(writer, PacketType::ArrayWithSize, content_size, |w| {
                w.write_writer(content);
            })
        }
        Value::TypedArray { kind, bytes } => write_dynamic(
            writer,
            PacketType::ArrayBufferWithSize,
            1 + bytes.len(),
            |w| {
                w.write_u8(kind.to_wire());
                w.write_bytes(bytes.clone());
            },
        ),
        Value::Object(object) => {
            let text = format.stringify(object).map_err(PacketError::Object)?;
            write_dynamic(writer, PacketType::ObjectStringified, text.len(), |w| {
                w.write_str(&text);
            })
        }
    }
}

/// Full encoded size of a value, computed through a [`LengthWriter`]
/// without materializing the outer frame.
pub fn byte_length(value: &Value, format: &dyn ObjectFormat) -> Result<usize> {
    let mut counter = LengthWriter::new();
    write_value(&mut counter, value, format)?;
    Ok(counter.len())
}

/// Fixed-size frames are assembled in one pre-sized allocation and handed
/// to the writer as a single fragment.
fn write_fixed<W: Writer + ?Sized>(
    writer: &mut W,
    packet_type: PacketType,
    payload: FixedPayload,
) -> Header {
    let header = declare_header(packet_type, 0);
    let mut frame = FixedWriter::with_capacity(header.packet_size());
    frame.write_u8(SEPARATOR);
    frame.write_u8(packet_type.to_wire());
    match payload {
        FixedPayload::None => {}
        FixedPayload::U32(v) => {
            frame.write_u32(v);
        }
        FixedPayload::F64(v) => {
            frame.write_f64(v);
        }
    }
    frame.write_u8(SEPARATOR);

    writer.push_context();
    writer.write_bytes(frame.into_bytes());
    writer.pop_context();
    header
}

/// Write a dynamic frame: header with declared content size, content via
/// the closure, footer.
fn write_dynamic<W, F>(
    writer: &mut W,
    packet_type: PacketType,
    content_size: usize,
    content: F,
) -> Result<Header>
where
    W: Writer + ?Sized,
    F: FnOnce(&mut W),
{
    if content_size > MAX_CONTENT {
        return Err(PacketError::ContentTooLarge {
            size: content_size,
            max: MAX_CONTENT,
        });
    }

    let header = declare_header(packet_type, content_size);
    writer.push_context();
    writer.write_u8(SEPARATOR);
    writer.write_u8(packet_type.to_wire());
    writer.write_u32(content_size as u32);
    content(writer);
    writer.write_u8(SEPARATOR);
    writer.pop_context();
    Ok(header)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use crate::object::JsonFormat;
    use crate::tags::ViewKind;

    use super::*;

    fn encode(value: &Value) -> (Header, Bytes) {
        let mut writer = BufferListWriter::new();
        let header = write_value(&mut writer, value, &JsonFormat).unwrap();
        (header, writer.buffer())
    }

    #[test]
    fn null_frame_is_three_bytes() {
        let (header, bytes) = encode(&Value::Null);
        assert_eq!(
            bytes.as_ref(),
            &[SEPARATOR, PacketType::Null.to_wire(), SEPARATOR]
        );
        assert_eq!(header.packet_size(), bytes.len());
    }

    #[test]
    fn integer_sign_lives_in_the_tag() {
        let (_, positive) = encode(&Value::Int(42));
        let (_, negative) = encode(&Value::Int(-42));
        assert_eq!(positive[1], PacketType::PositiveInteger.to_wire());
        assert_eq!(negative[1], PacketType::NegativeInteger.to_wire());
        // Same magnitude payload either way.
        assert_eq!(positive[2..6], negative[2..6]);
        assert_eq!(u32::from_le_bytes(positive[2..6].try_into().unwrap()), 42);
    }

    #[test]
    fn integer_beyond_u32_becomes_double() {
        let (header, bytes) = encode(&Value::Int(99_999_999_999_999));
        assert_eq!(header.packet_type, PacketType::Double);
        let payload = f64::from_le_bytes(bytes[2..10].try_into().unwrap());
        assert_eq!(payload, 99_999_999_999_999.0);
    }

    #[test]
    fn string_frame_layout() {
        let (header, bytes) = encode(&Value::from("hé"));
        assert_eq!(header.content_size, 3);
        assert_eq!(bytes[1], PacketType::String.to_wire());
        assert_eq!(u32::from_le_bytes(bytes[2..6].try_into().unwrap()), 3);
        assert_eq!(&bytes[6..9], "hé".as_bytes());
        assert_eq!(bytes[9], SEPARATOR);
    }

    #[test]
    fn array_content_counts_then_frames_elements() {
        let (header, bytes) = encode(&Value::Array(vec![Value::Null, Value::Bool(true)]));
        assert_eq!(bytes[1], PacketType::ArrayWithSize.to_wire());
        // content = 4-byte count + two 3-byte fixed frames
        assert_eq!(header.content_size, 4 + 3 + 3);
        assert_eq!(u32::from_le_bytes(bytes[6..10].try_into().unwrap()), 2);
        assert_eq!(bytes[10..13], [SEPARATOR, PacketType::Null.to_wire(), SEPARATOR]);
    }

    #[test]
    fn typed_array_carries_shortcode() {
        let (header, bytes) = encode(&Value::TypedArray {
            kind: ViewKind::F32,
            bytes: Bytes::from_static(&[0, 0, 128, 63]),
        });
        assert_eq!(header.content_size, 5);
        assert_eq!(bytes[6], ViewKind::F32.to_wire());
        assert_eq!(&bytes[7..11], &[0, 0, 128, 63]);
    }

    #[test]
    fn caller_buffer_is_not_copied_into_fragments() {
        let payload = Bytes::from_static(b"shared-backing");
        let mut writer = BufferListWriter::new();
        write_value(&mut writer, &Value::Bytes(payload.clone()), &JsonFormat).unwrap();

        assert!(writer
            .fragments()
            .iter()
            .any(|f| f.as_ptr() == payload.as_ptr()));
    }

    #[test]
    fn byte_length_matches_real_encoding() {
        let values = [
            Value::Null,
            Value::Int(-7),
            Value::from("some text"),
            Value::Array(vec![Value::Double(1.5), Value::from(false)]),
            Value::Object(serde_json::json!({"k": [1, 2, 3]})),
        ];
        for value in &values {
            let (_, bytes) = encode(value);
            assert_eq!(byte_length(value, &JsonFormat).unwrap(), bytes.len());
        }
    }

    #[test]
    fn date_uses_double_payload_under_date_tag() {
        let (header, bytes) = encode(&Value::Date(1_700_000_000_000.0));
        assert_eq!(header.packet_type, PacketType::Date);
        assert_eq!(header.content_size, 8);
        assert_eq!(
            f64::from_le_bytes(bytes[2..10].try_into().unwrap()),
            1_700_000_000_000.0
        );
    }
}
