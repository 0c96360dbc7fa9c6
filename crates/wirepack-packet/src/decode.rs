use wirepack_buffers::Reader;

use crate::error::{PacketError, Result};
use crate::header::{read_header, Header, FOOTER_SIZE};
use crate::object::ObjectFormat;
use crate::tags::{PacketType, ViewKind, SEPARATOR};
use crate::value::Value;

/// Decode one complete frame from the reader.
///
/// Returns `Ok(None)` while the frame is incomplete — the expected steady
/// state mid-stream, with the cursor left at the frame start so the caller
/// can retry after appending more bytes. An unrecognized header is an
/// error: terminal for the stream, never repaired.
pub fn read_value<R: Reader + ?Sized>(
    reader: &mut R,
    format: &dyn ObjectFormat,
) -> Result<Option<Value>> {
    let header = read_header(reader)?;
    match header.packet_type {
        PacketType::PartialHeader => return Ok(None),
        PacketType::NotValid => return Err(PacketError::InvalidHeader),
        _ => {}
    }
    let value = read_content(reader, &header, format)?;
    read_footer(reader)?;
    Ok(Some(value))
}

fn read_content<R: Reader + ?Sized>(
    reader: &mut R,
    header: &Header,
    format: &dyn ObjectFormat,
) -> Result<Value> {
    match header.packet_type {
        PacketType::Null => Ok(Value::Null),
        PacketType::Undefined => Ok(Value::Undefined),
        PacketType::BooleanTrue => Ok(Value::Bool(true)),
        PacketType::BooleanFalse => Ok(Value::Bool(false)),
        PacketType::PositiveInteger => Ok(Value::Int(i64::from(reader.read_u32()?))),
        PacketType::NegativeInteger => Ok(Value::Int(-i64::from(reader.read_u32()?))),
        PacketType::Double => Ok(Value::Double(reader.read_f64()?)),
        PacketType::Date => Ok(Value::Date(reader.read_f64()?)),
        PacketType::String => Ok(Value::String(reader.read_str(header.content_size)?)),
        PacketType::Buffer => Ok(Value::Bytes(reader.read_bytes(header.content_size)?)),
        PacketType::ObjectStringified => {
            let text = reader.read_str(header.content_size)?;
            Ok(Value::Object(
                format.parse(&text).map_err(PacketError::Object)?,
            ))
        }
        PacketType::ArrayBufferWithSize => {
            if header.content_size == 0 {
                return Err(PacketError::Truncated);
            }
            let shortcode = reader.read_u8()?;
            let kind = ViewKind::from_wire(shortcode)
                .ok_or(PacketError::UnknownViewKind { byte: shortcode })?;
            let bytes = reader.read_bytes(header.content_size - 1)?;
            Ok(Value::TypedArray { kind, bytes })
        }
        PacketType::ArrayWithSize => {
            if header.content_size < 4 {
                return Err(PacketError::Truncated);
            }
            let count = reader.read_u32()? as usize;
            // Smallest element frame is 3 bytes; a count promising more than
            // the content can hold is a lie, not a reason to preallocate.
            let mut items = Vec::with_capacity(count.min(header.content_size / 3));
            for _ in 0..count {
                match read_value(reader, format)? {
                    Some(item) => items.push(item),
                    None => return Err(PacketError::Truncated),
                }
            }
            Ok(Value::Array(items))
        }
        PacketType::NotValid | PacketType::PartialHeader => Err(PacketError::InvalidHeader),
    }
}

fn read_footer<R: Reader + ?Sized>(reader: &mut R) -> Result<()> {
    let byte = reader.read_u8()?;
    if byte != SEPARATOR {
        return Err(PacketError::BadFooter { byte });
    }
    Ok(())
}

/// Skip one complete frame without materializing its content, using only
/// the header-declared size. Returns the skipped header, or `None` if the
/// frame is still incomplete.
pub fn by_pass<R: Reader + ?Sized>(reader: &mut R) -> Result<Option<Header>> {
    let header = read_header(reader)?;
    match header.packet_type {
        PacketType::PartialHeader => Ok(None),
        PacketType::NotValid => Err(PacketError::InvalidHeader),
        _ => {
            reader.skip(header.content_size + FOOTER_SIZE)?;
            Ok(Some(header))
        }
    }
}

/// Element count of the array frame at the cursor, without decoding any
/// element. `None` unless the cursor sits at a complete array frame. The
/// cursor is restored afterwards.
pub fn parse_array_length<R: Reader + ?Sized>(reader: &mut R) -> Result<Option<u32>> {
    reader.pushd();
    let out = array_length_inner(reader);
    reader.popd();
    out
}

fn array_length_inner<R: Reader + ?Sized>(reader: &mut R) -> Result<Option<u32>> {
    let header = read_header(reader)?;
    if header.packet_type != PacketType::ArrayWithSize || header.content_size < 4 {
        return Ok(None);
    }
    Ok(Some(reader.read_u32()?))
}

/// Decode only element `index` of the array frame at the cursor, by-passing
/// the elements before it. `None` for a non-array frame or an out-of-range
/// index. The cursor is restored afterwards.
pub fn parse_array_at<R: Reader + ?Sized>(
    reader: &mut R,
    index: u32,
    format: &dyn ObjectFormat,
) -> Result<Option<Value>> {
    reader.pushd();
    let out = array_at_inner(reader, index, format);
    reader.popd();
    out
}

fn array_at_inner<R: Reader + ?Sized>(
    reader: &mut R,
    index: u32,
    format: &dyn ObjectFormat,
) -> Result<Option<Value>> {
    let header = read_header(reader)?;
    if header.packet_type != PacketType::ArrayWithSize || header.content_size < 4 {
        return Ok(None);
    }
    let count = reader.read_u32()?;
    if index >= count {
        return Ok(None);
    }
    for _ in 0..index {
        if by_pass(reader)?.is_none() {
            return Err(PacketError::Truncated);
        }
    }
    match read_value(reader, format)? {
        Some(value) => Ok(Some(value)),
        None => Err(PacketError::Truncated),
    }
}

/// Decode elements `start..end` of the array frame at the cursor,
/// by-passing everything before `start`. Bounds are normalized like a
/// standard sequence slice: omitted `start` is 0, omitted `end` is the
/// element count, negative bounds count from the end, and everything is
/// clamped into range (an inverted range is simply empty). `None` unless
/// the cursor sits at a complete array frame. The cursor is restored
/// afterwards.
pub fn parse_array_slice<R: Reader + ?Sized>(
    reader: &mut R,
    start: Option<i64>,
    end: Option<i64>,
    format: &dyn ObjectFormat,
) -> Result<Option<Vec<Value>>> {
    reader.pushd();
    let out = array_slice_inner(reader, start, end, format);
    reader.popd();
    out
}

fn array_slice_inner<R: Reader + ?Sized>(
    reader: &mut R,
    start: Option<i64>,
    end: Option<i64>,
    format: &dyn ObjectFormat,
) -> Result<Option<Vec<Value>>> {
    let header = read_header(reader)?;
    if header.packet_type != PacketType::ArrayWithSize || header.content_size < 4 {
        return Ok(None);
    }
    let count = i64::from(reader.read_u32()?);

    let clamp = |bound: i64| -> i64 {
        if bound < 0 {
            (count + bound).max(0)
        } else {
            bound.min(count)
        }
    };
    let start = clamp(start.unwrap_or(0));
    let end = clamp(end.unwrap_or(count));
    if end <= start {
        return Ok(Some(Vec::new()));
    }

    for _ in 0..start {
        if by_pass(reader)?.is_none() {
            return Err(PacketError::Truncated);
        }
    }
    let mut items = Vec::with_capacity((end - start) as usize);
    for _ in start..end {
        match read_value(reader, format)? {
            Some(value) => items.push(value),
            None => return Err(PacketError::Truncated),
        }
    }
    Ok(Some(items))
}
