//! Self-describing binary packet format.
//!
//! Every value is framed as marker + type + optional length + payload +
//! footer:
//!
//! ```text
//! Fixed frame:   ┌───────────┬──────────┬─────────────────┬────────────┐
//!                │ Marker 1B │ Type 1B  │ 0|4|8 B payload │ Footer 1B  │
//!                └───────────┴──────────┴─────────────────┴────────────┘
//! Dynamic frame: ┌───────────┬──────────┬────────────────┬─────────────┬────────────┐
//!                │ Marker 1B │ Type 1B  │ Length (4B LE) │ Payload     │ Footer 1B  │
//!                └───────────┴──────────┴────────────────┴─────────────┴────────────┘
//! ```
//!
//! Array payloads are a `u32` element count followed by concatenated
//! fully-framed elements, which is what makes [`Packet::array_at`] possible
//! without decoding the siblings. All integers little-endian.

pub mod decode;
pub mod encode;
pub mod error;
pub mod header;
pub mod object;
pub mod packet;
pub mod tags;
pub mod value;

pub use decode::{by_pass, parse_array_at, parse_array_length, parse_array_slice, read_value};
pub use encode::{byte_length, write_value};
pub use error::{PacketError, Result};
pub use header::{
    declare_header, peek_header, read_header, Header, DYNAMIC_HEADER_SIZE, FIXED_HEADER_SIZE,
    FOOTER_SIZE,
};
pub use object::{JsonFormat, ObjectFormat, ObjectFormatError};
pub use packet::{decode_value, encode_value, Packet};
pub use tags::{PacketType, ViewKind, SEPARATOR};
pub use value::Value;
