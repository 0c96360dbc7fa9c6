//! Sequential-access byte cursors over contiguous and fragmented buffers.
//!
//! Everything above this crate consumes only the [`Reader`] and [`Writer`]
//! contracts — never fragment layout or transport details. Five
//! implementations are provided:
//!
//! - [`BufferListWriter`] — appends into a growable list of owned fragments,
//!   never copying caller buffers
//! - [`FixedWriter`] — one pre-sized allocation at an advancing offset
//! - [`LengthWriter`] — counts bytes without storing them
//! - [`BufferReader`] — a flat cursor over one contiguous buffer
//! - [`BufferListReader`] — walks an ordered fragment list, consolidating
//!   runs of fragments only when a read spans their boundary
//!
//! All multi-byte integers are little-endian.

pub mod error;
pub mod fixed;
pub mod length;
pub mod list_reader;
pub mod list_writer;
pub mod reader;
pub mod traits;

pub use error::{BufferError, Result};
pub use fixed::FixedWriter;
pub use length::LengthWriter;
pub use list_reader::{BufferListReader, DEFAULT_RETAIN_THRESHOLD};
pub use list_writer::BufferListWriter;
pub use reader::BufferReader;
pub use traits::{Reader, Writer};
