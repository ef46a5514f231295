//! Wire-format primitives for the protocol-buffers binary encoding.
//!
//! This crate provides the byte-level building blocks the lazy accessor is
//! built on:
//!
//! - [`WireType`] — the 3-bit payload-layout selector carried in every tag.
//! - [`WireReader`] — a cursor-based decoder over a byte slice.
//! - [`WireWriter`] — an auto-growing encoder.
//! - zig-zag helpers for the `sint32`/`sint64` encodings.
//!
//! A tag is `(field_number << 3) | wire_type`, encoded as a varint. Field
//! numbers range over `1..=MAX_FIELD_NUMBER`. The deprecated group wire
//! types (3 and 4) are recognized but rejected by [`WireReader::tag`].
//!
//! # Example
//!
//! ```
//! use lazybuf_wire::{WireReader, WireWriter, WireType};
//!
//! let mut w = WireWriter::new();
//! w.tag(1, WireType::Varint);
//! w.varint(150);
//! let data = w.flush();
//! assert_eq!(data, [0x08, 0x96, 0x01]);
//!
//! let mut r = WireReader::new(&data);
//! assert_eq!(r.tag().unwrap(), (1, WireType::Varint));
//! assert_eq!(r.varint().unwrap(), 150);
//! ```

mod reader;
mod writer;

pub use reader::WireReader;
pub use writer::WireWriter;

use std::fmt;
use thiserror::Error;

/// Largest legal field number, `2^29 - 1`.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Error type for wire-level decoding.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("varint exceeds 64 bits")]
    VarintOverflow,
    #[error("tag value exceeds 32 bits: {0}")]
    TagOverflow(u64),
    #[error("field number out of range: {0}")]
    InvalidFieldNumber(u32),
    #[error("unsupported wire type: {0}")]
    UnsupportedWireType(u8),
    #[error("group wire types are not supported")]
    GroupUnsupported,
    #[error("invalid UTF-8 in string payload")]
    InvalidUtf8,
}

/// The payload layout selector carried in the low 3 bits of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WireType {
    /// Variable-length integer (bool, int32/64, uint32/64, sint32/64, enum).
    Varint = 0,
    /// 8 little-endian bytes (fixed64, sfixed64, double).
    Fixed64 = 1,
    /// Varint length prefix followed by that many bytes (string, bytes,
    /// embedded messages, packed repeated fields).
    LengthDelimited = 2,
    /// Group start, deprecated in proto3.
    StartGroup = 3,
    /// Group end, deprecated in proto3.
    EndGroup = 4,
    /// 4 little-endian bytes (fixed32, sfixed32, float).
    Fixed32 = 5,
}

impl WireType {
    /// Decodes the low 3 bits of a tag into a wire type.
    pub fn from_code(code: u8) -> Result<WireType, WireError> {
        match code & 0b111 {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            3 => Ok(WireType::StartGroup),
            4 => Ok(WireType::EndGroup),
            5 => Ok(WireType::Fixed32),
            other => Err(WireError::UnsupportedWireType(other)),
        }
    }

    /// Numeric code as carried on the wire.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Whether values of this wire type may appear inside a packed run.
    #[inline]
    pub const fn is_packable(self) -> bool {
        matches!(
            self,
            WireType::Varint | WireType::Fixed64 | WireType::Fixed32
        )
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Builds the varint value of a tag from a field number and wire type.
#[inline]
pub const fn make_tag(field_number: u32, wire_type: WireType) -> u32 {
    (field_number << 3) | wire_type.code() as u32
}

/// Returns whether `n` is a legal field number.
#[inline]
pub const fn field_number_in_range(n: u32) -> bool {
    n >= 1 && n <= MAX_FIELD_NUMBER
}

/// Zig-zag encodes a signed 32-bit value (the `sint32` encoding).
#[inline]
pub const fn encode_zigzag32(n: i32) -> u32 {
    ((n as u32) << 1) ^ ((n >> 31) as u32)
}

/// Zig-zag encodes a signed 64-bit value (the `sint64` encoding).
#[inline]
pub const fn encode_zigzag64(n: i64) -> u64 {
    ((n as u64) << 1) ^ ((n >> 63) as u64)
}

/// Inverse of [`encode_zigzag32`].
#[inline]
pub const fn decode_zigzag32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

/// Inverse of [`encode_zigzag64`].
#[inline]
pub const fn decode_zigzag64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}
