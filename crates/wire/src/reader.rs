//! Cursor-based wire-format decoder.

use crate::{field_number_in_range, WireError, WireType};

/// A decoding cursor over a byte slice.
///
/// All reads are bounds-checked and advance the cursor only on success, so a
/// failed read leaves the position where the offending value started.
#[derive(Debug, Clone, Copy)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Creates a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current cursor position in bytes from the start of the slice.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Reads one byte.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, WireError> {
        let b = *self.data.get(self.pos).ok_or(WireError::UnexpectedEof)?;
        self.pos += 1;
        Ok(b)
    }

    /// Reads a base-128 varint of up to 10 bytes.
    pub fn varint(&mut self) -> Result<u64, WireError> {
        let start = self.pos;
        let mut result: u64 = 0;
        for i in 0..10 {
            let b = match self.u8() {
                Ok(b) => b,
                Err(e) => {
                    self.pos = start;
                    return Err(e);
                }
            };
            if i == 9 && b > 1 {
                self.pos = start;
                return Err(WireError::VarintOverflow);
            }
            result |= ((b & 0x7f) as u64) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(result);
            }
        }
        self.pos = start;
        Err(WireError::VarintOverflow)
    }

    /// Reads 4 little-endian bytes.
    pub fn fixed32(&mut self) -> Result<u32, WireError> {
        let bytes = self.bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads 8 little-endian bytes.
    pub fn fixed64(&mut self) -> Result<u64, WireError> {
        let bytes = self.bytes(8)?;
        Ok(u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    /// Reads `n` raw bytes.
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() < n {
            return Err(WireError::UnexpectedEof);
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.data[start..self.pos])
    }

    /// Reads a varint length prefix followed by that many bytes.
    pub fn len_prefixed(&mut self) -> Result<&'a [u8], WireError> {
        let start = self.pos;
        let len = self.varint()?;
        if len > self.remaining() as u64 {
            self.pos = start;
            return Err(WireError::UnexpectedEof);
        }
        self.bytes(len as usize)
    }

    /// Decodes a tag into its field number and wire type.
    ///
    /// Rejects field number zero, field numbers above the legal maximum, and
    /// the deprecated group wire types.
    pub fn tag(&mut self) -> Result<(u32, WireType), WireError> {
        let start = self.pos;
        let raw = self.varint()?;
        let result = Self::split_tag(raw);
        if result.is_err() {
            self.pos = start;
        }
        result
    }

    fn split_tag(raw: u64) -> Result<(u32, WireType), WireError> {
        if raw > u32::MAX as u64 {
            return Err(WireError::TagOverflow(raw));
        }
        let raw = raw as u32;
        let wire_type = WireType::from_code((raw & 0b111) as u8)?;
        if matches!(wire_type, WireType::StartGroup | WireType::EndGroup) {
            return Err(WireError::GroupUnsupported);
        }
        let field_number = raw >> 3;
        if !field_number_in_range(field_number) {
            return Err(WireError::InvalidFieldNumber(field_number));
        }
        Ok((field_number, wire_type))
    }

    /// Advances past one payload of the given wire type.
    pub fn skip(&mut self, wire_type: WireType) -> Result<(), WireError> {
        match wire_type {
            WireType::Varint => {
                self.varint()?;
            }
            WireType::Fixed64 => {
                self.bytes(8)?;
            }
            WireType::LengthDelimited => {
                self.len_prefixed()?;
            }
            WireType::Fixed32 => {
                self.bytes(4)?;
            }
            WireType::StartGroup | WireType::EndGroup => {
                return Err(WireError::GroupUnsupported);
            }
        }
        Ok(())
    }
}
