//! Canonical serialization of accessor state.

use bytes::Bytes;
use lazybuf_wire::{WireType, WireWriter};

use crate::accessor::Accessor;
use crate::entry::{Entry, RepeatedEntry};
use crate::error::AccessorError;

impl Accessor {
    /// Encodes all live fields into a fresh buffer.
    ///
    /// An accessor that was never modified (no writes, no clears, no mutable
    /// message attach) re-emits its source buffer verbatim, preserving the
    /// original byte layout exactly. Otherwise fields are emitted in
    /// ascending field-number order: raw entries as their original bytes in
    /// encounter order, decoded entries as tag plus canonical payload,
    /// repeated entries in their recorded packed or unpacked form, message
    /// entries as the child's recursive serialization in a single
    /// length-delimited record.
    ///
    /// Serialization is a pure read; no entry is materialized or replaced.
    pub fn serialize(&self) -> Result<Bytes, AccessorError> {
        if !self.modified {
            return Ok(self.buffer.clone());
        }
        let mut w = WireWriter::new();
        for (field_number, entry) in self.fields.iter() {
            match entry {
                Entry::Raw(ranges) => {
                    for range in ranges {
                        w.raw(&self.buffer[range.start..range.end]);
                    }
                }
                Entry::Decoded(scalar) => scalar.encode_field(field_number, &mut w),
                Entry::Repeated(rep) => encode_repeated(field_number, rep, &mut w),
                Entry::Message(entry) => {
                    let child = entry.accessor.borrow().serialize()?;
                    w.tag(field_number, WireType::LengthDelimited);
                    w.len_prefixed(&child);
                }
            }
        }
        Ok(Bytes::from(w.flush()))
    }
}

fn encode_repeated(field_number: u32, rep: &RepeatedEntry, w: &mut WireWriter) {
    if rep.items.is_empty() {
        return;
    }
    let packable = rep.packed && rep.items.iter().all(|s| s.wire_type().is_packable());
    if packable {
        let mut payload = WireWriter::new();
        for item in &rep.items {
            item.encode_raw(&mut payload);
        }
        w.tag(field_number, WireType::LengthDelimited);
        w.len_prefixed(payload.as_slice());
    } else {
        for item in &rep.items {
            item.encode_field(field_number, w);
        }
    }
}
