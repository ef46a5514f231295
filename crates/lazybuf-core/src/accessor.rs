//! The lazy field accessor.

use bytes::Bytes;
use lazybuf_wire::{field_number_in_range, WireError, WireReader, WireType};

use crate::checks;
use crate::entry::{Entry, RawRange, RepeatedEntry};
use crate::error::AccessorError;
use crate::field_map::{FieldMap, DEFAULT_PIVOT};
use crate::scalar::{reinterpret, Scalar, ScalarKind};

/// Lazy accessor over protocol-buffers wire bytes.
///
/// Construction never parses. The first operation that needs to know which
/// fields are present indexes the buffer in one scan, recording per field
/// the byte ranges of its occurrences; payloads stay undecoded until a typed
/// read asks for them. Writes replace a field's entry wholesale, while
/// untouched fields keep their original bytes and re-serialize verbatim.
///
/// An accessor and its transitively reachable children form one
/// single-threaded ownership domain. Reads are mutating (the first read of a
/// field freezes its decoded value into the entry), so the typed getters
/// take `&mut self`.
#[derive(Debug)]
pub struct Accessor {
    pub(crate) buffer: Bytes,
    pub(crate) fields: FieldMap,
    pub(crate) indexed: bool,
    pub(crate) modified: bool,
}

impl Default for Accessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Accessor {
    /// An empty accessor with the default pivot.
    pub fn new() -> Self {
        Self::with_pivot(DEFAULT_PIVOT)
    }

    /// An empty accessor with an explicit storage pivot.
    pub fn with_pivot(pivot: u32) -> Self {
        Self {
            buffer: Bytes::new(),
            fields: FieldMap::new(pivot),
            indexed: true,
            modified: false,
        }
    }

    /// An accessor over encoded bytes. No parsing happens here; malformed
    /// input surfaces as a parse error from the first operation that indexes.
    pub fn from_buffer(buffer: impl Into<Bytes>) -> Self {
        Self::from_buffer_with_pivot(buffer, DEFAULT_PIVOT)
    }

    pub fn from_buffer_with_pivot(buffer: impl Into<Bytes>, pivot: u32) -> Self {
        let buffer = buffer.into();
        let indexed = buffer.is_empty();
        Self {
            buffer,
            fields: FieldMap::new(pivot),
            indexed,
            modified: false,
        }
    }

    /// The storage pivot this accessor was created with.
    pub fn pivot(&self) -> u32 {
        self.fields.pivot()
    }

    /// Scans the source buffer once, recording the byte ranges of every
    /// field occurrence. Idempotent; commits only on a fully clean scan.
    pub(crate) fn ensure_indexed(&mut self) -> Result<(), AccessorError> {
        if self.indexed {
            return Ok(());
        }
        let mut fields = FieldMap::new(self.fields.pivot());
        let mut r = WireReader::new(&self.buffer);
        while !r.is_eof() {
            let start = r.pos();
            let (field_number, wire_type) = r.tag()?;
            let data_start = match wire_type {
                WireType::LengthDelimited => {
                    let len = r.varint()?;
                    let data_start = r.pos();
                    if len > r.remaining() as u64 {
                        return Err(AccessorError::Parse(WireError::UnexpectedEof));
                    }
                    r.bytes(len as usize)?;
                    data_start
                }
                _ => {
                    let data_start = r.pos();
                    r.skip(wire_type)?;
                    data_start
                }
            };
            let range = RawRange {
                start,
                data_start,
                end: r.pos(),
                wire_type,
            };
            match fields.get_mut(field_number) {
                Some(Entry::Raw(ranges)) => ranges.push(range),
                _ => {
                    fields.insert(field_number, Entry::Raw(vec![range]));
                }
            }
        }
        self.fields = fields;
        self.indexed = true;
        Ok(())
    }

    pub(crate) fn check_read_bounds(&self, field_number: u32) -> Result<(), AccessorError> {
        if checks::BOUNDS && !field_number_in_range(field_number) {
            return Err(AccessorError::OutOfRange(field_number));
        }
        Ok(())
    }

    pub(crate) fn check_write_bounds(&self, field_number: u32) -> Result<(), AccessorError> {
        if checks::TYPE && !field_number_in_range(field_number) {
            return Err(AccessorError::OutOfRange(field_number));
        }
        Ok(())
    }

    /// Singular read. Returns `None` when the field is absent or cleared.
    ///
    /// A raw entry decodes its *last* occurrence (last-wins for singular
    /// scalars) and freezes the value into the entry; later mutation of
    /// whatever produced the source buffer cannot change the result.
    pub(crate) fn get_scalar(
        &mut self,
        field_number: u32,
        kind: ScalarKind,
    ) -> Result<Option<Scalar>, AccessorError> {
        self.check_read_bounds(field_number)?;
        self.ensure_indexed()?;
        let (value, cache) = match self.fields.get(field_number) {
            None => return Ok(None),
            Some(Entry::Raw(ranges)) => {
                let Some(last) = ranges.last() else {
                    return Ok(None);
                };
                if checks::CRITICAL_TYPE && last.wire_type != kind.wire_type() {
                    return Err(AccessorError::mismatch(kind.wire_type(), last.wire_type));
                }
                (kind.decode(&self.buffer, last.data_start..last.end)?, true)
            }
            Some(Entry::Decoded(scalar)) => {
                if checks::CRITICAL_TYPE && scalar.wire_type() != kind.wire_type() {
                    return Err(AccessorError::mismatch(kind.wire_type(), scalar.wire_type()));
                }
                (reinterpret(kind, scalar)?, false)
            }
            Some(Entry::Message(entry)) => {
                if checks::CRITICAL_TYPE && kind.wire_type() != WireType::LengthDelimited {
                    return Err(AccessorError::mismatch(
                        kind.wire_type(),
                        WireType::LengthDelimited,
                    ));
                }
                let content = entry.accessor.borrow().serialize()?;
                let len = content.len();
                (kind.decode(&content, 0..len)?, false)
            }
            Some(Entry::Repeated(rep)) => match rep.items.last() {
                None => return Ok(None),
                Some(scalar) => {
                    if checks::CRITICAL_TYPE && scalar.wire_type() != kind.wire_type() {
                        return Err(AccessorError::mismatch(kind.wire_type(), scalar.wire_type()));
                    }
                    (reinterpret(kind, scalar)?, false)
                }
            },
        };
        if cache {
            self.fields.insert(field_number, Entry::Decoded(value.clone()));
        }
        Ok(Some(value))
    }

    /// Singular write: replaces the entry, discarding any raw ranges.
    pub(crate) fn set_scalar(
        &mut self,
        field_number: u32,
        value: Scalar,
    ) -> Result<(), AccessorError> {
        self.check_write_bounds(field_number)?;
        self.ensure_indexed()?;
        self.fields.insert(field_number, Entry::Decoded(value));
        self.modified = true;
        Ok(())
    }

    /// Materializes the field as a repeated entry and runs `f` over it. On
    /// error the previous entry is left in place.
    fn with_repeated<R>(
        &mut self,
        field_number: u32,
        kind: ScalarKind,
        f: impl FnOnce(&mut RepeatedEntry) -> R,
    ) -> Result<R, AccessorError> {
        self.ensure_indexed()?;
        let mut rep = match self.fields.remove(field_number) {
            None => RepeatedEntry::default(),
            Some(Entry::Repeated(rep)) => rep,
            Some(Entry::Decoded(scalar)) => RepeatedEntry {
                items: vec![scalar],
                packed: false,
            },
            Some(Entry::Raw(ranges)) => match decode_repeated_ranges(&self.buffer, &ranges, kind) {
                Ok(rep) => rep,
                Err(err) => {
                    self.fields.insert(field_number, Entry::Raw(ranges));
                    return Err(err);
                }
            },
            Some(entry @ Entry::Message(_)) => {
                self.fields.insert(field_number, entry);
                return Err(AccessorError::mismatch(
                    kind.wire_type(),
                    WireType::LengthDelimited,
                ));
            }
        };
        let out = f(&mut rep);
        self.fields.insert(field_number, Entry::Repeated(rep));
        Ok(out)
    }

    /// Repeated read: all elements in wire encounter order.
    pub(crate) fn get_repeated_scalars(
        &mut self,
        field_number: u32,
        kind: ScalarKind,
    ) -> Result<Vec<Scalar>, AccessorError> {
        self.check_read_bounds(field_number)?;
        let items = self.with_repeated(field_number, kind, |rep| rep.items.clone())?;
        items
            .iter()
            .map(|scalar| {
                if checks::CRITICAL_TYPE && scalar.wire_type() != kind.wire_type() {
                    return Err(AccessorError::mismatch(kind.wire_type(), scalar.wire_type()));
                }
                reinterpret(kind, scalar)
            })
            .collect()
    }

    /// Appends one element; the field's emission form becomes unpacked.
    pub(crate) fn add_scalar(
        &mut self,
        field_number: u32,
        kind: ScalarKind,
        value: Scalar,
    ) -> Result<(), AccessorError> {
        self.check_write_bounds(field_number)?;
        self.with_repeated(field_number, kind, |rep| {
            rep.items.push(value);
            rep.packed = false;
        })?;
        self.modified = true;
        Ok(())
    }

    /// Appends many elements; the field's emission form becomes unpacked.
    pub(crate) fn extend_scalars(
        &mut self,
        field_number: u32,
        kind: ScalarKind,
        values: Vec<Scalar>,
    ) -> Result<(), AccessorError> {
        self.check_write_bounds(field_number)?;
        self.with_repeated(field_number, kind, |rep| {
            rep.items.extend(values);
            rep.packed = false;
        })?;
        self.modified = true;
        Ok(())
    }

    /// Replaces the field with a packed-form list.
    pub(crate) fn set_packed_scalars(
        &mut self,
        field_number: u32,
        values: Vec<Scalar>,
    ) -> Result<(), AccessorError> {
        self.check_write_bounds(field_number)?;
        self.ensure_indexed()?;
        self.fields.insert(
            field_number,
            Entry::Repeated(RepeatedEntry {
                items: values,
                packed: true,
            }),
        );
        self.modified = true;
        Ok(())
    }

    /// Whether the field is present: an indexed occurrence, a decoded value,
    /// a child message, or a repeated entry with at least one element.
    pub fn has_field_number(&mut self, field_number: u32) -> Result<bool, AccessorError> {
        self.check_read_bounds(field_number)?;
        self.ensure_indexed()?;
        Ok(self
            .fields
            .get(field_number)
            .map_or(false, Entry::is_present))
    }

    /// Removes the field. Cleared fields do not serialize, report absent,
    /// and return defaults on read. Clearing an absent field is a no-op.
    pub fn clear_field(&mut self, field_number: u32) -> Result<(), AccessorError> {
        self.check_write_bounds(field_number)?;
        self.ensure_indexed()?;
        if self.fields.remove(field_number).is_some() {
            self.modified = true;
        }
        Ok(())
    }

    /// A copy with an independently owned field map.
    ///
    /// Byte ranges, scalar payloads and child accessors are shared;
    /// repeated-field lists are fresh vectors over the shared elements, so a
    /// later add on either side stays on that side. Mutating a shared child
    /// message is visible from both copies.
    pub fn shallow_copy(&self) -> Accessor {
        Accessor {
            buffer: self.buffer.clone(),
            fields: self.fields.clone(),
            indexed: self.indexed,
            modified: self.modified,
        }
    }

    /// Field numbers that currently report presence, ascending.
    pub fn field_numbers(&mut self) -> Result<Vec<u32>, AccessorError> {
        self.ensure_indexed()?;
        Ok(self
            .fields
            .iter()
            .filter(|(_, entry)| entry.is_present())
            .map(|(n, _)| n)
            .collect())
    }

    /// Whether no field reports presence.
    pub fn is_empty(&mut self) -> Result<bool, AccessorError> {
        Ok(self.field_numbers()?.is_empty())
    }

    /// Merged length-delimited content of a raw entry's ranges, in encounter
    /// order. A single range is shared zero-copy with the source buffer.
    pub(crate) fn merged_delimited_content(
        &self,
        ranges: &[RawRange],
    ) -> Result<Bytes, AccessorError> {
        if checks::CRITICAL_TYPE {
            if let Some(range) = ranges
                .iter()
                .find(|r| r.wire_type != WireType::LengthDelimited)
            {
                return Err(AccessorError::mismatch(
                    WireType::LengthDelimited,
                    range.wire_type,
                ));
            }
        }
        match ranges {
            [single] => Ok(self.buffer.slice(single.data_start..single.end)),
            _ => {
                let mut out = Vec::new();
                for range in ranges {
                    out.extend_from_slice(&self.buffer[range.data_start..range.end]);
                }
                Ok(Bytes::from(out))
            }
        }
    }
}

/// Decodes every occurrence of a repeated field, in encounter order. For
/// packable element kinds a length-delimited occurrence is a packed run;
/// for string/bytes each occurrence is one element.
fn decode_repeated_ranges(
    buffer: &Bytes,
    ranges: &[RawRange],
    kind: ScalarKind,
) -> Result<RepeatedEntry, AccessorError> {
    let mut items = Vec::new();
    let mut packed = false;
    for range in ranges {
        match range.wire_type {
            WireType::LengthDelimited if kind.is_packable() => {
                let mut r = WireReader::new(&buffer[range.data_start..range.end]);
                while !r.is_eof() {
                    items.push(kind.decode_next(&mut r)?);
                }
                packed = true;
            }
            wt if wt == kind.wire_type() => {
                items.push(kind.decode(buffer, range.data_start..range.end)?);
                packed = false;
            }
            wt => {
                if checks::CRITICAL_TYPE {
                    return Err(AccessorError::mismatch(kind.wire_type(), wt));
                }
                items.push(kind.decode(buffer, range.data_start..range.end)?);
                packed = false;
            }
        }
    }
    Ok(RepeatedEntry { items, packed })
}
