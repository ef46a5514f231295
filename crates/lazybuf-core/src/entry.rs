//! Field entry states.

use lazybuf_wire::WireType;

use crate::message::SharedAccessor;
use crate::scalar::Scalar;

/// One encoded occurrence of a field inside the source buffer.
///
/// `start..end` covers the tag through the end of the payload; `data_start`
/// marks where the payload begins. For length-delimited occurrences
/// `data_start` points past the length prefix, so `data_start..end` is the
/// content itself.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawRange {
    pub start: usize,
    pub data_start: usize,
    pub end: usize,
    pub wire_type: WireType,
}

#[derive(Debug, Clone)]
pub(crate) struct MessageEntry {
    pub accessor: SharedAccessor,
    /// False once the field has been materialized through the immutable read
    /// path; mutable views are refused afterwards.
    pub mutable: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RepeatedEntry {
    pub items: Vec<Scalar>,
    /// Preferred emission form. Lists decoded from a packed run re-emit
    /// packed; any unpacked add switches the list to unpacked.
    pub packed: bool,
}

/// What is known about one field number.
///
/// A field transitions from `Raw` to one of the materialized states on its
/// first typed read or any write, never back. Explicitly cleared fields are
/// simply removed from the map.
#[derive(Debug, Clone)]
pub(crate) enum Entry {
    /// Indexed but not yet decoded: byte ranges in encounter order.
    Raw(Vec<RawRange>),
    /// A materialized singular scalar.
    Decoded(Scalar),
    /// A shared child accessor for a sub-message field.
    Message(MessageEntry),
    /// Materialized elements of a repeated scalar field.
    Repeated(RepeatedEntry),
}

impl Entry {
    /// Presence under `has_field_number` rules: raw needs at least one
    /// range, repeated needs at least one element.
    pub(crate) fn is_present(&self) -> bool {
        match self {
            Entry::Raw(ranges) => !ranges.is_empty(),
            Entry::Repeated(rep) => !rep.items.is_empty(),
            Entry::Decoded(_) | Entry::Message(_) => true,
        }
    }
}
