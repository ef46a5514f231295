//! Sub-message access: wrappers, shared child accessors, attach semantics.

use std::cell::RefCell;
use std::rc::Rc;

use bytes::Bytes;
use lazybuf_wire::{WireType, WireWriter};

use crate::accessor::Accessor;
use crate::checks;
use crate::entry::{Entry, MessageEntry};
use crate::error::AccessorError;
use crate::field_map::DEFAULT_PIVOT;

/// Shared handle to an accessor. The parent entry and every wrapper returned
/// for a field hold the same handle.
pub type SharedAccessor = Rc<RefCell<Accessor>>;

/// Implemented by generated message types that wrap an accessor.
///
/// The wrapper and its accessor are one logical object reached through two
/// interfaces; identity is the shared handle, so two wrappers over the same
/// field compare equal under [`Rc::ptr_eq`] on their accessors.
pub trait Message: Sized {
    /// Wraps an accessor handle in the concrete message type.
    fn wrap(accessor: SharedAccessor) -> Self;
    /// The wrapped accessor handle.
    fn accessor(&self) -> &SharedAccessor;
}

/// A schemaless message wrapper for callers without generated types.
#[derive(Debug, Clone)]
pub struct DynamicMessage {
    accessor: SharedAccessor,
}

impl DynamicMessage {
    /// An empty message.
    pub fn new() -> Self {
        Self::wrap(new_shared(Accessor::new()))
    }

    /// A message over encoded bytes, parsed lazily.
    pub fn from_buffer(buffer: impl Into<Bytes>) -> Self {
        Self::wrap(new_shared(Accessor::from_buffer(buffer)))
    }
}

impl Default for DynamicMessage {
    fn default() -> Self {
        Self::new()
    }
}

impl Message for DynamicMessage {
    fn wrap(accessor: SharedAccessor) -> Self {
        Self { accessor }
    }

    fn accessor(&self) -> &SharedAccessor {
        &self.accessor
    }
}

pub(crate) fn new_shared(accessor: Accessor) -> SharedAccessor {
    Rc::new(RefCell::new(accessor))
}

impl Accessor {
    /// Returns the field as a message, or an empty default when absent.
    ///
    /// A present field is materialized as an immutable snapshot: later calls
    /// return a wrapper over the same child accessor, and the mutable read
    /// paths refuse the field afterwards. An absent field yields a fresh
    /// detached message on every call.
    pub fn get_message<M: Message>(&mut self, field_number: u32) -> Result<M, AccessorError> {
        self.check_read_bounds(field_number)?;
        self.ensure_indexed()?;
        let shared = match self.message_child(field_number, false, DEFAULT_PIVOT)? {
            Some(shared) => shared,
            None => new_shared(Accessor::new()),
        };
        Ok(M::wrap(shared))
    }

    /// Returns the field as an attached mutable message, or `None` when
    /// absent. Attaching makes the child authoritative: mutations through
    /// the returned wrapper serialize through this accessor. Multiple wire
    /// occurrences of the field are merged into one child.
    pub fn get_message_or_null<M: Message>(
        &mut self,
        field_number: u32,
    ) -> Result<Option<M>, AccessorError> {
        self.check_read_bounds(field_number)?;
        self.ensure_indexed()?;
        Ok(self
            .message_child(field_number, true, DEFAULT_PIVOT)?
            .map(M::wrap))
    }

    /// Like [`get_message_or_null`](Accessor::get_message_or_null), but an
    /// absent field creates and attaches an empty child.
    pub fn get_message_attach<M: Message>(&mut self, field_number: u32) -> Result<M, AccessorError> {
        self.get_message_attach_with_pivot(field_number, DEFAULT_PIVOT)
    }

    pub fn get_message_attach_with_pivot<M: Message>(
        &mut self,
        field_number: u32,
        pivot: u32,
    ) -> Result<M, AccessorError> {
        self.check_read_bounds(field_number)?;
        self.ensure_indexed()?;
        if let Some(shared) = self.message_child(field_number, true, pivot)? {
            return Ok(M::wrap(shared));
        }
        let shared = new_shared(Accessor::with_pivot(pivot));
        self.fields.insert(
            field_number,
            Entry::Message(MessageEntry {
                accessor: shared.clone(),
                mutable: true,
            }),
        );
        self.modified = true;
        Ok(M::wrap(shared))
    }

    /// The child accessor for the field, if the field is present.
    ///
    /// A field that is present but not yet materialized yields a transient
    /// accessor over its merged payload; transient accessors are rebuilt on
    /// every call and are not attached to the parent.
    pub fn get_message_accessor_or_null(
        &mut self,
        field_number: u32,
    ) -> Result<Option<SharedAccessor>, AccessorError> {
        self.get_message_accessor_or_null_with_pivot(field_number, DEFAULT_PIVOT)
    }

    pub fn get_message_accessor_or_null_with_pivot(
        &mut self,
        field_number: u32,
        pivot: u32,
    ) -> Result<Option<SharedAccessor>, AccessorError> {
        self.check_read_bounds(field_number)?;
        self.ensure_indexed()?;
        match self.fields.get(field_number) {
            None => Ok(None),
            Some(Entry::Message(entry)) => Ok(Some(entry.accessor.clone())),
            Some(Entry::Raw(ranges)) => {
                if ranges.is_empty() {
                    return Ok(None);
                }
                let content = self.merged_delimited_content(ranges)?;
                Ok(Some(new_shared(Accessor::from_buffer_with_pivot(
                    content, pivot,
                ))))
            }
            Some(Entry::Decoded(scalar)) => {
                let content = delimited_scalar_content(field_number, scalar)?;
                Ok(Some(new_shared(Accessor::from_buffer_with_pivot(
                    content, pivot,
                ))))
            }
            Some(Entry::Repeated(rep)) => match rep.items.last() {
                None => Ok(None),
                Some(scalar) => Err(AccessorError::mismatch(
                    WireType::LengthDelimited,
                    scalar.wire_type(),
                )),
            },
        }
    }

    /// Installs the wrapper's accessor as the field's representation. The
    /// accessor is shared with the wrapper, not copied.
    pub fn set_message<M: Message>(
        &mut self,
        field_number: u32,
        message: &M,
    ) -> Result<(), AccessorError> {
        self.check_write_bounds(field_number)?;
        self.ensure_indexed()?;
        self.fields.insert(
            field_number,
            Entry::Message(MessageEntry {
                accessor: message.accessor().clone(),
                mutable: true,
            }),
        );
        self.modified = true;
        Ok(())
    }

    /// Materializes and returns the field's child accessor, or `None` when
    /// absent. `mutable_view` selects attach semantics: the child becomes
    /// authoritative and the parent re-serializes through it.
    fn message_child(
        &mut self,
        field_number: u32,
        mutable_view: bool,
        pivot: u32,
    ) -> Result<Option<SharedAccessor>, AccessorError> {
        let shared = match self.fields.get(field_number) {
            None => return Ok(None),
            Some(Entry::Message(entry)) => {
                if mutable_view && !entry.mutable && checks::TYPE {
                    return Err(AccessorError::InvalidState(field_number));
                }
                return Ok(Some(entry.accessor.clone()));
            }
            Some(Entry::Raw(ranges)) => {
                if ranges.is_empty() {
                    return Ok(None);
                }
                let content = self.merged_delimited_content(ranges)?;
                new_shared(Accessor::from_buffer_with_pivot(content, pivot))
            }
            Some(Entry::Decoded(scalar)) => {
                let content = delimited_scalar_content(field_number, scalar)?;
                new_shared(Accessor::from_buffer_with_pivot(content, pivot))
            }
            Some(Entry::Repeated(rep)) => match rep.items.last() {
                None => return Ok(None),
                Some(scalar) => {
                    return Err(AccessorError::mismatch(
                        WireType::LengthDelimited,
                        scalar.wire_type(),
                    ));
                }
            },
        };
        self.fields.insert(
            field_number,
            Entry::Message(MessageEntry {
                accessor: shared.clone(),
                mutable: mutable_view,
            }),
        );
        if mutable_view {
            self.modified = true;
        }
        Ok(Some(shared))
    }
}

/// The payload of a decoded delimited scalar, for re-reading it as a child
/// message buffer.
fn delimited_scalar_content(
    field_number: u32,
    scalar: &crate::scalar::Scalar,
) -> Result<Bytes, AccessorError> {
    if scalar.wire_type() != WireType::LengthDelimited {
        if checks::CRITICAL_TYPE {
            return Err(AccessorError::mismatch(
                WireType::LengthDelimited,
                scalar.wire_type(),
            ));
        }
        return Err(AccessorError::InvalidValue {
            field: field_number,
            reason: "field holds a non-delimited scalar",
        });
    }
    let mut w = WireWriter::new();
    scalar.encode_raw(&mut w);
    Ok(Bytes::from(w.flush()))
}
