//! Error type for accessor operations.

use lazybuf_wire::{WireError, WireType};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessorError {
    #[error("field number out of range: {0}")]
    OutOfRange(u32),
    #[error("Expected wire type: {expected} but found: {found}")]
    WireTypeMismatch {
        expected: WireType,
        found: WireType,
    },
    /// Reserved for embedders whose value sources are dynamically typed; the
    /// typed setter surface of this crate makes it unreachable from safe use.
    #[error("invalid value for field {field}: {reason}")]
    InvalidValue { field: u32, reason: &'static str },
    #[error(transparent)]
    Parse(#[from] WireError),
    #[error("mutable access to field {0} after an immutable view was taken")]
    InvalidState(u32),
}

impl AccessorError {
    pub(crate) fn mismatch(expected: WireType, found: WireType) -> Self {
        AccessorError::WireTypeMismatch { expected, found }
    }
}
