//! Lazy field accessor over protocol-buffers wire bytes.
//!
//! The accessor sits between encoded buffers and typed message wrappers. It
//! reconciles three concerns at once:
//!
//! - **Zero-copy lazy parsing** — construction records nothing; the first
//!   operation that needs field knowledge indexes the buffer in one scan,
//!   and payloads decode only when a typed read asks for them.
//! - **A mutable overlay** — writes replace a field's entry without forcing
//!   a full decode; untouched fields keep their original bytes.
//! - **Structure-preserving re-serialization** — unknown fields, duplicate
//!   occurrences and sub-message aliasing survive a round-trip; a never-
//!   modified accessor re-emits its source buffer byte for byte.
//!
//! The accessor is schemaless: it never knows a field's declared type. Each
//! typed getter states the type it expects and the recorded wire type is
//! checked against it.
//!
//! # Example
//!
//! ```
//! use lazybuf_core::Accessor;
//!
//! // field 1 = true, encoded twice: last occurrence wins on read.
//! let mut acc = Accessor::from_buffer(vec![0x08, 0x01, 0x08, 0x00]);
//! assert!(!acc.get_bool(1).unwrap());
//!
//! // Reads leave the wire layout intact...
//! assert_eq!(&acc.serialize().unwrap()[..], [0x08, 0x01, 0x08, 0x00]);
//!
//! // ...while a write replaces the field.
//! acc.set_bool(1, true).unwrap();
//! assert_eq!(&acc.serialize().unwrap()[..], [0x08, 0x01]);
//! ```
//!
//! Sub-messages are shared, not copied: a wrapper returned by
//! [`Accessor::get_message_or_null`] and the parent's entry hold the same
//! child accessor, so mutations through the wrapper serialize through the
//! parent.
//!
//! The accessor and its children form a single-threaded ownership domain;
//! even reads mutate the decode cache.

mod accessor;
mod checks;
mod entry;
mod error;
mod field_map;
mod message;
mod scalar;
mod scalars;
mod serialize;

pub use accessor::Accessor;
pub use error::AccessorError;
pub use field_map::DEFAULT_PIVOT;
pub use message::{DynamicMessage, Message, SharedAccessor};

pub use lazybuf_wire::{WireError, WireType, MAX_FIELD_NUMBER};
