//! The typed per-scalar accessor surface.
//!
//! One macro invocation per protobuf scalar type generates the singular
//! get/set pair and the repeated operations. String and bytes have no packed
//! wire form, so they do not get a packed setter.

use bytes::Bytes;

use crate::accessor::Accessor;
use crate::error::AccessorError;
use crate::scalar::{Scalar, ScalarKind};

macro_rules! scalar_accessors {
    (
        $kind:ident, $ty:ty,
        $get:ident, $get_or:ident, $set:ident,
        $get_repeated:ident, $add:ident, $extend:ident
        $(, packed: $set_packed:ident)?
    ) => {
        impl Accessor {
            /// Returns the field's value, or the type's zero default when
            /// the field is absent or cleared.
            pub fn $get(&mut self, field_number: u32) -> Result<$ty, AccessorError> {
                self.$get_or(field_number, <$ty>::default())
            }

            /// Returns the field's value, or `default` when the field is
            /// absent or cleared.
            pub fn $get_or(
                &mut self,
                field_number: u32,
                default: $ty,
            ) -> Result<$ty, AccessorError> {
                match self.get_scalar(field_number, ScalarKind::$kind)? {
                    Some(Scalar::$kind(value)) => Ok(value),
                    Some(other) => Err(AccessorError::mismatch(
                        ScalarKind::$kind.wire_type(),
                        other.wire_type(),
                    )),
                    None => Ok(default),
                }
            }

            /// Replaces the field with `value`.
            pub fn $set(
                &mut self,
                field_number: u32,
                value: impl Into<$ty>,
            ) -> Result<(), AccessorError> {
                self.set_scalar(field_number, Scalar::$kind(value.into()))
            }

            /// Returns all elements of the repeated field in wire order,
            /// decoding packed and unpacked occurrences alike.
            pub fn $get_repeated(&mut self, field_number: u32) -> Result<Vec<$ty>, AccessorError> {
                self.get_repeated_scalars(field_number, ScalarKind::$kind)?
                    .into_iter()
                    .map(|scalar| match scalar {
                        Scalar::$kind(value) => Ok(value),
                        other => Err(AccessorError::mismatch(
                            ScalarKind::$kind.wire_type(),
                            other.wire_type(),
                        )),
                    })
                    .collect()
            }

            /// Appends one element to the repeated field.
            pub fn $add(
                &mut self,
                field_number: u32,
                value: impl Into<$ty>,
            ) -> Result<(), AccessorError> {
                self.add_scalar(field_number, ScalarKind::$kind, Scalar::$kind(value.into()))
            }

            /// Appends every element of `values` to the repeated field.
            pub fn $extend(
                &mut self,
                field_number: u32,
                values: impl IntoIterator<Item = $ty>,
            ) -> Result<(), AccessorError> {
                let scalars = values.into_iter().map(Scalar::$kind).collect();
                self.extend_scalars(field_number, ScalarKind::$kind, scalars)
            }

            $(
                /// Replaces the repeated field with `values`, to be emitted
                /// in packed form.
                pub fn $set_packed(
                    &mut self,
                    field_number: u32,
                    values: impl IntoIterator<Item = $ty>,
                ) -> Result<(), AccessorError> {
                    let scalars = values.into_iter().map(Scalar::$kind).collect();
                    self.set_packed_scalars(field_number, scalars)
                }
            )?
        }
    };
}

scalar_accessors!(
    Bool, bool, get_bool, get_bool_or, set_bool, get_repeated_bool, add_unpacked_bool,
    extend_unpacked_bool, packed: set_packed_bool
);
scalar_accessors!(
    Int32, i32, get_int32, get_int32_or, set_int32, get_repeated_int32, add_unpacked_int32,
    extend_unpacked_int32, packed: set_packed_int32
);
scalar_accessors!(
    Uint32, u32, get_uint32, get_uint32_or, set_uint32, get_repeated_uint32, add_unpacked_uint32,
    extend_unpacked_uint32, packed: set_packed_uint32
);
scalar_accessors!(
    Sint32, i32, get_sint32, get_sint32_or, set_sint32, get_repeated_sint32, add_unpacked_sint32,
    extend_unpacked_sint32, packed: set_packed_sint32
);
scalar_accessors!(
    Int64, i64, get_int64, get_int64_or, set_int64, get_repeated_int64, add_unpacked_int64,
    extend_unpacked_int64, packed: set_packed_int64
);
scalar_accessors!(
    Uint64, u64, get_uint64, get_uint64_or, set_uint64, get_repeated_uint64, add_unpacked_uint64,
    extend_unpacked_uint64, packed: set_packed_uint64
);
scalar_accessors!(
    Sint64, i64, get_sint64, get_sint64_or, set_sint64, get_repeated_sint64, add_unpacked_sint64,
    extend_unpacked_sint64, packed: set_packed_sint64
);
scalar_accessors!(
    Fixed32, u32, get_fixed32, get_fixed32_or, set_fixed32, get_repeated_fixed32,
    add_unpacked_fixed32, extend_unpacked_fixed32, packed: set_packed_fixed32
);
scalar_accessors!(
    Sfixed32, i32, get_sfixed32, get_sfixed32_or, set_sfixed32, get_repeated_sfixed32,
    add_unpacked_sfixed32, extend_unpacked_sfixed32, packed: set_packed_sfixed32
);
scalar_accessors!(
    Fixed64, u64, get_fixed64, get_fixed64_or, set_fixed64, get_repeated_fixed64,
    add_unpacked_fixed64, extend_unpacked_fixed64, packed: set_packed_fixed64
);
scalar_accessors!(
    Sfixed64, i64, get_sfixed64, get_sfixed64_or, set_sfixed64, get_repeated_sfixed64,
    add_unpacked_sfixed64, extend_unpacked_sfixed64, packed: set_packed_sfixed64
);
scalar_accessors!(
    Float, f32, get_float, get_float_or, set_float, get_repeated_float, add_unpacked_float,
    extend_unpacked_float, packed: set_packed_float
);
scalar_accessors!(
    Double, f64, get_double, get_double_or, set_double, get_repeated_double, add_unpacked_double,
    extend_unpacked_double, packed: set_packed_double
);
scalar_accessors!(
    String, String, get_string, get_string_or, set_string, get_repeated_string,
    add_unpacked_string, extend_unpacked_string
);
scalar_accessors!(
    Bytes, Bytes, get_bytes, get_bytes_or, set_bytes, get_repeated_bytes, add_unpacked_bytes,
    extend_unpacked_bytes
);
