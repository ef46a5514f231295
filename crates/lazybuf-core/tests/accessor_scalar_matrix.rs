//! Singular scalar access matrix: lazy reads, last-wins, overwrites, wire
//! round-trips and the error surface.

use bytes::Bytes;
use hex_literal::hex;
use lazybuf_core::{Accessor, AccessorError};

// ---------------------------------------------------------------------------
// Lazy reads and round-trips
// ---------------------------------------------------------------------------

#[test]
fn bool_read_and_verbatim_reserialize() {
    let mut acc = Accessor::from_buffer(hex!("0801").to_vec());
    assert!(acc.get_bool_or(1, false).unwrap());
    assert_eq!(acc.serialize().unwrap().as_ref(), hex!("0801"));
}

#[test]
fn bool_last_occurrence_wins() {
    let mut acc = Accessor::from_buffer(hex!("08010800").to_vec());
    assert!(!acc.get_bool(1).unwrap());
    // No write happened, so the duplicate layout survives.
    assert_eq!(acc.serialize().unwrap().as_ref(), hex!("08010800"));
}

#[test]
fn set_replaces_all_occurrences() {
    let mut acc = Accessor::from_buffer(hex!("08010800").to_vec());
    acc.set_bool(1, true).unwrap();
    assert_eq!(acc.serialize().unwrap().as_ref(), hex!("0801"));
}

#[test]
fn unread_buffer_roundtrips_verbatim_in_any_field_order() {
    // field 2 before field 1; a verbatim round-trip preserves that.
    let input = hex!("10010801").to_vec();
    let acc = Accessor::from_buffer(input.clone());
    assert_eq!(acc.serialize().unwrap(), input);
}

#[test]
fn fixed32_read() {
    let mut acc = Accessor::from_buffer(hex!("0D01000000").to_vec());
    assert_eq!(acc.get_fixed32(1).unwrap(), 1);
}

#[test]
fn string_read() {
    let mut acc = Accessor::from_buffer(hex!("0A0161").to_vec());
    assert_eq!(acc.get_string(1).unwrap(), "a");
}

#[test]
fn bytes_read_shares_the_source() {
    let mut acc = Accessor::from_buffer(hex!("0A03000102").to_vec());
    assert_eq!(acc.get_bytes(1).unwrap(), Bytes::from_static(&[0, 1, 2]));
}

#[test]
fn varint_scalars_roundtrip_through_set_and_get() {
    let mut acc = Accessor::new();
    acc.set_int32(1, -1).unwrap();
    acc.set_uint32(2, u32::MAX).unwrap();
    acc.set_sint32(3, i32::MIN).unwrap();
    acc.set_int64(4, i64::MIN).unwrap();
    acc.set_uint64(5, u64::MAX).unwrap();
    acc.set_sint64(6, -736_983i64).unwrap();
    assert_eq!(acc.get_int32(1).unwrap(), -1);
    assert_eq!(acc.get_uint32(2).unwrap(), u32::MAX);
    assert_eq!(acc.get_sint32(3).unwrap(), i32::MIN);
    assert_eq!(acc.get_int64(4).unwrap(), i64::MIN);
    assert_eq!(acc.get_uint64(5).unwrap(), u64::MAX);
    assert_eq!(acc.get_sint64(6).unwrap(), -736_983);
}

#[test]
fn fixed_scalars_roundtrip_through_set_and_get() {
    let mut acc = Accessor::new();
    acc.set_fixed32(1, 7u32).unwrap();
    acc.set_sfixed32(2, -7).unwrap();
    acc.set_fixed64(3, u64::MAX).unwrap();
    acc.set_sfixed64(4, i64::MIN).unwrap();
    acc.set_float(5, 1.5f32).unwrap();
    acc.set_double(6, -0.25).unwrap();
    assert_eq!(acc.get_fixed32(1).unwrap(), 7);
    assert_eq!(acc.get_sfixed32(2).unwrap(), -7);
    assert_eq!(acc.get_fixed64(3).unwrap(), u64::MAX);
    assert_eq!(acc.get_sfixed64(4).unwrap(), i64::MIN);
    assert_eq!(acc.get_float(5).unwrap(), 1.5);
    assert_eq!(acc.get_double(6).unwrap(), -0.25);
}

#[test]
fn float_values_are_single_precision() {
    let mut acc = Accessor::new();
    acc.set_float(1, 1.6f64 as f32).unwrap();
    assert_eq!(acc.get_float(1).unwrap(), 1.6f64 as f32);
    assert_ne!(acc.get_float(1).unwrap() as f64, 1.6f64);
}

#[test]
fn set_then_serialize_emits_canonical_records() {
    let mut acc = Accessor::new();
    acc.set_string(1, "a").unwrap();
    assert_eq!(acc.serialize().unwrap().as_ref(), hex!("0A0161"));

    let mut acc = Accessor::new();
    acc.set_sint32(4, -456).unwrap();
    assert_eq!(acc.serialize().unwrap().as_ref(), hex!("208F07"));

    let mut acc = Accessor::new();
    acc.set_uint32(1, 215_874_321u32).unwrap();
    assert_eq!(acc.serialize().unwrap().as_ref(), hex!("0891F6F766"));
}

#[test]
fn negative_int32_reserializes_sign_extended() {
    let mut acc = Accessor::from_buffer(hex!("08FFFFFFFFFFFFFFFFFF01").to_vec());
    assert_eq!(acc.get_int32(1).unwrap(), -1);
    acc.set_bool(2, true).unwrap();
    // The decoded int32 re-emits its full ten-byte sign extension.
    assert_eq!(
        acc.serialize().unwrap().as_ref(),
        hex!("08FFFFFFFFFFFFFFFFFF011001")
    );
}

#[test]
fn serialize_orders_fields_ascending_after_writes() {
    let mut acc = Accessor::new();
    acc.set_bool(100, true).unwrap();
    acc.set_bool(1, true).unwrap();
    acc.set_bool(24, true).unwrap();
    assert_eq!(acc.serialize().unwrap().as_ref(), hex!("0801C00101A00601"));
}

// ---------------------------------------------------------------------------
// Defaults, has, clear
// ---------------------------------------------------------------------------

#[test]
fn absent_fields_return_defaults() {
    let mut acc = Accessor::new();
    assert!(!acc.get_bool(1).unwrap());
    assert_eq!(acc.get_int32(1).unwrap(), 0);
    assert_eq!(acc.get_string(1).unwrap(), "");
    assert_eq!(acc.get_bool_or(1, true).unwrap(), true);
    assert_eq!(acc.get_int32_or(2, 42).unwrap(), 42);
    assert_eq!(acc.get_string_or(3, "x".to_owned()).unwrap(), "x");
}

#[test]
fn empty_accessor_has_nothing_and_serializes_empty() {
    let mut acc = Accessor::new();
    assert!(!acc.has_field_number(1).unwrap());
    assert!(acc.is_empty().unwrap());
    assert!(acc.serialize().unwrap().is_empty());
}

#[test]
fn has_reflects_wire_presence_and_writes() {
    let mut acc = Accessor::from_buffer(hex!("08011001").to_vec());
    assert!(acc.has_field_number(1).unwrap());
    assert!(acc.has_field_number(2).unwrap());
    assert!(!acc.has_field_number(3).unwrap());
    acc.set_bool(3, true).unwrap();
    assert!(acc.has_field_number(3).unwrap());
}

#[test]
fn clear_removes_the_field() {
    let mut acc = Accessor::from_buffer(hex!("08011001").to_vec());
    acc.clear_field(1).unwrap();
    assert!(!acc.has_field_number(1).unwrap());
    assert!(!acc.get_bool(1).unwrap());
    assert_eq!(acc.get_bool_or(1, true).unwrap(), true);
    assert_eq!(acc.serialize().unwrap().as_ref(), hex!("1001"));
    // Clearing again (or clearing an absent field) is a no-op.
    acc.clear_field(1).unwrap();
    acc.clear_field(9).unwrap();
}

#[test]
fn field_numbers_are_ascending() {
    let mut acc = Accessor::from_buffer(hex!("10010801").to_vec());
    assert_eq!(acc.field_numbers().unwrap(), [1, 2]);
    acc.set_bool(30, true).unwrap();
    assert_eq!(acc.field_numbers().unwrap(), [1, 2, 30]);
}

#[test]
fn cached_reads_survive_source_reuse() {
    let source = hex!("08010800").to_vec();
    let mut acc = Accessor::from_buffer(source);
    let first = acc.get_bool(1).unwrap();
    // The first read froze the value into the entry.
    assert_eq!(acc.get_bool(1).unwrap(), first);
    assert_eq!(acc.get_bool(1).unwrap(), false);
}

// ---------------------------------------------------------------------------
// Pivot
// ---------------------------------------------------------------------------

#[test]
fn pivot_is_reported_and_semantically_inert() {
    let mut a = Accessor::from_buffer_with_pivot(hex!("08011001C00101").to_vec(), 1);
    let mut b = Accessor::from_buffer_with_pivot(hex!("08011001C00101").to_vec(), 64);
    assert_eq!(a.pivot(), 1);
    assert_eq!(b.pivot(), 64);
    assert_eq!(a.get_bool(1).unwrap(), b.get_bool(1).unwrap());
    assert_eq!(a.field_numbers().unwrap(), b.field_numbers().unwrap());
    a.set_bool(2, false).unwrap();
    b.set_bool(2, false).unwrap();
    assert_eq!(a.serialize().unwrap(), b.serialize().unwrap());
    assert_eq!(Accessor::new().pivot(), lazybuf_core::DEFAULT_PIVOT);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn field_number_bounds_are_enforced() {
    let mut acc = Accessor::new();
    assert!(matches!(
        acc.get_bool(0),
        Err(AccessorError::OutOfRange(0))
    ));
    assert!(matches!(
        acc.set_bool(0, true),
        Err(AccessorError::OutOfRange(0))
    ));
    let over = lazybuf_core::MAX_FIELD_NUMBER + 1;
    assert!(matches!(
        acc.get_bool(over),
        Err(AccessorError::OutOfRange(_))
    ));
    assert!(matches!(
        acc.has_field_number(over),
        Err(AccessorError::OutOfRange(_))
    ));
    assert!(matches!(
        acc.clear_field(over),
        Err(AccessorError::OutOfRange(_))
    ));
    assert!(acc.get_bool(lazybuf_core::MAX_FIELD_NUMBER).is_ok());
}

#[test]
fn wire_type_mismatch_reports_expected_and_found() {
    let mut acc = Accessor::from_buffer(hex!("0801").to_vec());
    let err = acc.get_string(1).unwrap_err();
    assert_eq!(err.to_string(), "Expected wire type: 2 but found: 0");
    let mut acc = Accessor::from_buffer(hex!("0A0161").to_vec());
    let err = acc.get_fixed32(1).unwrap_err();
    assert_eq!(err.to_string(), "Expected wire type: 5 but found: 2");
}

#[test]
fn malformed_buffers_fail_to_index() {
    // Truncated varint payload.
    let mut acc = Accessor::from_buffer(hex!("08").to_vec());
    assert!(matches!(acc.get_bool(1), Err(AccessorError::Parse(_))));
    // Group tags are rejected.
    let mut acc = Accessor::from_buffer(hex!("0B").to_vec());
    assert!(matches!(
        acc.has_field_number(1),
        Err(AccessorError::Parse(_))
    ));
    // Field number zero.
    let mut acc = Accessor::from_buffer(hex!("0001").to_vec());
    assert!(matches!(
        acc.has_field_number(1),
        Err(AccessorError::Parse(_))
    ));
    // Truncated length-delimited payload.
    let mut acc = Accessor::from_buffer(hex!("0A05616263").to_vec());
    assert!(matches!(acc.get_string(1), Err(AccessorError::Parse(_))));
}

#[test]
fn invalid_utf8_is_a_parse_error() {
    let mut acc = Accessor::from_buffer(hex!("0A01FF").to_vec());
    assert!(matches!(acc.get_string(1), Err(AccessorError::Parse(_))));
}

#[test]
fn failed_reads_do_not_corrupt_state() {
    let mut acc = Accessor::from_buffer(hex!("0801").to_vec());
    assert!(acc.get_string(1).is_err());
    // The raw entry is still intact for a correctly typed read.
    assert!(acc.get_bool(1).unwrap());
    assert_eq!(acc.serialize().unwrap().as_ref(), hex!("0801"));
}

#[test]
fn varint_reads_reinterpret_across_kinds() {
    // uint32 max on the wire, read back as int32: same bits.
    let mut acc = Accessor::new();
    acc.set_uint32(1, u32::MAX).unwrap();
    assert_eq!(acc.get_int32(1).unwrap(), -1);
    // sint32 1 encodes as varint 2; an int32 read sees 2.
    let mut acc = Accessor::new();
    acc.set_sint32(1, 1).unwrap();
    assert_eq!(acc.get_int32(1).unwrap(), 2);
}
