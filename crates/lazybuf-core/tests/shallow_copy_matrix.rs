//! Shallow copy matrix: independent field maps over shared payloads and
//! shared child accessors.

use std::rc::Rc;

use hex_literal::hex;
use lazybuf_core::{Accessor, DynamicMessage, Message};

#[test]
fn clear_on_the_copy_leaves_the_original() {
    let mut acc = Accessor::new();
    acc.set_bool(1, true).unwrap();
    let mut copy = acc.shallow_copy();
    copy.clear_field(1).unwrap();
    assert!(acc.has_field_number(1).unwrap());
    assert!(!copy.has_field_number(1).unwrap());
}

#[test]
fn set_on_either_side_stays_on_that_side() {
    let mut acc = Accessor::from_buffer(hex!("0801").to_vec());
    let mut copy = acc.shallow_copy();
    copy.set_int32(2, 5).unwrap();
    acc.set_int32(3, 7).unwrap();
    assert!(!acc.has_field_number(2).unwrap());
    assert!(!copy.has_field_number(3).unwrap());
    // Both still see the shared source bytes.
    assert!(acc.get_bool(1).unwrap());
    assert!(copy.get_bool(1).unwrap());
}

#[test]
fn repeated_lists_do_not_leak_between_copies() {
    let mut acc = Accessor::new();
    acc.add_unpacked_int32(1, 1).unwrap();
    let mut copy = acc.shallow_copy();
    copy.add_unpacked_int32(1, 2).unwrap();
    acc.add_unpacked_int32(1, 3).unwrap();
    assert_eq!(acc.get_repeated_int32(1).unwrap(), [1, 3]);
    assert_eq!(copy.get_repeated_int32(1).unwrap(), [1, 2]);
}

#[test]
fn child_accessors_are_shared_by_reference() {
    let mut acc = Accessor::from_buffer(hex!("0A020801").to_vec());
    let child: DynamicMessage = acc.get_message_or_null(1).unwrap().unwrap();
    let mut copy = acc.shallow_copy();
    let copy_child: DynamicMessage = copy.get_message_or_null(1).unwrap().unwrap();
    assert!(Rc::ptr_eq(child.accessor(), copy_child.accessor()));
    // Mutating the shared child is visible from both sides.
    child.accessor().borrow_mut().set_bool(2, true).unwrap();
    assert_eq!(acc.serialize().unwrap(), copy.serialize().unwrap());
    assert_eq!(acc.serialize().unwrap().as_ref(), hex!("0A0408011001"));
}

#[test]
fn copy_of_unread_accessor_roundtrips_verbatim() {
    let input = hex!("10010801").to_vec();
    let acc = Accessor::from_buffer(input.clone());
    let copy = acc.shallow_copy();
    assert_eq!(copy.serialize().unwrap(), input);
}
