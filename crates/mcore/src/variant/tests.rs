// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tests of the variant value model.

use super::*;

// Round trips ------------------------------------------------------------

#[test]
fn test_scalar_round_trips() {
    assert!(Variant::Bool(true).as_bool());
    assert_eq!(Variant::Byte(200).as_byte().unwrap(), 200);
    assert_eq!(Variant::Char('Q').as_char().unwrap(), 'Q');
    assert_eq!(Variant::UInt(3_000_000_000).as_uint().unwrap(), 3_000_000_000);
    assert_eq!(Variant::Int(-5).as_int().unwrap(), -5);
    assert_eq!(Variant::Double(2.5).as_double().unwrap(), 2.5);
    assert_eq!(Variant::from("abc").as_string().unwrap(), "abc");
    assert_eq!(
        Variant::byte_string([1u8, 2, 3]).as_byte_string().unwrap(),
        [1, 2, 3]
    );
}

#[test]
fn test_kind_order_is_promotion_order() {
    assert!(VariantKind::Bool < VariantKind::Byte);
    assert!(VariantKind::Byte < VariantKind::Char);
    assert!(VariantKind::Char < VariantKind::UInt);
    assert!(VariantKind::UInt < VariantKind::Int);
    assert!(VariantKind::Int < VariantKind::Double);
    assert_eq!(VariantKind::from_tag(13), Some(VariantKind::Map));
    assert_eq!(VariantKind::from_tag(15), None);
}

#[test]
fn test_empty_conversions_fail_with_no_value() {
    let e = Variant::Empty;
    assert_eq!(e.as_int().unwrap_err().code(), crate::error::MErrorCode::NoValue);
    assert_eq!(e.as_string().unwrap_err().code(), crate::error::MErrorCode::NoValue);
    assert!(!e.as_bool()); // by convention Empty is false
}

#[test]
fn test_string_number_parsing() {
    assert_eq!(Variant::from("42").as_int().unwrap(), 42);
    assert_eq!(Variant::from("-7").as_int().unwrap(), -7);
    assert_eq!(Variant::from("0x1F").as_uint().unwrap(), 31);
    assert_eq!(Variant::from("2.5").as_double().unwrap(), 2.5);
    assert!(Variant::from("pig").as_int().is_err());
}

#[test]
fn test_narrowing_checks() {
    assert_eq!(
        Variant::Int(-1).as_uint().unwrap_err().code(),
        crate::error::MErrorCode::BadConversion
    );
    assert_eq!(
        Variant::Int(256).as_byte().unwrap_err().code(),
        crate::error::MErrorCode::NumberOutOfRange
    );
    assert_eq!(Variant::Double(255.4).as_byte().unwrap(), 255);
    assert_eq!(Variant::UInt(u32::MAX).as_int64().unwrap(), 4294967295);
    assert!(Variant::Int(-1).as_uint64().is_err());
}

#[test]
fn test_as_bool_perl_rules() {
    assert!(!Variant::from("").as_bool());
    assert!(!Variant::from("0").as_bool());
    assert!(!Variant::from("FALSE").as_bool());
    assert!(Variant::from("false").as_bool()); // only all-caps FALSE is false
    assert!(Variant::from("anything").as_bool());
    assert!(!Variant::Char('\0').as_bool());
    assert!(!Variant::Char('0').as_bool());
    assert!(Variant::Char('x').as_bool());
}

// Storage ----------------------------------------------------------------

#[test]
fn test_small_buffer_boundary() {
    let seven = Variant::from("1234567");
    let eight = Variant::from("12345678");
    match (&seven, &eight) {
        (Variant::String(a), Variant::String(b)) => {
            assert!(a.is_inline());
            assert!(!b.is_inline());
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_grow_across_boundary_preserves_content() {
    let mut v = Variant::from("1234567");
    v.add_assign(&Variant::Char('8')).unwrap();
    assert_eq!(v.as_string().unwrap(), "12345678");
    match &v {
        Variant::String(b) => assert!(!b.is_inline()),
        _ => unreachable!(),
    }
}

#[test]
fn test_copy_on_write() {
    let a = Variant::from("a shared heap buffer value");
    let mut b = a.clone();
    // Both share one heap buffer until the mutation
    match (&a, &b) {
        (Variant::String(x), Variant::String(y)) => {
            assert!(x.is_shared() && y.is_shared());
        }
        _ => unreachable!(),
    }
    b.set_item_at(0, &Variant::Char('A')).unwrap();
    assert_eq!(a.as_string().unwrap(), "a shared heap buffer value");
    assert_eq!(b.as_string().unwrap(), "A shared heap buffer value");
}

#[test]
fn test_collection_copy_on_write() {
    let a = Variant::from(vec![Variant::Int(1), Variant::Int(2)]);
    let mut b = a.clone();
    b.set_item_at(0, &Variant::Int(9)).unwrap();
    assert_eq!(a.get_item_at(0).unwrap().as_int().unwrap(), 1);
    assert_eq!(b.get_item_at(0).unwrap().as_int().unwrap(), 9);
}

// Arithmetic -------------------------------------------------------------

#[test]
fn test_promotion_arithmetic() {
    // UInt + Int promotes to Int
    let r = Variant::UInt(1).add(&Variant::Int(2)).unwrap();
    assert!(matches!(r, Variant::Int(3)));

    // Byte range exceeded widens
    let r = Variant::Byte(250).add(&Variant::Byte(10)).unwrap();
    assert!(matches!(r, Variant::UInt(260)));

    // Byte stays Byte when in range
    let r = Variant::Byte(5).add(&Variant::Byte(10)).unwrap();
    assert!(matches!(r, Variant::Byte(15)));

    // Double wins
    let r = Variant::Int(1).add(&Variant::Double(0.5)).unwrap();
    assert!(matches!(r, Variant::Double(_)));
    assert_eq!(r.as_double().unwrap(), 1.5);
}

#[test]
fn test_bool_arithmetic_rejected() {
    let err = Variant::Bool(true).add(&Variant::Int(1)).unwrap_err();
    assert_eq!(err.code(), crate::error::MErrorCode::OperationNotSupported);
}

#[test]
fn test_string_concatenation_and_replication() {
    let r = Variant::from("foo").add(&Variant::from("bar")).unwrap();
    assert_eq!(r.as_string().unwrap(), "foobar");
    let r = Variant::from("ab").multiply(&Variant::UInt(3)).unwrap();
    assert_eq!(r.as_string().unwrap(), "ababab");
    let r = Variant::byte_string([1u8]).add(&Variant::byte_string([2u8])).unwrap();
    assert_eq!(r.as_byte_string().unwrap(), [1, 2]);
}

#[test]
fn test_division() {
    let r = Variant::Int(7).divide(&Variant::Int(2)).unwrap();
    assert_eq!(r.as_double().unwrap(), 3.5);
    let err = Variant::Int(7).divide(&Variant::Int(0)).unwrap_err();
    assert_eq!(err.code(), crate::error::MErrorCode::DivisionByZero);
    let err = Variant::Int(7).modulo(&Variant::Int(0)).unwrap_err();
    assert_eq!(err.code(), crate::error::MErrorCode::DivisionByZero);
    assert_eq!(
        Variant::Int(7).modulo(&Variant::Int(4)).unwrap().as_int().unwrap(),
        3
    );
}

#[test]
fn test_increment_overflow() {
    let mut v = Variant::Byte(255);
    assert_eq!(
        v.increment().unwrap_err().code(),
        crate::error::MErrorCode::Overflow
    );
    let mut v = Variant::UInt(0);
    assert_eq!(
        v.decrement().unwrap_err().code(),
        crate::error::MErrorCode::Underflow
    );
    let mut v = Variant::Int(5);
    v.increment().unwrap();
    assert_eq!(v.as_int().unwrap(), 6);
}

#[test]
fn test_bitwise() {
    assert_eq!(
        Variant::UInt(0b1100).bit_and(&Variant::UInt(0b1010)).unwrap().as_uint().unwrap(),
        0b1000
    );
    assert_eq!(
        Variant::UInt(0b1100).bit_or(&Variant::UInt(0b1010)).unwrap().as_uint().unwrap(),
        0b1110
    );
    assert_eq!(
        Variant::UInt(0b1100).bit_xor(&Variant::UInt(0b1010)).unwrap().as_uint().unwrap(),
        0b0110
    );
    // Bool operands turn logical
    assert!(Variant::Bool(true).bit_or(&Variant::Bool(false)).unwrap().as_bool());
    // Byte strings go elementwise
    let r = Variant::byte_string([0xF0u8, 0x0F])
        .bit_and(&Variant::byte_string([0xAAu8, 0xAA]))
        .unwrap();
    assert_eq!(r.as_byte_string().unwrap(), [0xA0, 0x0A]);
    let err = Variant::byte_string([0u8])
        .bit_and(&Variant::byte_string([0u8, 0]))
        .unwrap_err();
    assert_eq!(err.code(), crate::error::MErrorCode::SizesDiffer);
}

#[test]
fn test_shifts_and_not() {
    assert_eq!(
        Variant::UInt(1).shift_left(&Variant::Int(4)).unwrap().as_uint().unwrap(),
        16
    );
    assert_eq!(
        Variant::Int(-8).shift_right(&Variant::Int(1)).unwrap().as_int().unwrap(),
        -4
    );
    assert!(Variant::Empty.not().unwrap().as_bool());
    assert_eq!(Variant::Byte(0x0F).not().unwrap().as_byte().unwrap(), 0xF0);
    assert!(!Variant::Bool(true).not().unwrap().as_bool());
}

#[test]
fn test_negate() {
    assert!(matches!(Variant::Int(5).negate().unwrap(), Variant::Int(-5)));
    assert!(matches!(Variant::UInt(5).negate().unwrap(), Variant::Int(-5)));
    // An unsigned above the signed range widens
    assert!(matches!(
        Variant::UInt(3_000_000_000).negate().unwrap(),
        Variant::Double(_)
    ));
}

// Comparison -------------------------------------------------------------

#[test]
fn test_equality() {
    assert!(Variant::Empty.try_eq(&Variant::Empty).unwrap());
    assert!(Variant::Int(3).try_eq(&Variant::UInt(3)).unwrap());
    assert!(Variant::Int(3).try_eq(&Variant::Double(3.0)).unwrap());
    assert!(Variant::from("abc").try_eq(&Variant::from("abc")).unwrap());
    assert!(!Variant::from("abc").try_eq(&Variant::from("abd")).unwrap());
    // Empty equals the null object
    assert!(Variant::Empty.try_eq(&Variant::NULL).unwrap());
    assert!(Variant::NULL.try_eq(&Variant::Empty).unwrap());
    // Numbers compare with strings through text
    assert!(Variant::Int(42).try_eq(&Variant::from("42")).unwrap());
}

#[test]
fn test_ordering() {
    assert!(Variant::Int(2).try_lt(&Variant::Double(2.5)).unwrap());
    assert!(Variant::from("abc").try_lt(&Variant::from("abd")).unwrap());
    assert!(Variant::Int(3).try_gt(&Variant::Int(2)).unwrap());
    let a = Variant::from(vec![Variant::Int(1), Variant::Int(2)]);
    let b = Variant::from(vec![Variant::Int(1), Variant::Int(3)]);
    assert!(a.try_lt(&b).unwrap());
}

// Indexing ---------------------------------------------------------------

#[test]
fn test_negative_indices() {
    let v = Variant::from("hello");
    assert_eq!(v.get_item_at(0).unwrap().as_char().unwrap(), 'h');
    assert_eq!(v.get_item_at(-1).unwrap().as_char().unwrap(), 'o');
    assert_eq!(v.get_item_at(-5).unwrap().as_char().unwrap(), 'h');
    assert_eq!(
        v.get_item_at(5).unwrap_err().code(),
        crate::error::MErrorCode::IndexOutOfRange
    );
    assert_eq!(
        v.get_item_at(-6).unwrap_err().code(),
        crate::error::MErrorCode::IndexOutOfRange
    );
}

#[test]
fn test_byte_string_indexing() {
    let v = Variant::byte_string([10u8, 20, 30]);
    assert_eq!(v.get_item_at(1).unwrap().as_byte().unwrap(), 20);
    let mut v = v;
    v.set_item_at(1, &Variant::Byte(99)).unwrap();
    assert_eq!(v.as_byte_string().unwrap(), [10, 99, 30]);
}

#[test]
fn test_slices() {
    let v = Variant::from("hello world");
    assert_eq!(v.get_slice(0, 5).unwrap().as_string().unwrap(), "hello");
    assert_eq!(v.get_slice(-5, 11).unwrap().as_string().unwrap(), "world");
    // Reversed slice is empty
    assert_eq!(v.get_slice(5, 2).unwrap().as_string().unwrap(), "");
    // Out-of-range clamps
    assert_eq!(v.get_slice(6, 100).unwrap().as_string().unwrap(), "world");

    let mut v = Variant::from("hello world");
    v.set_slice(0, 5, &Variant::from("bye")).unwrap();
    assert_eq!(v.as_string().unwrap(), "bye world");
    v.set_slice(0, 4, &Variant::Empty).unwrap();
    assert_eq!(v.as_string().unwrap(), "world");
}

#[test]
fn test_collection_slices() {
    let v = Variant::from(vec![
        Variant::Int(1),
        Variant::Int(2),
        Variant::Int(3),
        Variant::Int(4),
    ]);
    let s = v.get_slice(1, 3).unwrap();
    assert_eq!(s.count().unwrap(), 2);
    assert_eq!(s.get_item_at(0).unwrap().as_int().unwrap(), 2);

    let mut v = v;
    v.set_slice(1, 3, &Variant::from(vec![Variant::Int(9)])).unwrap();
    assert_eq!(v.count().unwrap(), 3);
    assert_eq!(v.get_item_at(1).unwrap().as_int().unwrap(), 9);
}

#[test]
fn test_swap_items() {
    let mut v = Variant::from("abc");
    v.swap_items(0, 2).unwrap();
    assert_eq!(v.as_string().unwrap(), "cba");
    let mut v = Variant::from(vec![Variant::Int(1), Variant::Int(2)]);
    v.swap_items(0, 1).unwrap();
    assert_eq!(v.get_item_at(0).unwrap().as_int().unwrap(), 2);
}

#[test]
fn test_find_and_presence() {
    let v = Variant::from("hello world");
    assert_eq!(v.find_index_of(&Variant::from("world"), false).unwrap(), 6);
    assert_eq!(v.find_index_of(&Variant::from("o"), false).unwrap(), 4);
    assert_eq!(v.find_index_of(&Variant::from("o"), true).unwrap(), 7);
    assert_eq!(v.find_index_of(&Variant::from("zap"), false).unwrap(), -1);
    // An empty string is always present
    assert_eq!(v.find_index_of(&Variant::from(""), false).unwrap(), 0);

    let c = Variant::from(vec![Variant::Int(1), Variant::from("two")]);
    assert!(c.is_present(&Variant::Int(1)).unwrap());
    assert!(!c.is_present(&Variant::Int(3)).unwrap());
}

#[test]
fn test_scalars_cannot_be_indexed() {
    let err = Variant::Int(5).get_item_at(0).unwrap_err();
    assert_eq!(err.code(), crate::error::MErrorCode::CannotIndexItem);
    assert!(!Variant::Int(5).is_indexed());
    assert!(Variant::from("x").is_indexed());
}

// Maps -------------------------------------------------------------------

#[test]
fn test_map_key_update_newest_wins() {
    let mut m = Variant::map();
    let k = Variant::from("k");
    m.set_item(&k, &Variant::Int(1)).unwrap();
    m.set_item(&k, &Variant::Int(2)).unwrap();
    assert_eq!(m.count().unwrap(), 1);
    assert_eq!(m.get_item(&k).unwrap().as_int().unwrap(), 2);
}

#[test]
fn test_map_indexing_scenario() {
    let mut m = Variant::map();
    m.set_item(&Variant::Int(1), &Variant::from("a")).unwrap();
    m.set_item(&Variant::from("x"), &Variant::Int(7)).unwrap();
    m.set_item(&Variant::Int(1), &Variant::from("b")).unwrap();

    assert_eq!(m.count().unwrap(), 2);
    assert_eq!(m.get_item(&Variant::Int(1)).unwrap().as_string().unwrap(), "b");
    assert_eq!(m.get_item(&Variant::from("x")).unwrap().as_int().unwrap(), 7);

    let keys = m.get_all_map_keys().unwrap();
    assert_eq!(keys.count().unwrap(), 2);
    assert_eq!(keys.get_item_at(0).unwrap().as_int().unwrap(), 1);
    assert_eq!(keys.get_item_at(1).unwrap().as_string().unwrap(), "x");
}

#[test]
fn test_map_access_creates_missing_entry() {
    let mut m = Variant::map();
    // get_item on a missing key throws
    let err = m.get_item(&Variant::Int(1)).unwrap_err();
    assert_eq!(err.code(), crate::error::MErrorCode::EntryNotFound);
    // access_item_mut creates the pair
    {
        let slot = m.access_item_mut(&Variant::Int(1)).unwrap();
        assert!(slot.is_empty());
        *slot = Variant::from("made");
    }
    assert_eq!(m.count().unwrap(), 1);
    assert_eq!(m.get_item(&Variant::Int(1)).unwrap().as_string().unwrap(), "made");
}

#[test]
fn test_map_merge_and_subtract() {
    let mut a = Variant::map();
    a.set_item(&Variant::Int(1), &Variant::from("a")).unwrap();
    let mut b = Variant::map();
    b.set_item(&Variant::Int(1), &Variant::from("b")).unwrap();
    b.set_item(&Variant::Int(2), &Variant::from("c")).unwrap();

    // Right side wins on merge
    let merged = a.add(&b).unwrap();
    assert_eq!(merged.count().unwrap(), 2);
    assert_eq!(merged.get_item(&Variant::Int(1)).unwrap().as_string().unwrap(), "b");

    // A two-element collection installs one pair
    let mut m = Variant::map();
    m.add_assign(&Variant::from(vec![Variant::Int(5), Variant::from("v")])).unwrap();
    assert_eq!(m.get_item(&Variant::Int(5)).unwrap().as_string().unwrap(), "v");
    let err = m.add_assign(&Variant::Int(5)).unwrap_err();
    assert_eq!(err.code(), crate::error::MErrorCode::CannotIndexItem);

    // Subtraction removes one pair by key
    let mut m = merged;
    m.subtract_assign(&Variant::Int(1)).unwrap();
    assert_eq!(m.count().unwrap(), 1);
}

#[test]
fn test_collection_extend_and_remove() {
    let mut c = Variant::collection();
    c.add_assign(&Variant::Int(1)).unwrap();
    c.add_assign(&Variant::from(vec![Variant::Int(2), Variant::Int(1)])).unwrap();
    assert_eq!(c.count().unwrap(), 3);
    // All matching occurrences go away
    c.subtract_assign(&Variant::Int(1)).unwrap();
    assert_eq!(c.count().unwrap(), 1);
    assert_eq!(c.get_item_at(0).unwrap().as_int().unwrap(), 2);
}

// MDL constants ----------------------------------------------------------

#[test]
fn test_mdl_writer() {
    assert_eq!(to_mdl_constant(&Variant::Bool(true)).unwrap(), "TRUE");
    assert_eq!(to_relaxed_mdl_constant(&Variant::Bool(true)).unwrap(), "1");
    assert_eq!(to_mdl_constant(&Variant::UInt(5)).unwrap(), "5u");
    assert_eq!(to_relaxed_mdl_constant(&Variant::UInt(5)).unwrap(), "5");
    assert_eq!(to_mdl_constant(&Variant::Int(-3)).unwrap(), "-3");
    assert_eq!(to_mdl_constant(&Variant::Double(2.0)).unwrap(), "2.");
    assert_eq!(to_mdl_constant(&Variant::from("a\"b")).unwrap(), "\"a\\\"b\"");
    assert_eq!(
        to_mdl_constant(&Variant::byte_string([1u8, 2, 3])).unwrap(),
        "x\"01 02 03\""
    );
    assert_eq!(to_mdl_constant(&Variant::map()).unwrap(), "{:}");
    assert_eq!(to_mdl_constant(&Variant::collection()).unwrap(), "{}");
    assert!(to_mdl_constant(&Variant::Empty).is_err());
}

#[test]
fn test_mdl_parse_map_scenario() {
    let v = from_mdl_constant("{1:\"a\",2:\"b\"}").unwrap();
    assert_eq!(v.kind(), VariantKind::Map);
    assert_eq!(v.count().unwrap(), 2);
    let keys = v.get_all_map_keys().unwrap();
    assert_eq!(keys.get_item_at(0).unwrap().as_int().unwrap(), 1);
    assert_eq!(keys.get_item_at(1).unwrap().as_int().unwrap(), 2);
}

#[test]
fn test_mdl_parse_byte_literals() {
    let v = from_mdl_constant("x\"01 02 03\"").unwrap();
    assert_eq!(v.kind(), VariantKind::ByteString);
    assert_eq!(v.as_byte_string().unwrap(), [0x01, 0x02, 0x03]);

    let v = from_mdl_constant("b\"AB\"").unwrap();
    assert_eq!(v.as_byte_string().unwrap(), b"AB");

    let v = from_mdl_constant("d\"1.2.255\"").unwrap();
    assert_eq!(v.as_byte_string().unwrap(), [1, 2, 255]);

    // A single-quoted byte literal is a Byte
    let v = from_mdl_constant("x'41'").unwrap();
    assert!(matches!(v, Variant::Byte(0x41)));
}

#[test]
fn test_mdl_parse_scalars() {
    assert!(matches!(from_mdl_constant("TRUE").unwrap(), Variant::Bool(true)));
    assert!(matches!(from_mdl_constant("FALSE").unwrap(), Variant::Bool(false)));
    assert!(matches!(from_mdl_constant("EMPTY").unwrap(), Variant::Empty));
    assert!(matches!(from_mdl_constant("42").unwrap(), Variant::Int(42)));
    assert!(matches!(from_mdl_constant("42u").unwrap(), Variant::UInt(42)));
    assert!(matches!(from_mdl_constant("0x10").unwrap(), Variant::UInt(16)));
    assert!(matches!(from_mdl_constant("-1").unwrap(), Variant::Int(-1)));
    assert!(matches!(from_mdl_constant("1.5").unwrap(), Variant::Double(_)));
    assert!(matches!(from_mdl_constant("1e3").unwrap(), Variant::Double(_)));
    assert!(matches!(from_mdl_constant("'x'").unwrap(), Variant::Char('x')));
    assert_eq!(from_mdl_constant("\"hi\"").unwrap().as_string().unwrap(), "hi");
    assert_eq!(from_mdl_constant("`a\\b`").unwrap().as_string().unwrap(), "a\\b");
}

#[test]
fn test_mdl_parse_collections() {
    let v = from_mdl_constant("{1,2,3}").unwrap();
    assert_eq!(v.kind(), VariantKind::VariantCollection);
    assert_eq!(v.count().unwrap(), 3);

    let v = from_mdl_constant("[\"a\",\"b\"]").unwrap();
    assert_eq!(v.kind(), VariantKind::StringCollection);
    assert_eq!(v.count().unwrap(), 2);

    // String collections hold only strings
    assert!(from_mdl_constant("[1,2]").is_err());

    // Nested structures
    let v = from_mdl_constant("{1,{2:\"x\"},[\"s\"]}").unwrap();
    assert_eq!(v.count().unwrap(), 3);
    assert_eq!(v.get_item_at(1).unwrap().kind(), VariantKind::Map);
}

#[test]
fn test_mdl_syntax_errors() {
    for bad in ["{1:", "1 2", "TRU", "{1,2", "\"unterminated", "x\"0g\"", "'ab'"] {
        let err = from_mdl_constant(bad).unwrap_err();
        assert_eq!(err.code(), crate::error::MErrorCode::SyntaxError, "{}", bad);
    }
}

#[test]
fn test_mdl_round_trip() {
    let values = [
        Variant::Bool(false),
        Variant::Int(-100),
        Variant::UInt(7),
        Variant::Double(1.25),
        Variant::Char('z'),
        Variant::from("text with \\ and \" marks"),
        Variant::byte_string([0u8, 1, 254, 255]),
        from_mdl_constant("{1:\"a\",\"k\":{2,3}}").unwrap(),
        from_mdl_constant("[\"x\",\"y\"]").unwrap(),
    ];
    for v in &values {
        let text = to_mdl_constant(v).unwrap();
        let back = from_mdl_constant(&text).unwrap();
        assert!(v.try_eq(&back).unwrap(), "{} did not round-trip", text);
    }
}

// Objects ----------------------------------------------------------------

#[test]
fn test_null_object() {
    assert!(Variant::NULL.is_empty());
    assert!(Variant::NULL.is_object());
    assert!(Variant::NULL.as_object().unwrap().is_none());
    assert!(Variant::NULL.as_existing_object().is_err());
    // Int zero reads as a null object by convention
    assert!(Variant::Int(0).as_object().unwrap().is_none());
    assert!(Variant::Int(1).as_object().is_err());
}

#[test]
fn test_set_empty_with_object_delete() {
    let mut v = Variant::from(vec![Variant::Int(1), Variant::NULL]);
    v.set_empty_with_object_delete();
    assert!(v.is_empty());
}
