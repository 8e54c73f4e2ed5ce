// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Golden byte layouts: exact buffers the serializer must produce for small
// representative values.

#![allow(clippy::unwrap_used)]

mod common;

use common::*;
use flatwire::{FlatBufferSerializer, SerializerConfig};

fn serialize<T: flatwire::Flat>(value: &T) -> Vec<u8> {
    FlatBufferSerializer::new().serialize(value).unwrap()
}

#[test]
fn struct_root_has_no_header() {
    let bytes = serialize(&TestStruct1 {
        int_prop: 1,
        byte_prop: 2,
        short_prop: 3,
    });
    // int, byte, one pad byte, short
    assert_eq!(bytes, [1, 0, 0, 0, 2, 0, 3, 0]);
}

#[test]
fn nested_struct_is_inline() {
    let bytes = serialize(&TestStruct2 {
        int_prop: 5,
        struct_prop: TestStruct1 {
            int_prop: 1,
            byte_prop: 2,
            short_prop: 3,
        },
    });
    assert_eq!(bytes, [5, 0, 0, 0, 1, 0, 0, 0, 2, 0, 3, 0]);
}

#[test]
fn three_field_table() {
    let bytes = serialize(&TestTable1 {
        int_prop: 10,
        byte_prop: 1,
        short_prop: 100,
    });
    #[rustfmt::skip]
    let expected = [
        16, 0, 0, 0,                    // root offset
        0, 0,                           // padding
        10, 0, 12, 0, 8, 0, 5, 0, 6, 0, // vtable
        10, 0, 0, 0,                    // soffset to vtable
        0, 1, 100, 0, 10, 0, 0, 0,      // pad, byte, short, int
    ];
    assert_eq!(bytes, expected);
}

#[test]
fn all_default_table_is_empty() {
    let bytes = serialize(&TestTableWithDefaults::default());
    assert_eq!(bytes, [8, 0, 0, 0, 4, 0, 4, 0, 4, 0, 0, 0]);
}

#[test]
fn string_field() {
    let bytes = serialize(&TestTable2 {
        string_prop: Some("hi".to_string()),
    });
    #[rustfmt::skip]
    let expected = [
        12, 0, 0, 0,        // root offset
        0, 0,               // padding
        6, 0, 8, 0, 4, 0,   // vtable
        6, 0, 0, 0,         // soffset to vtable
        4, 0, 0, 0,         // offset to string
        2, 0, 0, 0, b'h', b'i', 0, 0,
    ];
    assert_eq!(bytes, expected);
}

#[test]
fn null_string_leaves_slot_empty() {
    let bytes = serialize(&TestTable2 { string_prop: None });
    assert_eq!(bytes, [8, 0, 0, 0, 4, 0, 4, 0, 4, 0, 0, 0]);
}

#[test]
fn user_ordering_changes_slots_not_field_placement() {
    let original = serialize(&TestTableWithOriginalOrdering {
        int_prop: 10,
        byte_prop: 1,
        short_prop: 100,
    });
    let user = serialize(&TestTableWithUserOrdering {
        int_prop: 10,
        byte_prop: 1,
        short_prop: 100,
    });
    assert_eq!(original.len(), user.len());
    // vtable entries: byte, short, int
    assert_eq!(&user[10..16], [5, 0, 6, 0, 8, 0]);
    // table body is identical
    assert_eq!(&user[16..], &original[16..]);
}

#[test]
fn identifier_and_size_prefix() {
    let config = SerializerConfig::new()
        .file_identifier(*b"TST1")
        .size_prefixed(true);
    let bytes = FlatBufferSerializer::with_config(config)
        .serialize(&TestTableWithDefaults::default())
        .unwrap();
    assert_eq!(
        bytes,
        [16, 0, 0, 0, 12, 0, 0, 0, b'T', b'S', b'T', b'1', 4, 0, 4, 0, 4, 0, 0, 0]
    );
}
