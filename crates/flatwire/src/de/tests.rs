// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::unwrap_used)]

use super::*;
use crate::config::ReaderOptions;
use crate::model::{BaseType, Scalar, TypeModelRegistry};
use crate::{Flat, FlatBufferSerializer};

/// `{int_prop: 10, byte_prop: 1, short_prop: 100}` as written by the builder.
const THREE_FIELDS: [u8; 28] = [
    16, 0, 0, 0, 0, 0, 10, 0, 12, 0, 8, 0, 5, 0, 6, 0, 10, 0, 0, 0, 0, 1, 100, 0, 10, 0, 0, 0,
];

#[derive(Debug, Default, PartialEq, Flat)]
struct Three {
    int_prop: i32,
    byte_prop: u8,
    short_prop: i16,
}

#[derive(Debug, Default, PartialEq, Flat)]
struct WithDefaults {
    #[flat(default = 42)]
    answer: i32,
    name: Option<String>,
    tags: Vec<u16>,
}

#[derive(Debug, Default, PartialEq, Flat)]
struct Level2 {
    value: i32,
}

#[derive(Debug, Default, PartialEq, Flat)]
struct Level1 {
    inner: Option<Level2>,
}

#[derive(Debug, Default, PartialEq, Flat)]
struct Level0 {
    inner: Option<Level1>,
}

fn decode<T: Flat>(buf: &[u8], options: &ReaderOptions) -> Result<OwnedValue, DecodeError> {
    let registry = TypeModelRegistry::new();
    let model = registry.get_type_model::<T>().unwrap();
    decode_value(buf, &model, options)
}

#[test]
fn table_view_reads_golden_buffer() {
    let table = Table::root(&THREE_FIELDS).unwrap();
    assert_eq!(table.position(), 16);
    assert_eq!(table.vtable_position(), 6);
    assert_eq!(table.slot_count(), 3);
    assert_eq!(table.get_scalar(0, BaseType::Int).unwrap(), Some(Scalar::Int(10)));
    assert_eq!(table.get_scalar(1, BaseType::UChar).unwrap(), Some(Scalar::UChar(1)));
    assert_eq!(table.get_scalar(2, BaseType::Short).unwrap(), Some(Scalar::Short(100)));
    assert_eq!(table.get_scalar(3, BaseType::Short).unwrap(), None);
}

#[test]
fn decode_value_follows_the_model() {
    let value = decode::<Three>(&THREE_FIELDS, &ReaderOptions::default()).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.field("int_prop"), Some(&OwnedValue::Scalar(Scalar::Int(10))));
    assert_eq!(object.field("byte_prop"), Some(&OwnedValue::Scalar(Scalar::UChar(1))));
    assert_eq!(object.field("short_prop"), Some(&OwnedValue::Scalar(Scalar::Short(100))));

    let typed = Three::from_value(value).unwrap();
    assert_eq!(
        typed,
        Three {
            int_prop: 10,
            byte_prop: 1,
            short_prop: 100
        }
    );
}

#[test]
fn every_truncation_is_an_error() {
    for len in 0..THREE_FIELDS.len() {
        let result = decode::<Three>(&THREE_FIELDS[..len], &ReaderOptions::default());
        assert!(
            matches!(result, Err(DecodeError::Read(_))),
            "prefix of {} bytes decoded",
            len
        );
    }
}

#[test]
fn absent_fields_take_declared_defaults() {
    let serializer = FlatBufferSerializer::new();
    let bytes = serializer.serialize(&WithDefaults::default()).unwrap();
    // answer = 0 differs from its default of 42, so it is present
    let value = serializer.decode_dynamic::<WithDefaults>(&bytes).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.field("answer"), Some(&OwnedValue::Scalar(Scalar::Int(0))));
    assert_eq!(object.field("name"), Some(&OwnedValue::Null));
    assert_eq!(object.field("tags"), Some(&OwnedValue::Vector(Vec::new())));

    let bytes = serializer
        .serialize(&WithDefaults {
            answer: 42,
            name: None,
            tags: vec![3],
        })
        .unwrap();
    let value = serializer.decode_dynamic::<WithDefaults>(&bytes).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.field("answer"), Some(&OwnedValue::Scalar(Scalar::Int(42))));
}

#[test]
fn depth_limit_stops_descent() {
    let serializer = FlatBufferSerializer::new();
    let nested = Level0 {
        inner: Some(Level1 {
            inner: Some(Level2 { value: 9 }),
        }),
    };
    let bytes = serializer.serialize(&nested).unwrap();

    let options = ReaderOptions {
        max_depth: 2,
        ..ReaderOptions::default()
    };
    let err = decode::<Level0>(&bytes, &options).unwrap_err();
    assert_eq!(
        err.root_cause(),
        &DecodeError::Read(ReadError::DepthExceeded { max_depth: 2 })
    );
    assert!(decode::<Level0>(&bytes, &ReaderOptions::default()).is_ok());
}

#[test]
fn string_must_be_nul_terminated_utf8() {
    let good = [3, 0, 0, 0, b'a', b'b', b'c', 0];
    assert_eq!(read_string(&good, 0).unwrap(), "abc");

    let no_nul = [3, 0, 0, 0, b'a', b'b', b'c', b'd'];
    assert_eq!(read_string(&no_nul, 0), Err(ReadError::MissingNul { offset: 0 }));

    let bad_utf8 = [2, 0, 0, 0, 0xC3, 0x28, 0];
    assert_eq!(read_string(&bad_utf8, 0), Err(ReadError::InvalidUtf8 { offset: 0 }));

    let too_long = [9, 0, 0, 0, b'a', 0];
    assert!(matches!(
        read_string(&too_long, 0),
        Err(ReadError::OutOfBounds { .. })
    ));
}

#[test]
fn vtable_is_validated() {
    // vtable claims a field beyond the 4-byte table
    let buf = [
        12, 0, 0, 0, // root offset
        6, 0, 4, 0, 8, 0, // vtable: len 6, table 4, slot 0 at +8
        0, 0, // padding
        8, 0, 0, 0, // table: soffset back to the vtable
    ];
    let table = Table::root(&buf).unwrap();
    assert!(matches!(
        table.field_position(0),
        Err(ReadError::BadVtable { .. })
    ));

    // soffset pointing before the buffer start
    let buf = [4, 0, 0, 0, 100, 0, 0, 0];
    assert!(matches!(Table::root(&buf), Err(ReadError::BadVtable { .. })));

    // root offset past the end
    let buf = [200, 0, 0, 0];
    assert!(matches!(Table::root(&buf), Err(ReadError::OutOfBounds { .. })));
}

#[test]
fn vector_length_is_checked_before_reading() {
    let buf = [0xFF, 0xFF, 0xFF, 0x7F, 1, 2];
    let vector = VectorRef::new(&buf, 0).unwrap();
    assert!(vector.bytes(8).is_err());
    assert!(vector.get_scalar(0, BaseType::UChar).is_ok());
    assert!(vector.get_scalar(2, BaseType::UChar).is_err());
    assert!(matches!(
        vector.get_scalar(0, BaseType::String),
        Err(ReadError::NotScalar { .. })
    ));
}

#[test]
fn identifier_is_checked_when_requested() {
    let serializer = FlatBufferSerializer::with_config(
        crate::SerializerConfig::new().file_identifier(*b"THRE"),
    );
    let bytes = serializer
        .serialize(&Three {
            int_prop: 1,
            byte_prop: 2,
            short_prop: 3,
        })
        .unwrap();
    assert!(buffer_has_identifier(&bytes, b"THRE", false));
    assert!(!buffer_has_identifier(&bytes, b"THRE", true));

    let options = ReaderOptions {
        file_identifier: Some(*b"XXXX"),
        ..ReaderOptions::default()
    };
    assert_eq!(
        decode::<Three>(&bytes, &options).unwrap_err(),
        DecodeError::Read(ReadError::IdentifierMismatch { expected: *b"XXXX" })
    );
}

#[test]
fn scalars_are_little_endian() {
    let buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
    assert_eq!(read_u16(&buf, 0).unwrap(), 0x0201);
    assert_eq!(read_i32(&buf, 4).unwrap(), 0x0807_0605);
    assert_eq!(read_u64(&buf, 0).unwrap(), 0x0807_0605_0403_0201);
    assert!(read_u64(&buf, 1).is_err());
    assert!(matches!(
        read_scalar(&buf, 0, BaseType::Vector),
        Err(ReadError::NotScalar { .. })
    ));
}
