// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::unwrap_used)]

use std::any::Any;
use std::rc::Rc;
use std::sync::Arc;

use super::*;
use crate::buffer::FlatBufferBuilder;
use crate::de::Table;
use crate::model::{
    FieldAccessor, FieldSpec, OwnedValue, StructDefBuilder, TypeModel, TypeModelRegistry, Value,
};
use crate::{DecodeError, Flat};

#[derive(Debug, Default, PartialEq, Flat)]
#[flat(fixed)]
struct Pair {
    a: i32,
    b: i16,
    c: i16,
}

#[derive(Debug, Default, Flat)]
struct Labels {
    first: Rc<str>,
    second: Rc<str>,
}

#[derive(Debug, Default, PartialEq, Flat)]
struct Leaf {
    value: i32,
    tag: String,
}

#[derive(Debug, Default, Flat)]
struct Branches {
    left: Option<Rc<Leaf>>,
    right: Option<Rc<Leaf>>,
}

#[derive(Debug, Default, Flat)]
struct Sparse {
    #[flat(default = 7)]
    level: i32,
    name: Option<String>,
    flag: bool,
}

fn encode<T: Flat>(value: &T, force_defaults: bool) -> Result<Vec<u8>, SerializeError> {
    let registry = TypeModelRegistry::new();
    let model = registry.get_type_model::<T>()?;
    let mut builder = FlatBufferBuilder::with_capacity(16);
    builder.set_force_defaults(force_defaults);
    let root = value.as_value().as_object().unwrap();
    let builder = SerializationContext::new(root, model, builder).serialize()?;
    Ok(builder.finished_data().to_vec())
}

fn occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

#[test]
fn struct_root_is_raw_bytes() {
    let bytes = encode(&Pair { a: 1, b: 2, c: 3 }, false).unwrap();
    assert_eq!(bytes, [1, 0, 0, 0, 2, 0, 3, 0]);
}

#[test]
fn shared_string_is_written_once() {
    let text: Rc<str> = Rc::from("shared-label");
    let shared = Labels {
        first: Rc::clone(&text),
        second: text,
    };
    let bytes = encode(&shared, false).unwrap();
    assert_eq!(occurrences(&bytes, b"shared-label"), 1);

    let table = Table::root(&bytes).unwrap();
    let first = table.field_position(0).unwrap().unwrap();
    let second = table.field_position(1).unwrap().unwrap();
    let target = |pos: usize| {
        pos + u32::from_le_bytes(bytes[pos..pos + 4].try_into().unwrap()) as usize
    };
    assert_eq!(target(first), target(second));
}

#[test]
fn equal_but_distinct_strings_are_written_twice() {
    let distinct = Labels {
        first: Rc::from("same-text"),
        second: Rc::from("same-text"),
    };
    let bytes = encode(&distinct, false).unwrap();
    assert_eq!(occurrences(&bytes, b"same-text"), 2);
}

#[test]
fn shared_table_is_written_once() {
    let leaf = Rc::new(Leaf {
        value: 42,
        tag: "leaf-tag".to_string(),
    });
    let tree = Branches {
        left: Some(Rc::clone(&leaf)),
        right: Some(leaf),
    };
    let bytes = encode(&tree, false).unwrap();
    assert_eq!(occurrences(&bytes, b"leaf-tag"), 1);

    let root = Table::root(&bytes).unwrap();
    let left = root.get_table(0).unwrap().unwrap();
    let right = root.get_table(1).unwrap().unwrap();
    assert_eq!(left.position(), right.position());
    assert_eq!(left.get_string(1).unwrap(), Some("leaf-tag"));
}

#[test]
fn defaults_and_nulls_are_elided() {
    let bytes = encode(&Sparse { level: 7, name: None, flag: false }, false).unwrap();
    let table = Table::root(&bytes).unwrap();
    // trailing absent slots are trimmed from the vtable
    assert_eq!(table.slot_count(), 0);
    for slot in 0..3 {
        assert_eq!(table.field_position(slot).unwrap(), None);
    }
}

#[test]
fn force_defaults_writes_scalars_but_not_nulls() {
    let bytes = encode(&Sparse { level: 7, name: None, flag: false }, true).unwrap();
    let table = Table::root(&bytes).unwrap();
    assert_eq!(
        table.get_scalar(0, BaseType::Int).unwrap(),
        Some(crate::model::Scalar::Int(7))
    );
    assert_eq!(table.field_position(1).unwrap(), None);
    assert!(table.field_position(2).unwrap().is_some());
}

#[test]
fn present_empty_string_is_not_null() {
    let bytes = encode(
        &Sparse {
            level: 1,
            name: Some(String::new()),
            flag: true,
        },
        false,
    )
    .unwrap();
    let table = Table::root(&bytes).unwrap();
    assert_eq!(table.get_string(1).unwrap(), Some(""));
}

struct Holder;

fn union_get(container: &dyn Any) -> Option<Value<'_>> {
    Some(Value::Object(container))
}

fn union_set(_container: &mut dyn Any, _value: OwnedValue) -> Result<(), DecodeError> {
    Err(DecodeError::UnionNotImplemented)
}

#[test]
fn union_fields_are_rejected() {
    let model = StructDefBuilder::table("Holder")
        .field(FieldSpec::new(
            "payload",
            Arc::new(TypeModel::union("Payload")),
            FieldAccessor::new(union_get, union_set),
        ))
        .build()
        .unwrap();
    let err = SerializationContext::new(&Holder, Arc::new(model), FlatBufferBuilder::new())
        .serialize()
        .unwrap_err();
    assert_eq!(
        err,
        SerializeError::UnionNotImplemented {
            field: "payload".to_string()
        }
    );
}

#[test]
fn wrong_container_is_reported() {
    let registry = TypeModelRegistry::new();
    let model = registry.get_type_model::<Leaf>().unwrap();
    let err = SerializationContext::new(&Pair::default(), model, FlatBufferBuilder::new())
        .serialize()
        .unwrap_err();
    assert!(matches!(err, SerializeError::ContainerMismatch { .. }));
}

#[test]
fn scalar_root_is_unsupported() {
    let registry = TypeModelRegistry::new();
    let model = registry.get_type_model::<i32>().unwrap();
    let err = SerializationContext::new(&5i32, model, FlatBufferBuilder::new())
        .serialize()
        .unwrap_err();
    assert!(matches!(err, SerializeError::UnsupportedRoot { .. }));
}

#[test]
fn identifier_follows_root_offset() {
    let registry = TypeModelRegistry::new();
    let model = registry.get_type_model::<Leaf>().unwrap();
    let leaf = Leaf {
        value: 1,
        tag: String::new(),
    };
    let builder = SerializationContext::new(&leaf, model, FlatBufferBuilder::new())
        .with_file_identifier(Some(*b"LEAF"))
        .serialize()
        .unwrap();
    assert!(builder.is_finished());
    assert_eq!(&builder.finished_data()[4..8], b"LEAF");
}
