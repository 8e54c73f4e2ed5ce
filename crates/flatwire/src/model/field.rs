// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field descriptors and value accessors.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::type_model::TypeModel;
use super::value::{OwnedValue, Scalar, Value};
use crate::de::DecodeError;

/// Reads and writes one field of a container instance.
pub trait ValueAccessor: Send + Sync {
    /// Borrow the field from `container`. `None` if the container has the
    /// wrong concrete type.
    fn get<'a>(&self, container: &'a dyn Any) -> Option<Value<'a>>;

    /// Store a decoded value into the field.
    fn set(&self, container: &mut dyn Any, value: OwnedValue) -> Result<(), DecodeError>;
}

pub type GetFn = for<'a> fn(&'a dyn Any) -> Option<Value<'a>>;
pub type SetFn = fn(&mut dyn Any, OwnedValue) -> Result<(), DecodeError>;

/// Accessor backed by a pair of plain functions, as generated by
/// `#[derive(Flat)]`.
#[derive(Clone, Copy)]
pub struct FieldAccessor {
    get: GetFn,
    set: SetFn,
}

impl FieldAccessor {
    pub fn new(get: GetFn, set: SetFn) -> Self {
        Self { get, set }
    }
}

impl ValueAccessor for FieldAccessor {
    fn get<'a>(&self, container: &'a dyn Any) -> Option<Value<'a>> {
        (self.get)(container)
    }

    fn set(&self, container: &mut dyn Any, value: OwnedValue) -> Result<(), DecodeError> {
        (self.set)(container, value)
    }
}

/// Value a field takes when it is absent from a table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    /// Reference and nullable fields: only null is elided.
    Null,
    Scalar(Scalar),
}

impl FieldDefault {
    /// Whether `value` may be omitted from the table.
    pub fn is_default(&self, value: &Value<'_>) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (Self::Scalar(d), Value::Scalar(v)) => d.same_bits(v),
            _ => false,
        }
    }

    pub fn scalar(&self) -> Option<Scalar> {
        match self {
            Self::Scalar(s) => Some(*s),
            Self::Null => None,
        }
    }

    /// Value the reader reports for an absent field.
    pub fn to_owned_value(&self) -> OwnedValue {
        match self {
            Self::Scalar(s) => OwnedValue::Scalar(*s),
            Self::Null => OwnedValue::Null,
        }
    }
}

/// One serializable field of a table or fixed struct.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub(crate) name: String,
    pub(crate) type_model: Arc<TypeModel>,
    pub(crate) index: usize,
    pub(crate) offset: usize,
    pub(crate) padding: usize,
    pub(crate) nullable: bool,
    pub(crate) default: FieldDefault,
    pub(crate) accessor: Arc<dyn ValueAccessor>,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Model of the field's type, with forward references to
    /// self-referential tables resolved.
    pub fn type_model(&self) -> Arc<TypeModel> {
        TypeModel::resolve(&self.type_model)
    }

    /// Vtable slot for table fields; declaration position for struct fields.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Byte offset inside a fixed struct. Always zero for table fields.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Zero bytes that follow this field inside a fixed struct.
    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default_value(&self) -> FieldDefault {
        self.default
    }

    pub fn accessor(&self) -> &dyn ValueAccessor {
        self.accessor.as_ref()
    }

    /// Read this field from `container`.
    pub fn value<'a>(&self, container: &'a dyn Any) -> Option<Value<'a>> {
        self.accessor.get(container)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("type", &self.type_model.name())
            .field("index", &self.index)
            .field("offset", &self.offset)
            .field("padding", &self.padding)
            .field("nullable", &self.nullable)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_always_default() {
        assert!(FieldDefault::Null.is_default(&Value::Null));
        assert!(FieldDefault::Scalar(Scalar::Int(3)).is_default(&Value::Null));
        assert!(!FieldDefault::Null.is_default(&Value::String("")));
    }

    #[test]
    fn scalar_default_compares_bits() {
        let d = FieldDefault::Scalar(Scalar::Float(0.0));
        assert!(d.is_default(&Value::Scalar(Scalar::Float(0.0))));
        assert!(!d.is_default(&Value::Scalar(Scalar::Float(-0.0))));
        assert_eq!(d.to_owned_value(), OwnedValue::Scalar(Scalar::Float(0.0)));
    }
}
