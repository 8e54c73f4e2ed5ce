// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Borrowed and owned value views used by the serializer and the reader.

use std::any::{Any, TypeId};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use super::base_type::BaseType;
use super::type_model::TypeModel;
use super::Flat;

/// A single fixed-width scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Char(i8),
    UChar(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
}

impl Scalar {
    pub fn base_type(&self) -> BaseType {
        match self {
            Self::Bool(_) => BaseType::Bool,
            Self::Char(_) => BaseType::Char,
            Self::UChar(_) => BaseType::UChar,
            Self::Short(_) => BaseType::Short,
            Self::UShort(_) => BaseType::UShort,
            Self::Int(_) => BaseType::Int,
            Self::UInt(_) => BaseType::UInt,
            Self::Long(_) => BaseType::Long,
            Self::ULong(_) => BaseType::ULong,
            Self::Float(_) => BaseType::Float,
            Self::Double(_) => BaseType::Double,
        }
    }

    /// Zero value for a scalar base type.
    pub fn zero(base: BaseType) -> Option<Self> {
        Some(match base {
            BaseType::Bool => Self::Bool(false),
            BaseType::Char => Self::Char(0),
            BaseType::UChar => Self::UChar(0),
            BaseType::Short => Self::Short(0),
            BaseType::UShort => Self::UShort(0),
            BaseType::Int => Self::Int(0),
            BaseType::UInt => Self::UInt(0),
            BaseType::Long => Self::Long(0),
            BaseType::ULong => Self::ULong(0),
            BaseType::Float => Self::Float(0.0),
            BaseType::Double => Self::Double(0.0),
            BaseType::String | BaseType::Vector | BaseType::Struct | BaseType::Union => {
                return None
            }
        })
    }

    /// Bit-exact comparison. Floats compare by representation, so `-0.0`
    /// differs from `0.0` and a NaN equals the identical NaN.
    pub fn same_bits(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Widen any integral scalar to `i64`. `ULong` values above `i64::MAX`
    /// and floats return `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Bool(v) => Some(i64::from(v)),
            Self::Char(v) => Some(i64::from(v)),
            Self::UChar(v) => Some(i64::from(v)),
            Self::Short(v) => Some(i64::from(v)),
            Self::UShort(v) => Some(i64::from(v)),
            Self::Int(v) => Some(i64::from(v)),
            Self::UInt(v) => Some(i64::from(v)),
            Self::Long(v) => Some(v),
            Self::ULong(v) => i64::try_from(v).ok(),
            Self::Float(_) | Self::Double(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(f64::from(v)),
            Self::Double(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Char(v) => write!(f, "{}", v),
            Self::UChar(v) => write!(f, "{}", v),
            Self::Short(v) => write!(f, "{}", v),
            Self::UShort(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{}", v),
            Self::Long(v) => write!(f, "{}", v),
            Self::ULong(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
        }
    }
}

/// Reference identity of a value in the object graph.
///
/// Built from the address of the value's data, its length and its concrete
/// type, so two `Rc` clones share a key while two equal strings living in
/// separate allocations do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    addr: usize,
    len: usize,
    type_id: TypeId,
}

impl ObjectKey {
    pub fn new(addr: usize, len: usize, type_id: TypeId) -> Self {
        Self { addr, len, type_id }
    }

    pub fn of_str(s: &str) -> Self {
        Self::new(s.as_ptr() as usize, s.len(), TypeId::of::<str>())
    }

    pub fn of_object(obj: &dyn Any) -> Self {
        let addr = obj as *const dyn Any as *const () as usize;
        Self::new(addr, 0, (*obj).type_id())
    }
}

/// Indexed read access to a collection of serializable elements.
pub trait VectorView {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrowed view of the element at `index`.
    fn element(&self, index: usize) -> Option<Value<'_>>;

    /// Identity of the collection's storage.
    fn identity(&self) -> ObjectKey;
}

fn slice_identity<T: 'static, C: 'static>(items: &[T]) -> ObjectKey {
    ObjectKey::new(items.as_ptr() as usize, items.len(), TypeId::of::<C>())
}

impl<T: Flat> VectorView for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn element(&self, index: usize) -> Option<Value<'_>> {
        self.get(index).map(Flat::as_value)
    }

    fn identity(&self) -> ObjectKey {
        slice_identity::<T, Self>(self)
    }
}

impl<T: Flat> VectorView for Box<[T]> {
    fn len(&self) -> usize {
        self.as_ref().len()
    }

    fn element(&self, index: usize) -> Option<Value<'_>> {
        self.get(index).map(Flat::as_value)
    }

    fn identity(&self) -> ObjectKey {
        slice_identity::<T, Self>(self)
    }
}

impl<T: Flat, const N: usize> VectorView for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn element(&self, index: usize) -> Option<Value<'_>> {
        self.get(index).map(Flat::as_value)
    }

    fn identity(&self) -> ObjectKey {
        slice_identity::<T, Self>(self)
    }
}

impl<T: Flat> VectorView for VecDeque<T> {
    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn element(&self, index: usize) -> Option<Value<'_>> {
        self.get(index).map(Flat::as_value)
    }

    fn identity(&self) -> ObjectKey {
        let (front, _) = self.as_slices();
        ObjectKey::new(front.as_ptr() as usize, VecDeque::len(self), TypeId::of::<Self>())
    }
}

/// Borrowed view of a field value, produced by a field accessor.
#[derive(Clone, Copy)]
pub enum Value<'a> {
    Scalar(Scalar),
    String(&'a str),
    Vector(&'a dyn VectorView),
    /// A struct or table instance.
    Object(&'a dyn Any),
    Null,
}

impl<'a> Value<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Self::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&'a dyn VectorView> {
        match self {
            Self::Vector(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&'a dyn Any> {
        match self {
            Self::Object(o) => Some(*o),
            _ => None,
        }
    }

    /// Identity key for reference values; `None` for scalars and null.
    pub fn identity(&self) -> Option<ObjectKey> {
        match self {
            Self::String(s) => Some(ObjectKey::of_str(s)),
            Self::Vector(v) => Some(v.identity()),
            Self::Object(o) => Some(ObjectKey::of_object(*o)),
            Self::Scalar(_) | Self::Null => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::String(_) => "string",
            Self::Vector(_) => "vector",
            Self::Object(_) => "object",
            Self::Null => "null",
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => f.debug_tuple("Scalar").field(s).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Vector(v) => f.debug_struct("Vector").field("len", &v.len()).finish(),
            Self::Object(o) => f
                .debug_tuple("Object")
                .field(&ObjectKey::of_object(*o))
                .finish(),
            Self::Null => f.write_str("Null"),
        }
    }
}

/// Owned value tree produced by the reader and consumed by `Flat::from_value`.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedValue {
    Scalar(Scalar),
    String(String),
    Vector(Vec<OwnedValue>),
    Object(ObjectValue),
    Null,
}

impl OwnedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Self::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[OwnedValue]> {
        match self {
            Self::Vector(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::String(_) => "string",
            Self::Vector(_) => "vector",
            Self::Object(_) => "object",
            Self::Null => "null",
        }
    }
}

/// Decoded struct or table: the model it was read with and one value per
/// field, in declaration order.
#[derive(Debug, Clone)]
pub struct ObjectValue {
    pub model: Arc<TypeModel>,
    pub fields: Vec<OwnedValue>,
}

impl ObjectValue {
    /// Look up a decoded field by name.
    pub fn field(&self, name: &str) -> Option<&OwnedValue> {
        let def = self.model.struct_def()?;
        let index = def.fields().iter().position(|f| f.name() == name)?;
        self.fields.get(index)
    }
}

impl PartialEq for ObjectValue {
    fn eq(&self, other: &Self) -> bool {
        self.model.name() == other.model.name() && self.fields == other.fields
    }
}
