// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `Flat` implementations for std types.

use std::any::type_name;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use super::base_type::BaseType;
use super::error::ModelError;
use super::registry::ModelContext;
use super::type_model::TypeModel;
use super::value::{OwnedValue, Scalar, Value};
use super::Flat;
use crate::de::DecodeError;

macro_rules! impl_flat_scalar {
    ($ty:ty, $variant:ident) => {
        impl Flat for $ty {
            fn type_model(_cx: &mut ModelContext<'_>) -> Result<Arc<TypeModel>, ModelError> {
                Ok(Arc::new(TypeModel::scalar(BaseType::$variant)?))
            }

            fn as_value(&self) -> Value<'_> {
                Value::Scalar(Scalar::$variant(*self))
            }

            fn from_value(value: OwnedValue) -> Result<Self, DecodeError> {
                match value {
                    OwnedValue::Scalar(Scalar::$variant(v)) => Ok(v),
                    other => Err(DecodeError::mismatch(stringify!($ty), &other)),
                }
            }
        }
    };
}

impl_flat_scalar!(bool, Bool);
impl_flat_scalar!(i8, Char);
impl_flat_scalar!(u8, UChar);
impl_flat_scalar!(i16, Short);
impl_flat_scalar!(u16, UShort);
impl_flat_scalar!(i32, Int);
impl_flat_scalar!(u32, UInt);
impl_flat_scalar!(i64, Long);
impl_flat_scalar!(u64, ULong);
impl_flat_scalar!(f32, Float);
impl_flat_scalar!(f64, Double);

fn string_from_value(value: OwnedValue, ty: &'static str) -> Result<String, DecodeError> {
    match value {
        OwnedValue::String(s) => Ok(s),
        // non-nullable string absent from the buffer
        OwnedValue::Null => Ok(String::new()),
        other => Err(DecodeError::mismatch(ty, &other)),
    }
}

macro_rules! impl_flat_string {
    ($ty:ty) => {
        impl Flat for $ty {
            fn type_model(_cx: &mut ModelContext<'_>) -> Result<Arc<TypeModel>, ModelError> {
                Ok(Arc::new(TypeModel::string()))
            }

            fn as_value(&self) -> Value<'_> {
                Value::String(&**self)
            }

            fn from_value(value: OwnedValue) -> Result<Self, DecodeError> {
                string_from_value(value, stringify!($ty)).map(<$ty>::from)
            }
        }
    };
}

impl_flat_string!(String);
impl_flat_string!(Box<str>);
impl_flat_string!(Rc<str>);
impl_flat_string!(Arc<str>);

fn vector_model<T: Flat>(cx: &mut ModelContext<'_>) -> Result<Arc<TypeModel>, ModelError> {
    let element = cx.resolve::<T>()?;
    Ok(Arc::new(TypeModel::vector(element)?))
}

fn elements_from_value<T: Flat>(value: OwnedValue) -> Result<Vec<T>, DecodeError> {
    match value {
        OwnedValue::Vector(items) => items.into_iter().map(T::from_value).collect(),
        // non-nullable vector absent from the buffer
        OwnedValue::Null => Ok(Vec::new()),
        other => Err(DecodeError::mismatch(type_name::<Vec<T>>(), &other)),
    }
}

impl<T: Flat> Flat for Vec<T> {
    fn type_model(cx: &mut ModelContext<'_>) -> Result<Arc<TypeModel>, ModelError> {
        vector_model::<T>(cx)
    }

    fn as_value(&self) -> Value<'_> {
        Value::Vector(self)
    }

    fn from_value(value: OwnedValue) -> Result<Self, DecodeError> {
        elements_from_value(value)
    }
}

impl<T: Flat> Flat for Box<[T]> {
    fn type_model(cx: &mut ModelContext<'_>) -> Result<Arc<TypeModel>, ModelError> {
        vector_model::<T>(cx)
    }

    fn as_value(&self) -> Value<'_> {
        Value::Vector(self)
    }

    fn from_value(value: OwnedValue) -> Result<Self, DecodeError> {
        elements_from_value(value).map(Vec::into_boxed_slice)
    }
}

impl<T: Flat> Flat for VecDeque<T> {
    fn type_model(cx: &mut ModelContext<'_>) -> Result<Arc<TypeModel>, ModelError> {
        vector_model::<T>(cx)
    }

    fn as_value(&self) -> Value<'_> {
        Value::Vector(self)
    }

    fn from_value(value: OwnedValue) -> Result<Self, DecodeError> {
        elements_from_value(value).map(VecDeque::from)
    }
}

impl<T: Flat, const N: usize> Flat for [T; N] {
    fn type_model(cx: &mut ModelContext<'_>) -> Result<Arc<TypeModel>, ModelError> {
        vector_model::<T>(cx)
    }

    fn as_value(&self) -> Value<'_> {
        Value::Vector(self)
    }

    fn from_value(value: OwnedValue) -> Result<Self, DecodeError> {
        let items = elements_from_value::<T>(value)?;
        let found = items.len();
        items
            .try_into()
            .map_err(|_| DecodeError::LengthMismatch { expected: N, found })
    }
}

impl<T: Flat> Flat for Option<T> {
    const NULLABLE: bool = true;

    fn type_model(cx: &mut ModelContext<'_>) -> Result<Arc<TypeModel>, ModelError> {
        cx.resolve::<T>()
    }

    fn as_value(&self) -> Value<'_> {
        match self {
            Some(v) => v.as_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: OwnedValue) -> Result<Self, DecodeError> {
        match value {
            OwnedValue::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

macro_rules! impl_flat_pointer {
    ($ptr:ident) => {
        impl<T: Flat> Flat for $ptr<T> {
            const NULLABLE: bool = T::NULLABLE;

            fn type_model(cx: &mut ModelContext<'_>) -> Result<Arc<TypeModel>, ModelError> {
                cx.resolve::<T>()
            }

            fn as_value(&self) -> Value<'_> {
                (**self).as_value()
            }

            fn from_value(value: OwnedValue) -> Result<Self, DecodeError> {
                T::from_value(value).map($ptr::new)
            }
        }
    };
}

impl_flat_pointer!(Box);
impl_flat_pointer!(Rc);
impl_flat_pointer!(Arc);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeModelRegistry;

    #[test]
    fn scalar_values_round_trip_through_owned_form() {
        let v = 42u16.as_value().as_scalar().unwrap();
        assert_eq!(v, Scalar::UShort(42));
        assert_eq!(u16::from_value(OwnedValue::Scalar(v)).unwrap(), 42);
        assert!(u16::from_value(OwnedValue::Scalar(Scalar::Int(1))).is_err());
    }

    #[test]
    fn absent_strings_and_vectors_become_empty() {
        assert_eq!(String::from_value(OwnedValue::Null).unwrap(), "");
        assert!(Vec::<i32>::from_value(OwnedValue::Null).unwrap().is_empty());
        assert_eq!(Option::<String>::from_value(OwnedValue::Null).unwrap(), None);
    }

    #[test]
    fn fixed_arrays_check_length() {
        let items = OwnedValue::Vector(vec![OwnedValue::Scalar(Scalar::Int(1))]);
        assert!(matches!(
            <[i32; 2]>::from_value(items),
            Err(DecodeError::LengthMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn vectors_of_strings_are_rejected() {
        let registry = TypeModelRegistry::new();
        assert!(matches!(
            registry.get_type_model::<Vec<String>>(),
            Err(ModelError::UnsupportedVectorElement { .. })
        ));
    }

    #[test]
    fn pointers_share_inner_nullability() {
        assert!(!<Rc<i32> as Flat>::NULLABLE);
        assert!(<Box<Option<i32>> as Flat>::NULLABLE);
        assert_eq!(Rc::new(5i8).as_value().as_scalar(), Some(Scalar::Char(5)));
    }
}
