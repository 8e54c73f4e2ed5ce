// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type models and the `Flat` trait.
//!
//! A [`TypeModel`] describes how one Rust type maps onto the FlatBuffers wire
//! format: its base type, inline size and alignment, and for tables and
//! structs the ordered list of [`FieldDescriptor`]s. Models are produced by
//! [`Flat::type_model`] (usually generated by `#[derive(Flat)]`) and cached in
//! a [`TypeModelRegistry`].
//!
//! # Example
//!
//! ```
//! use flatwire::{Flat, TypeModelRegistry};
//!
//! #[derive(Debug, Default, Flat)]
//! struct Monster {
//!     hp: i16,
//!     name: Option<String>,
//! }
//!
//! let registry = TypeModelRegistry::new();
//! let model = registry.get_type_model::<Monster>().unwrap();
//! assert!(model.is_table());
//! assert_eq!(model.struct_def().unwrap().fields().len(), 2);
//! ```

mod base_type;
mod builder;
mod error;
mod field;
mod impls;
mod registry;
mod type_model;
mod value;

pub use base_type::BaseType;
pub use builder::{FieldSpec, StructDefBuilder};
pub use error::ModelError;
pub use field::{FieldAccessor, FieldDefault, FieldDescriptor, GetFn, SetFn, ValueAccessor};
pub use registry::{LookupStats, ModelContext, TypeModelRegistry};
pub use type_model::{StructDef, TypeModel};
pub use value::{ObjectKey, ObjectValue, OwnedValue, Scalar, Value, VectorView};

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::de::DecodeError;

/// A type that can be serialized to and read back from a FlatBuffer.
///
/// Implemented for the scalar primitives, strings, vectors of scalars or
/// structs, and `Option`/`Box`/`Rc`/`Arc` wrappers. User tables, structs and
/// fieldless enums get it from `#[derive(Flat)]`.
pub trait Flat: Any {
    /// Whether a missing value is representable. Nullable fields are omitted
    /// from a table when null.
    const NULLABLE: bool = false;

    /// Build the model of this type, resolving field types through `cx`.
    fn type_model(cx: &mut ModelContext<'_>) -> Result<Arc<TypeModel>, ModelError>;

    /// Borrowed view of this value.
    fn as_value(&self) -> Value<'_>;

    /// Rebuild a value from its decoded form.
    fn from_value(value: OwnedValue) -> Result<Self, DecodeError>
    where
        Self: Sized;
}

/// Rebuild a table or struct instance from a decoded object by starting from
/// `T::default()` and assigning each field through its accessor. A null
/// object yields the default instance.
pub fn decode_object<T: Flat + Default>(value: OwnedValue) -> Result<T, DecodeError> {
    let ObjectValue { model, fields } = match value {
        OwnedValue::Object(object) => object,
        OwnedValue::Null => return Ok(T::default()),
        other => return Err(DecodeError::mismatch(type_name::<T>(), &other)),
    };
    let def = model.struct_def().ok_or(DecodeError::ValueMismatch {
        expected: type_name::<T>(),
        found: "non-composite model",
    })?;

    let mut container = T::default();
    for (field, value) in def.fields().iter().zip(fields) {
        field
            .accessor()
            .set(&mut container, value)
            .map_err(|e| e.in_field(field.name()))?;
    }
    Ok(container)
}
