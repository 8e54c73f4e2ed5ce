// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use super::SerializeError;
use crate::buffer::{FlatBufferBuilder, Offset, FILE_IDENTIFIER_LENGTH};
use crate::model::{
    BaseType, FieldDescriptor, ObjectKey, Scalar, StructDef, TypeModel, Value, VectorView,
};

/// Serializes one object graph into one buffer.
///
/// Tables are written in two passes. The pre-pass walks every reference
/// field reachable from the root (strings, vectors, nested tables) and writes
/// each one leaf first, caching its offset under the value's identity. The
/// root pass then writes the root table, resolving reference fields from the
/// cache. A value reachable through several fields is written once.
///
/// Fixed-struct roots skip both the pre-pass and `finish`: the result is the
/// raw struct bytes.
///
/// Single use: [`serialize`](Self::serialize) consumes the context.
pub struct SerializationContext<'v> {
    root: &'v dyn Any,
    root_model: Arc<TypeModel>,
    builder: FlatBufferBuilder,
    offsets: HashMap<ObjectKey, Offset>,
    file_identifier: Option<[u8; FILE_IDENTIFIER_LENGTH]>,
    size_prefixed: bool,
}

impl<'v> SerializationContext<'v> {
    /// `root` must be an instance of the type `root_model` was built for.
    pub fn new(root: &'v dyn Any, root_model: Arc<TypeModel>, builder: FlatBufferBuilder) -> Self {
        Self {
            root,
            root_model,
            builder,
            offsets: HashMap::new(),
            file_identifier: None,
            size_prefixed: false,
        }
    }

    #[must_use]
    pub fn with_file_identifier(
        mut self,
        identifier: Option<[u8; FILE_IDENTIFIER_LENGTH]>,
    ) -> Self {
        self.file_identifier = identifier;
        self
    }

    #[must_use]
    pub fn with_size_prefix(mut self, size_prefixed: bool) -> Self {
        self.size_prefixed = size_prefixed;
        self
    }

    /// Write the root and everything it references. Returns the builder
    /// holding the finished buffer.
    pub fn serialize(mut self) -> Result<FlatBufferBuilder, SerializeError> {
        let model = Arc::clone(&self.root_model);
        let def = model
            .struct_def()
            .ok_or_else(|| SerializeError::UnsupportedRoot {
                type_name: model.name().to_string(),
            })?;

        if def.is_fixed() {
            self.serialize_struct(self.root, &model)?;
            log::debug!(
                "[ser] wrote struct '{}' ({} bytes)",
                model.name(),
                self.builder.offset()
            );
            return Ok(self.builder);
        }

        if def.has_reference_fields() {
            self.serialize_reference_fields(self.root, &model)?;
        }
        let root = self.serialize_table(self.root, &model)?;

        let identifier = self.file_identifier;
        if self.size_prefixed {
            self.builder.finish_size_prefixed(root, identifier.as_ref())?;
        } else if let Some(identifier) = identifier {
            self.builder.finish_with_identifier(root, &identifier)?;
        } else {
            self.builder.finish(root)?;
        }

        log::debug!(
            "[ser] wrote table '{}' ({} bytes, {} shared references)",
            model.name(),
            self.builder.offset(),
            self.offsets.len()
        );
        Ok(self.builder)
    }

    /// Pre-pass: write every not-yet-written reference field of `obj`,
    /// depth first.
    fn serialize_reference_fields(
        &mut self,
        obj: &'v dyn Any,
        model: &TypeModel,
    ) -> Result<(), SerializeError> {
        let def = struct_def(model)?;
        for field in def.fields() {
            if !field.type_model().is_reference() {
                continue;
            }
            let value = field_value(obj, field)?;
            if value.is_null() {
                continue;
            }
            let key = identity(&value, field)?;
            if self.offsets.contains_key(&key) {
                continue;
            }
            let offset = self.serialize_reference(value, field)?;
            self.offsets.insert(key, offset);
        }
        Ok(())
    }

    fn serialize_reference(
        &mut self,
        value: Value<'v>,
        field: &FieldDescriptor,
    ) -> Result<Offset, SerializeError> {
        let model = field.type_model();
        let model: &TypeModel = &model;
        match model.base_type() {
            BaseType::String => {
                let s = value.as_str().ok_or_else(|| mismatch(field, &value))?;
                Ok(self.builder.create_string(s)?)
            }
            BaseType::Vector => {
                let vector = value.as_vector().ok_or_else(|| mismatch(field, &value))?;
                self.serialize_vector(vector, model)
            }
            BaseType::Struct if model.is_table() => {
                let obj = value.as_object().ok_or_else(|| mismatch(field, &value))?;
                if struct_def(model)?.has_reference_fields() {
                    self.serialize_reference_fields(obj, model)?;
                }
                self.serialize_table(obj, model)
            }
            BaseType::Union => Err(SerializeError::UnionNotImplemented {
                field: field.name().to_string(),
            }),
            BaseType::Bool
            | BaseType::Char
            | BaseType::UChar
            | BaseType::Short
            | BaseType::UShort
            | BaseType::Int
            | BaseType::UInt
            | BaseType::Long
            | BaseType::ULong
            | BaseType::Float
            | BaseType::Double
            | BaseType::Struct => Err(SerializeError::InvalidBaseType {
                base_type: model.base_type(),
                context: "reference value",
            }),
        }
    }

    fn serialize_table(
        &mut self,
        obj: &'v dyn Any,
        model: &TypeModel,
    ) -> Result<Offset, SerializeError> {
        let def = struct_def(model)?;
        self.builder.start_object(def.slot_count())?;
        for &index in def.write_order() {
            let field = &def.fields()[index];
            let value = field_value(obj, field)?;
            self.serialize_property(value, field)?;
        }
        Ok(self.builder.end_object()?)
    }

    /// Write one table field, or nothing when it holds its default.
    fn serialize_property(
        &mut self,
        value: Value<'v>,
        field: &FieldDescriptor,
    ) -> Result<(), SerializeError> {
        // null reference fields are omitted, never written as empty values
        if value.is_null() {
            return Ok(());
        }
        if !self.builder.force_defaults() && field.default_value().is_default(&value) {
            return Ok(());
        }

        let model = field.type_model();
        let model: &TypeModel = &model;
        let slot = field.index();
        match model.base_type() {
            BaseType::Bool
            | BaseType::Char
            | BaseType::UChar
            | BaseType::Short
            | BaseType::UShort
            | BaseType::Int
            | BaseType::UInt
            | BaseType::Long
            | BaseType::ULong
            | BaseType::Float
            | BaseType::Double => {
                let scalar = expect_scalar(&value, model, field.name())?;
                self.builder.add_scalar_slot_always(slot, scalar)?;
            }
            BaseType::Struct if model.is_struct() => {
                let obj = value.as_object().ok_or_else(|| mismatch(field, &value))?;
                let offset = self.serialize_struct(obj, model)?;
                self.builder.add_struct_slot(slot, offset)?;
            }
            BaseType::String | BaseType::Vector | BaseType::Struct => {
                let key = identity(&value, field)?;
                let offset = *self.offsets.get(&key).ok_or_else(|| {
                    SerializeError::MissingReference {
                        field: field.name().to_string(),
                    }
                })?;
                self.builder.add_offset_slot(slot, offset)?;
            }
            BaseType::Union => {
                return Err(SerializeError::UnionNotImplemented {
                    field: field.name().to_string(),
                })
            }
        }
        Ok(())
    }

    /// Write a fixed struct inline: fields last to first, each preceded by
    /// its trailing padding.
    fn serialize_struct(
        &mut self,
        obj: &'v dyn Any,
        model: &TypeModel,
    ) -> Result<Offset, SerializeError> {
        let def = struct_def(model)?;
        self.builder.prep(def.min_align(), def.byte_size())?;
        for field in def.fields().iter().rev() {
            self.builder.pad(field.padding())?;
            let value = field_value(obj, field)?;
            self.serialize_inline(value, &field.type_model(), field.name())?;
        }
        Ok(self.builder.current_offset())
    }

    fn serialize_inline(
        &mut self,
        value: Value<'v>,
        model: &TypeModel,
        owner: &str,
    ) -> Result<(), SerializeError> {
        match model.base_type() {
            BaseType::Bool
            | BaseType::Char
            | BaseType::UChar
            | BaseType::Short
            | BaseType::UShort
            | BaseType::Int
            | BaseType::UInt
            | BaseType::Long
            | BaseType::ULong
            | BaseType::Float
            | BaseType::Double => {
                let scalar = expect_scalar(&value, model, owner)?;
                self.builder.add_scalar(scalar)?;
            }
            BaseType::Struct if model.is_struct() => {
                let obj = value
                    .as_object()
                    .ok_or_else(|| SerializeError::ValueMismatch {
                        field: owner.to_string(),
                        expected: BaseType::Struct,
                        found: value.kind_name(),
                    })?;
                self.serialize_struct(obj, model)?;
            }
            BaseType::String | BaseType::Vector | BaseType::Struct | BaseType::Union => {
                return Err(SerializeError::InvalidBaseType {
                    base_type: model.base_type(),
                    context: "inline value",
                })
            }
        }
        Ok(())
    }

    /// Write a vector of scalars or structs. Elements go in last to first so
    /// the buffer reads them in order.
    fn serialize_vector(
        &mut self,
        vector: &'v dyn VectorView,
        model: &TypeModel,
    ) -> Result<Offset, SerializeError> {
        let element = model
            .element_type()
            .ok_or(SerializeError::InvalidBaseType {
                base_type: model.base_type(),
                context: "vector without element type",
            })?;
        let len = vector.len();
        self.builder
            .start_vector(element.inline_size(), len, element.inline_alignment())?;
        for index in (0..len).rev() {
            let value = vector
                .element(index)
                .ok_or_else(|| SerializeError::ValueMismatch {
                    field: format!("{}[{}]", model.name(), index),
                    expected: element.base_type(),
                    found: "missing element",
                })?;
            self.serialize_inline(value, element, element.name())?;
        }
        Ok(self.builder.end_vector()?)
    }
}

fn struct_def(model: &TypeModel) -> Result<&StructDef, SerializeError> {
    model
        .struct_def()
        .ok_or(SerializeError::InvalidBaseType {
            base_type: model.base_type(),
            context: "composite without field layout",
        })
}

fn field_value<'v>(obj: &'v dyn Any, field: &FieldDescriptor) -> Result<Value<'v>, SerializeError> {
    field
        .value(obj)
        .ok_or_else(|| SerializeError::ContainerMismatch {
            field: field.name().to_string(),
        })
}

fn identity(value: &Value<'_>, field: &FieldDescriptor) -> Result<ObjectKey, SerializeError> {
    value.identity().ok_or_else(|| mismatch(field, value))
}

fn expect_scalar(
    value: &Value<'_>,
    model: &TypeModel,
    owner: &str,
) -> Result<Scalar, SerializeError> {
    match value.as_scalar() {
        Some(scalar) if scalar.base_type() == model.base_type() => Ok(scalar),
        _ => Err(SerializeError::ValueMismatch {
            field: owner.to_string(),
            expected: model.base_type(),
            found: value.kind_name(),
        }),
    }
}

fn mismatch(field: &FieldDescriptor, value: &Value<'_>) -> SerializeError {
    SerializeError::ValueMismatch {
        field: field.name().to_string(),
        expected: field.type_model().base_type(),
        found: value.kind_name(),
    }
}
