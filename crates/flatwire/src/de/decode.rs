// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Model-driven decoding into owned value trees.

use std::sync::Arc;

use super::table::{read_scalar, Table, VectorRef};
use super::{DecodeError, ReadError};
use crate::buffer::{FILE_IDENTIFIER_LENGTH, SIZE_UOFFSET};
use crate::config::ReaderOptions;
use crate::model::{BaseType, FieldDescriptor, ObjectValue, OwnedValue, TypeModel};

/// Whether the file identifier slot of `buf` holds `identifier`.
pub fn buffer_has_identifier(
    buf: &[u8],
    identifier: &[u8; FILE_IDENTIFIER_LENGTH],
    size_prefixed: bool,
) -> bool {
    let start = SIZE_UOFFSET * if size_prefixed { 2 } else { 1 };
    buf.get(start..start + FILE_IDENTIFIER_LENGTH) == Some(&identifier[..])
}

/// Decode `buf` as a value of `model`.
///
/// Tables are read through their root offset; fixed structs are read as raw
/// struct bytes at the start of the buffer. Absent scalar fields take their
/// declared default, absent reference fields come back as
/// [`OwnedValue::Null`].
pub fn decode_value(
    buf: &[u8],
    model: &Arc<TypeModel>,
    options: &ReaderOptions,
) -> Result<OwnedValue, DecodeError> {
    let mut decoder = Decoder {
        buf,
        max_depth: options.max_depth,
        depth: 0,
    };

    let value = if model.is_struct() {
        decoder.decode_struct(0, model)?
    } else if model.is_table() {
        if let Some(identifier) = &options.file_identifier {
            if !buffer_has_identifier(buf, identifier, options.size_prefixed) {
                return Err(ReadError::IdentifierMismatch {
                    expected: *identifier,
                }
                .into());
            }
        }
        let start = if options.size_prefixed { SIZE_UOFFSET } else { 0 };
        let root = Table::root_at(buf, start)?;
        decoder.decode_table(root, model)?
    } else {
        return Err(DecodeError::UnsupportedRoot {
            type_name: model.name().to_string(),
        });
    };

    log::debug!(
        "[de] decoded '{}' from {} bytes",
        model.name(),
        buf.len()
    );
    Ok(value)
}

struct Decoder<'a> {
    buf: &'a [u8],
    max_depth: usize,
    depth: usize,
}

impl<'a> Decoder<'a> {
    fn enter(&mut self) -> Result<(), ReadError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ReadError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn decode_table(
        &mut self,
        table: Table<'a>,
        model: &Arc<TypeModel>,
    ) -> Result<OwnedValue, DecodeError> {
        self.enter()?;
        let def = model.struct_def().ok_or(DecodeError::UnsupportedRoot {
            type_name: model.name().to_string(),
        })?;

        let mut fields = Vec::with_capacity(def.fields().len());
        for field in def.fields() {
            let value = self
                .decode_table_field(&table, field)
                .map_err(|e| e.in_field(field.name()))?;
            fields.push(value);
        }

        self.leave();
        Ok(OwnedValue::Object(ObjectValue {
            model: Arc::clone(model),
            fields,
        }))
    }

    fn decode_table_field(
        &mut self,
        table: &Table<'a>,
        field: &FieldDescriptor,
    ) -> Result<OwnedValue, DecodeError> {
        let model = field.type_model();
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
            | BaseType::Double => Ok(table
                .get_scalar(slot, model.base_type())?
                .map_or_else(|| field.default_value().to_owned_value(), OwnedValue::Scalar)),
            BaseType::String => Ok(table
                .get_string(slot)?
                .map_or(OwnedValue::Null, |s| OwnedValue::String(s.to_owned()))),
            BaseType::Vector => match table.get_vector(slot)? {
                Some(vector) => self.decode_vector(vector, &model),
                None => Ok(OwnedValue::Null),
            },
            BaseType::Struct if model.is_struct() => match table.get_struct(slot)? {
                Some(pos) => self.decode_struct(pos, &model),
                None => Ok(OwnedValue::Null),
            },
            BaseType::Struct => match table.get_table(slot)? {
                Some(nested) => self.decode_table(nested, &model),
                None => Ok(OwnedValue::Null),
            },
            BaseType::Union => Err(DecodeError::UnionNotImplemented),
        }
    }

    fn decode_struct(
        &mut self,
        pos: usize,
        model: &Arc<TypeModel>,
    ) -> Result<OwnedValue, DecodeError> {
        self.enter()?;
        let def = model.struct_def().ok_or(DecodeError::UnsupportedRoot {
            type_name: model.name().to_string(),
        })?;

        let mut fields = Vec::with_capacity(def.fields().len());
        for field in def.fields() {
            let value = self
                .decode_inline(pos + field.offset(), &field.type_model())
                .map_err(|e| e.in_field(field.name()))?;
            fields.push(value);
        }

        self.leave();
        Ok(OwnedValue::Object(ObjectValue {
            model: Arc::clone(model),
            fields,
        }))
    }

    fn decode_inline(
        &mut self,
        pos: usize,
        model: &Arc<TypeModel>,
    ) -> Result<OwnedValue, DecodeError> {
        if model.is_struct() {
            return self.decode_struct(pos, model);
        }
        Ok(OwnedValue::Scalar(read_scalar(
            self.buf,
            pos,
            model.base_type(),
        )?))
    }

    fn decode_vector(
        &mut self,
        vector: VectorRef<'a>,
        model: &TypeModel,
    ) -> Result<OwnedValue, DecodeError> {
        let element = model.element_type().ok_or(DecodeError::ValueMismatch {
            expected: "vector element model",
            found: "none",
        })?;
        let size = element.inline_size();
        // reject impossible lengths before allocating
        vector.bytes(size)?;

        let mut items = Vec::with_capacity(vector.len().min(self.buf.len()));
        for index in 0..vector.len() {
            items.push(self.decode_inline(vector.element_position(index, size), element)?);
        }
        Ok(OwnedValue::Vector(items))
    }
}
