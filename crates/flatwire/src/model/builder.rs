// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder for table and struct type models.

use std::sync::Arc;

use super::error::ModelError;
use super::field::{FieldDefault, FieldDescriptor, ValueAccessor};
use super::type_model::{StructDef, TypeModel};
use super::value::{Scalar, Value};

/// Declaration of one field, before layout is computed.
pub struct FieldSpec {
    name: String,
    type_model: Arc<TypeModel>,
    accessor: Arc<dyn ValueAccessor>,
    id: Option<usize>,
    nullable: bool,
    default: Option<Result<Scalar, &'static str>>,
}

impl FieldSpec {
    pub fn new(
        name: impl Into<String>,
        type_model: Arc<TypeModel>,
        accessor: impl ValueAccessor + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            type_model,
            accessor: Arc::new(accessor),
            id: None,
            nullable: false,
            default: None,
        }
    }

    /// Explicit vtable slot. Either every field of a table carries one or
    /// none does.
    #[must_use]
    pub fn id(mut self, id: usize) -> Self {
        self.id = Some(id);
        self
    }

    /// Mark the field as optional: a null value is omitted from the table.
    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Declared default for a scalar field. Values equal to it are omitted
    /// from the table and absent fields read back as it.
    #[must_use]
    pub fn default_value(mut self, value: Value<'_>) -> Self {
        self.default = Some(value.as_scalar().ok_or(value.kind_name()));
        self
    }
}

/// Builds the [`TypeModel`] of a table or a fixed struct.
pub struct StructDefBuilder {
    name: String,
    is_fixed: bool,
    fields: Vec<FieldSpec>,
}

impl StructDefBuilder {
    /// A table: fields live behind a vtable and may be omitted.
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_fixed: false,
            fields: Vec::new(),
        }
    }

    /// A fixed struct: every field is inline, in declaration order.
    pub fn fixed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_fixed: true,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn build(self) -> Result<TypeModel, ModelError> {
        let slots = self.assign_slots()?;
        let layout = if self.is_fixed {
            self.struct_layout()?
        } else {
            Layout::table(self.fields.len())
        };

        let mut fields = Vec::with_capacity(self.fields.len());
        for (i, spec) in self.fields.into_iter().enumerate() {
            let default = resolve_default(&self.name, &spec)?;
            fields.push(FieldDescriptor {
                name: spec.name,
                type_model: spec.type_model,
                index: slots[i],
                offset: layout.offsets[i],
                padding: layout.padding[i],
                nullable: spec.nullable,
                default,
                accessor: spec.accessor,
            });
        }

        let write_order = if self.is_fixed {
            (0..fields.len()).collect()
        } else {
            let mut order: Vec<usize> = (0..fields.len()).collect();
            // sort_by_key is stable: declaration order among equal sizes
            order.sort_by_key(|&i| std::cmp::Reverse(fields[i].type_model.inline_size()));
            order
        };

        log::debug!(
            "[registry] built {} '{}' with {} fields (size={}, align={})",
            if self.is_fixed { "struct" } else { "table" },
            self.name,
            fields.len(),
            layout.byte_size,
            layout.min_align
        );

        let def = StructDef {
            is_fixed: self.is_fixed,
            byte_size: layout.byte_size,
            min_align: layout.min_align,
            fields,
            write_order,
        };
        Ok(TypeModel::structure(self.name, def))
    }

    fn assign_slots(&self) -> Result<Vec<usize>, ModelError> {
        let count = self.fields.len();
        let explicit = self.fields.iter().filter(|f| f.id.is_some()).count();
        if explicit == 0 {
            return Ok((0..count).collect());
        }
        let invalid = |reason: String| ModelError::InvalidFieldIds {
            type_name: self.name.clone(),
            reason,
        };
        if self.is_fixed {
            return Err(invalid("struct fields cannot carry ids".to_string()));
        }
        if explicit != count {
            return Err(invalid(format!(
                "{} of {} fields carry an id; either all or none must",
                explicit, count
            )));
        }

        let mut seen = vec![false; count];
        let mut slots = Vec::with_capacity(count);
        for spec in &self.fields {
            let id = spec.id.unwrap_or_default();
            match seen.get_mut(id) {
                Some(taken) if !*taken => *taken = true,
                Some(_) => return Err(invalid(format!("id {} used twice", id))),
                None => {
                    return Err(invalid(format!(
                        "id {} on field {} is out of range 0..{}",
                        id, spec.name, count
                    )))
                }
            }
            slots.push(id);
        }
        Ok(slots)
    }

    fn struct_layout(&self) -> Result<Layout, ModelError> {
        // a zero-sized struct has no wire form and would make vector
        // lengths unbounded by the buffer size
        if self.fields.is_empty() {
            return Err(ModelError::EmptyStruct {
                type_name: self.name.clone(),
            });
        }
        let mut offsets = Vec::with_capacity(self.fields.len());
        let mut ends = Vec::with_capacity(self.fields.len());
        let mut cursor = 0usize;
        let mut min_align = 1usize;

        for spec in &self.fields {
            let model = &spec.type_model;
            if !model.is_fixed() {
                return Err(ModelError::ReferenceInStruct {
                    type_name: self.name.clone(),
                    field: spec.name.clone(),
                });
            }
            if spec.nullable {
                return Err(ModelError::NullableStructField {
                    type_name: self.name.clone(),
                    field: spec.name.clone(),
                });
            }
            let align = model.inline_alignment().max(1);
            cursor = align_up(cursor, align);
            offsets.push(cursor);
            cursor += model.inline_size();
            ends.push(cursor);
            min_align = min_align.max(align);
        }

        let byte_size = align_up(cursor, min_align);
        let padding = (0..offsets.len())
            .map(|i| offsets.get(i + 1).copied().unwrap_or(byte_size) - ends[i])
            .collect();

        Ok(Layout {
            offsets,
            padding,
            byte_size,
            min_align,
        })
    }
}

struct Layout {
    offsets: Vec<usize>,
    padding: Vec<usize>,
    byte_size: usize,
    min_align: usize,
}

impl Layout {
    fn table(count: usize) -> Self {
        Self {
            offsets: vec![0; count],
            padding: vec![0; count],
            byte_size: 0,
            min_align: 1,
        }
    }
}

fn resolve_default(type_name: &str, spec: &FieldSpec) -> Result<FieldDefault, ModelError> {
    let invalid = |reason: String| ModelError::InvalidDefault {
        type_name: type_name.to_string(),
        field: spec.name.clone(),
        reason,
    };
    let base = spec.type_model.base_type();

    match spec.default {
        None if spec.nullable || !base.is_scalar() => Ok(FieldDefault::Null),
        None => Scalar::zero(base)
            .map(FieldDefault::Scalar)
            .ok_or_else(|| invalid(format!("no zero value for {}", base))),
        Some(Err(kind)) => Err(invalid(format!("default must be a scalar, got {}", kind))),
        Some(Ok(_)) if spec.nullable => {
            Err(invalid("nullable fields cannot declare a default".to_string()))
        }
        Some(Ok(scalar)) if scalar.base_type() != base => Err(invalid(format!(
            "default is {} but field is {}",
            scalar.base_type(),
            base
        ))),
        Some(Ok(scalar)) => Ok(FieldDefault::Scalar(scalar)),
    }
}

fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) / align * align
}
