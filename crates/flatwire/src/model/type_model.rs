// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type models: the immutable wire description of a serializable type.

use std::sync::{Arc, OnceLock, Weak};

use super::base_type::BaseType;
use super::error::ModelError;
use super::field::FieldDescriptor;

/// Size and alignment of an offset slot for out-of-line values.
pub(crate) const OFFSET_SIZE: usize = 4;

/// Wire description of one type.
///
/// Built once per type by the registry and shared through `Arc`. Never
/// mutated after publication.
#[derive(Debug, Clone)]
pub struct TypeModel {
    name: String,
    base_type: BaseType,
    inline_size: usize,
    inline_alignment: usize,
    struct_def: Option<StructDef>,
    element: Option<Arc<TypeModel>>,
    /// Set on a reference to a table that was still being built when the
    /// reference was taken.
    forward: Option<ForwardTarget>,
}

/// Late-bound target of a forward table reference. Weak, so a table that
/// names itself does not keep itself alive.
pub(crate) type ForwardTarget = Arc<OnceLock<Weak<TypeModel>>>;

impl TypeModel {
    /// Model for a scalar kind.
    pub fn scalar(base_type: BaseType) -> Result<Self, ModelError> {
        let size = base_type
            .scalar_size()
            .ok_or(ModelError::NotScalar { base_type })?;
        Ok(Self {
            name: base_type.name().to_string(),
            base_type,
            inline_size: size,
            inline_alignment: size,
            struct_def: None,
            element: None,
            forward: None,
        })
    }

    pub fn string() -> Self {
        Self::out_of_line("string".to_string(), BaseType::String)
    }

    pub fn union(name: impl Into<String>) -> Self {
        Self::out_of_line(name.into(), BaseType::Union)
    }

    /// Model for a vector. Elements must have a fixed inline layout
    /// (scalars or fixed structs).
    pub fn vector(element: Arc<TypeModel>) -> Result<Self, ModelError> {
        if !element.is_fixed() {
            return Err(ModelError::UnsupportedVectorElement {
                element: element.name.clone(),
            });
        }
        let mut model = Self::out_of_line(format!("[{}]", element.name), BaseType::Vector);
        model.element = Some(element);
        Ok(model)
    }

    /// Model for a table or a fixed struct, as decided by `def`.
    pub fn structure(name: impl Into<String>, def: StructDef) -> Self {
        let (inline_size, inline_alignment) = if def.is_fixed {
            (def.byte_size, def.min_align)
        } else {
            (OFFSET_SIZE, OFFSET_SIZE)
        };
        Self {
            name: name.into(),
            base_type: BaseType::Struct,
            inline_size,
            inline_alignment,
            struct_def: Some(def),
            element: None,
            forward: None,
        }
    }

    /// Placeholder for a table whose model is not finished yet, as in
    /// `next: Option<Box<Node>>` inside `Node`.
    pub(crate) fn forward(name: impl Into<String>, target: ForwardTarget) -> Self {
        let mut model = Self::out_of_line(name.into(), BaseType::Struct);
        model.forward = Some(target);
        model
    }

    fn out_of_line(name: String, base_type: BaseType) -> Self {
        Self {
            name,
            base_type,
            inline_size: OFFSET_SIZE,
            inline_alignment: OFFSET_SIZE,
            struct_def: None,
            element: None,
            forward: None,
        }
    }

    /// The model a forward reference stands for, or `model` itself. A
    /// forward reference whose target is gone resolves to itself and has no
    /// field layout.
    pub fn resolve(model: &Arc<TypeModel>) -> Arc<TypeModel> {
        model
            .forward
            .as_ref()
            .and_then(|target| target.get())
            .and_then(Weak::upgrade)
            .unwrap_or_else(|| Arc::clone(model))
    }

    pub fn is_forward(&self) -> bool {
        self.forward.is_some()
    }

    /// Rename the model, keeping its layout. Used for enums, which share
    /// the layout of their underlying integer.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_type(&self) -> BaseType {
        self.base_type
    }

    /// Bytes the value occupies where it is embedded.
    pub fn inline_size(&self) -> usize {
        self.inline_size
    }

    pub fn inline_alignment(&self) -> usize {
        self.inline_alignment
    }

    pub fn struct_def(&self) -> Option<&StructDef> {
        self.struct_def.as_ref()
    }

    /// Element model of a vector.
    pub fn element_type(&self) -> Option<&Arc<TypeModel>> {
        self.element.as_ref()
    }

    pub fn is_scalar(&self) -> bool {
        self.base_type.is_scalar()
    }

    /// Fixed structs: written inline with a fixed layout.
    pub fn is_struct(&self) -> bool {
        self.struct_def.as_ref().is_some_and(|d| d.is_fixed)
    }

    pub fn is_table(&self) -> bool {
        self.forward.is_some() || self.struct_def.as_ref().is_some_and(|d| !d.is_fixed)
    }

    /// Scalars and fixed structs.
    pub fn is_fixed(&self) -> bool {
        self.is_scalar() || self.is_struct()
    }

    /// Values written out of line and referenced through an offset.
    pub fn is_reference(&self) -> bool {
        !self.is_fixed()
    }
}

/// Field layout of a table or a fixed struct.
#[derive(Debug, Clone)]
pub struct StructDef {
    pub(crate) is_fixed: bool,
    pub(crate) byte_size: usize,
    pub(crate) min_align: usize,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) write_order: Vec<usize>,
}

impl StructDef {
    /// True for fixed structs, false for tables.
    pub fn is_fixed(&self) -> bool {
        self.is_fixed
    }

    /// Total size of a fixed struct including trailing padding. Zero for tables.
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    pub fn min_align(&self) -> usize {
        self.min_align
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Indices into `fields()` in the order table fields are emitted:
    /// largest inline size first, declaration order among equals.
    pub fn write_order(&self) -> &[usize] {
        &self.write_order
    }

    /// Number of vtable slots a table of this shape needs.
    pub fn slot_count(&self) -> usize {
        self.fields.len()
    }

    /// True when any field is written out of line.
    pub fn has_reference_fields(&self) -> bool {
        self.fields.iter().any(|f| f.type_model().is_reference())
    }
}
