// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::fmt;

use super::base_type::BaseType;

/// Errors raised while building a type model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    NotScalar {
        base_type: BaseType,
    },
    UnsupportedVectorElement {
        element: String,
    },
    /// A fixed struct declared a string, vector, table or union field.
    ReferenceInStruct {
        type_name: String,
        field: String,
    },
    NullableStructField {
        type_name: String,
        field: String,
    },
    /// A fixed struct declared no fields.
    EmptyStruct {
        type_name: String,
    },
    InvalidFieldIds {
        type_name: String,
        reason: String,
    },
    InvalidDefault {
        type_name: String,
        field: String,
        reason: String,
    },
    /// A fixed struct that contains itself, directly or through other
    /// structs.
    RecursiveType {
        type_name: &'static str,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::NotScalar { base_type } => {
                write!(f, "base type {} is not a scalar", base_type)
            }
            ModelError::UnsupportedVectorElement { element } => write!(
                f,
                "vector element type {} is not supported (only scalars and structs)",
                element
            ),
            ModelError::ReferenceInStruct { type_name, field } => write!(
                f,
                "struct {} field {} must be a scalar or struct",
                type_name, field
            ),
            ModelError::NullableStructField { type_name, field } => {
                write!(f, "struct {} field {} cannot be nullable", type_name, field)
            }
            ModelError::EmptyStruct { type_name } => {
                write!(f, "struct {} has no fields", type_name)
            }
            ModelError::InvalidFieldIds { type_name, reason } => {
                write!(f, "invalid field ids on {}: {}", type_name, reason)
            }
            ModelError::InvalidDefault {
                type_name,
                field,
                reason,
            } => write!(
                f,
                "invalid default for {}.{}: {}",
                type_name, field, reason
            ),
            ModelError::RecursiveType { type_name } => {
                write!(f, "struct {} contains itself and has no finite size", type_name)
            }
        }
    }
}

impl std::error::Error for ModelError {}
