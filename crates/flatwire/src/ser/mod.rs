// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Model-driven serialization of an object graph into a FlatBuffer.

mod context;

#[cfg(test)]
mod tests;

pub use context::SerializationContext;

use std::fmt;

use crate::buffer::BuildError;
use crate::model::{BaseType, ModelError};

/// Failure of a single serialize call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializeError {
    Model(ModelError),
    Build(BuildError),
    /// Only tables and fixed structs can be buffer roots.
    UnsupportedRoot { type_name: String },
    UnionNotImplemented { field: String },
    /// A reference field was not serialized during the pre-pass.
    MissingReference { field: String },
    InvalidBaseType {
        base_type: BaseType,
        context: &'static str,
    },
    /// A field accessor produced a value that does not fit the field's model.
    ValueMismatch {
        field: String,
        expected: BaseType,
        found: &'static str,
    },
    /// A field accessor rejected the container it was given.
    ContainerMismatch { field: String },
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializeError::Model(e) => write!(f, "type model error: {}", e),
            SerializeError::Build(e) => write!(f, "builder error: {}", e),
            SerializeError::UnsupportedRoot { type_name } => {
                write!(f, "{} cannot be a buffer root", type_name)
            }
            SerializeError::UnionNotImplemented { field } => {
                write!(f, "union field {} is not implemented", field)
            }
            SerializeError::MissingReference { field } => {
                write!(f, "no offset recorded for reference field {}", field)
            }
            SerializeError::InvalidBaseType { base_type, context } => {
                write!(f, "invalid base type {} while writing {}", base_type, context)
            }
            SerializeError::ValueMismatch {
                field,
                expected,
                found,
            } => write!(f, "field {} expects {}, got {}", field, expected, found),
            SerializeError::ContainerMismatch { field } => {
                write!(f, "accessor for field {} rejected its container", field)
            }
        }
    }
}

impl std::error::Error for SerializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SerializeError::Model(e) => Some(e),
            SerializeError::Build(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BuildError> for SerializeError {
    fn from(e: BuildError) -> Self {
        SerializeError::Build(e)
    }
}

impl From<ModelError> for SerializeError {
    fn from(e: ModelError) -> Self {
        SerializeError::Model(e)
    }
}
