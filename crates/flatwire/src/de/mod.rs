// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reading FlatBuffers.
//!
//! [`Table`] gives bounds-checked access to the fields of one table through
//! its vtable. [`decode_value`] walks a whole buffer against a type model and
//! produces an [`OwnedValue`](crate::model::OwnedValue) tree, which
//! [`Flat::from_value`](crate::Flat::from_value) turns back into Rust values.
//!
//! Buffers are untrusted input: every offset is checked and a malformed
//! buffer yields a [`ReadError`], never a panic.

mod decode;
mod table;

#[cfg(test)]
mod tests;

pub use decode::{buffer_has_identifier, decode_value};
pub use table::{
    follow_uoffset, read_f32, read_f64, read_i16, read_i32, read_i64, read_i8, read_scalar,
    read_string, read_u16, read_u32, read_u64, read_u8, Table, VectorRef,
};

use std::fmt;

use crate::buffer::FILE_IDENTIFIER_LENGTH;
use crate::model::{BaseType, OwnedValue};

/// Malformed buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    OutOfBounds {
        offset: usize,
        len: usize,
        buffer_len: usize,
    },
    BadVtable {
        table: usize,
        reason: &'static str,
    },
    InvalidUtf8 {
        offset: usize,
    },
    MissingNul {
        offset: usize,
    },
    NotScalar {
        base_type: BaseType,
    },
    DepthExceeded {
        max_depth: usize,
    },
    IdentifierMismatch {
        expected: [u8; FILE_IDENTIFIER_LENGTH],
    },
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::OutOfBounds {
                offset,
                len,
                buffer_len,
            } => write!(
                f,
                "read of {} bytes at offset {} exceeds buffer of {} bytes",
                len, offset, buffer_len
            ),
            ReadError::BadVtable { table, reason } => {
                write!(f, "bad vtable for table at {}: {}", table, reason)
            }
            ReadError::InvalidUtf8 { offset } => {
                write!(f, "string at offset {} is not valid UTF-8", offset)
            }
            ReadError::MissingNul { offset } => {
                write!(f, "string at offset {} is not NUL-terminated", offset)
            }
            ReadError::NotScalar { base_type } => {
                write!(f, "cannot read {} as a scalar", base_type)
            }
            ReadError::DepthExceeded { max_depth } => {
                write!(f, "nesting deeper than {} levels", max_depth)
            }
            ReadError::IdentifierMismatch { expected } => write!(
                f,
                "file identifier mismatch (expected {:?})",
                String::from_utf8_lossy(expected)
            ),
        }
    }
}

impl std::error::Error for ReadError {}

/// Failure to turn a buffer into a typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    Read(ReadError),
    ValueMismatch {
        expected: &'static str,
        found: &'static str,
    },
    LengthMismatch {
        expected: usize,
        found: usize,
    },
    UnknownEnumValue {
        type_name: &'static str,
        value: i64,
    },
    /// A field accessor was handed a container of the wrong type.
    ContainerMismatch {
        expected: &'static str,
    },
    UnionNotImplemented,
    UnsupportedRoot {
        type_name: String,
    },
    Field {
        field: String,
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    pub fn mismatch(expected: &'static str, found: &OwnedValue) -> Self {
        DecodeError::ValueMismatch {
            expected,
            found: found.kind_name(),
        }
    }

    /// Attach the name of the field being decoded.
    #[must_use]
    pub fn in_field(self, field: &str) -> Self {
        DecodeError::Field {
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, without field context.
    pub fn root_cause(&self) -> &DecodeError {
        match self {
            DecodeError::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Read(e) => write!(f, "malformed buffer: {}", e),
            DecodeError::ValueMismatch { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            DecodeError::LengthMismatch { expected, found } => {
                write!(f, "expected {} elements, found {}", expected, found)
            }
            DecodeError::UnknownEnumValue { type_name, value } => {
                write!(f, "unknown {} discriminant {}", type_name, value)
            }
            DecodeError::ContainerMismatch { expected } => {
                write!(f, "field accessor expected a {} container", expected)
            }
            DecodeError::UnionNotImplemented => write!(f, "union fields are not implemented"),
            DecodeError::UnsupportedRoot { type_name } => {
                write!(f, "{} cannot be a buffer root", type_name)
            }
            DecodeError::Field { field, source } => write!(f, "field {}: {}", field, source),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Read(e) => Some(e),
            DecodeError::Field { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<ReadError> for DecodeError {
    fn from(e: ReadError) -> Self {
        DecodeError::Read(e)
    }
}
