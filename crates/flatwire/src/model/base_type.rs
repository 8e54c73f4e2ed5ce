// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire-level base types.

use std::fmt;

/// Wire classification of a serializable type.
///
/// Scalars are written inline at their natural size and alignment. `String`
/// and `Vector` are always written out of line and referenced by offset.
/// `Struct` covers both fixed structs (inline) and tables (out of line); the
/// distinction lives on the type model's struct definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Bool,
    /// Signed 8-bit integer.
    Char,
    /// Unsigned 8-bit integer.
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    String,
    Vector,
    Struct,
    Union,
}

impl BaseType {
    /// True for the eleven fixed-width scalar kinds.
    pub fn is_scalar(self) -> bool {
        self.scalar_size().is_some()
    }

    /// Inline size in bytes of a scalar kind, `None` for everything else.
    pub fn scalar_size(self) -> Option<usize> {
        match self {
            Self::Bool | Self::Char | Self::UChar => Some(1),
            Self::Short | Self::UShort => Some(2),
            Self::Int | Self::UInt | Self::Float => Some(4),
            Self::Long | Self::ULong | Self::Double => Some(8),
            Self::String | Self::Vector | Self::Struct | Self::Union => None,
        }
    }

    /// Schema-style name (`int`, `ubyte`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "byte",
            Self::UChar => "ubyte",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Long => "long",
            Self::ULong => "ulong",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Vector => "vector",
            Self::Struct => "struct",
            Self::Union => "union",
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_sizes() {
        assert_eq!(BaseType::Bool.scalar_size(), Some(1));
        assert_eq!(BaseType::UShort.scalar_size(), Some(2));
        assert_eq!(BaseType::Float.scalar_size(), Some(4));
        assert_eq!(BaseType::ULong.scalar_size(), Some(8));
        assert_eq!(BaseType::String.scalar_size(), None);
        assert!(!BaseType::Union.is_scalar());
        assert!(BaseType::Char.is_scalar());
    }
}
