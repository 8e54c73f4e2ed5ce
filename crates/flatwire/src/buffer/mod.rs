// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Back-to-front FlatBuffers builder.
//!
//! Offsets handed out by the builder ([`Offset`]) count bytes from the end of
//! the buffer, so they stay valid when the buffer grows. The final layout is
//! only fixed once the root is written by [`FlatBufferBuilder::finish`].

mod builder;


pub use builder::FlatBufferBuilder;

use std::fmt;

/// Size of an unsigned offset to an out-of-line value.
pub const SIZE_UOFFSET: usize = 4;
/// Size of the signed offset from a table to its vtable.
pub const SIZE_SOFFSET: usize = 4;
/// Size of one vtable entry.
pub const SIZE_VOFFSET: usize = 2;
/// Length of a file identifier.
pub const FILE_IDENTIFIER_LENGTH: usize = 4;
/// Largest buffer the builder will grow to (2 GiB).
pub const MAX_BUFFER_SIZE: usize = 1 << 31;

/// Position of a written value, in bytes from the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Offset(u32);

impl Offset {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Builder contract violations and capacity errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Operation not allowed while a table or vector is open.
    Nested { operation: &'static str },
    NotInObject { operation: &'static str },
    NotInVector,
    SlotOutOfRange { slot: usize, slots: usize },
    /// A struct must be written immediately before it is slotted.
    StructNotInline { expected: u32, actual: usize },
    /// Offset refers to a position not yet written.
    ForwardOffset { target: u32, current: usize },
    TableTooLarge { size: usize },
    BufferTooLarge { requested: usize },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Nested { operation } => {
                write!(f, "{} called while a table or vector is open", operation)
            }
            BuildError::NotInObject { operation } => {
                write!(f, "{} called outside of a table", operation)
            }
            BuildError::NotInVector => write!(f, "end_vector called without start_vector"),
            BuildError::SlotOutOfRange { slot, slots } => {
                write!(f, "slot {} out of range for table with {} slots", slot, slots)
            }
            BuildError::StructNotInline { expected, actual } => write!(
                f,
                "struct at offset {} must be written inline (current offset {})",
                expected, actual
            ),
            BuildError::ForwardOffset { target, current } => write!(
                f,
                "offset {} points past the written region ({} bytes)",
                target, current
            ),
            BuildError::TableTooLarge { size } => {
                write!(f, "table of {} bytes exceeds the 64 KiB vtable limit", size)
            }
            BuildError::BufferTooLarge { requested } => write!(
                f,
                "buffer of {} bytes exceeds the {} byte limit",
                requested, MAX_BUFFER_SIZE
            ),
        }
    }
}

impl std::error::Error for BuildError {}

/// Result type for builder operations.
pub type BuildResult<T> = Result<T, BuildError>;
