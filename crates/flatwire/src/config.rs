// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serializer and reader configuration.

use crate::buffer::{FlatBufferBuilder, FILE_IDENTIFIER_LENGTH};

/// Default initial buffer capacity in bytes.
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

/// Default limit on nested table/struct depth when reading.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Encode-side configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerConfig {
    /// Capacity the builder starts with; it grows as needed.
    pub initial_capacity: usize,
    /// Write table scalars even when they equal their default.
    pub force_defaults: bool,
    /// Identifier written after the root offset.
    pub file_identifier: Option<[u8; FILE_IDENTIFIER_LENGTH]>,
    /// Prefix the buffer with its length.
    pub size_prefixed: bool,
    /// Depth limit used when decoding through the same serializer.
    pub max_depth: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            force_defaults: false,
            file_identifier: None,
            size_prefixed: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SerializerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    #[must_use]
    pub fn force_defaults(mut self, force: bool) -> Self {
        self.force_defaults = force;
        self
    }

    #[must_use]
    pub fn file_identifier(mut self, identifier: [u8; FILE_IDENTIFIER_LENGTH]) -> Self {
        self.file_identifier = Some(identifier);
        self
    }

    #[must_use]
    pub fn size_prefixed(mut self, size_prefixed: bool) -> Self {
        self.size_prefixed = size_prefixed;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Fresh builder configured for this serializer.
    pub fn builder(&self) -> FlatBufferBuilder {
        let mut builder = FlatBufferBuilder::with_capacity(self.initial_capacity);
        builder.set_force_defaults(self.force_defaults);
        builder
    }

    /// Reader options matching what this configuration writes.
    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            max_depth: self.max_depth,
            file_identifier: self.file_identifier,
            size_prefixed: self.size_prefixed,
        }
    }
}

/// Decode-side configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    pub max_depth: usize,
    /// When set, the buffer must carry this identifier.
    pub file_identifier: Option<[u8; FILE_IDENTIFIER_LENGTH]>,
    pub size_prefixed: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            file_identifier: None,
            size_prefixed: false,
        }
    }
}
