// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # flatwire
//!
//! Model-driven FlatBuffers serialization without generated schema code.
//!
//! A type opts in with `#[derive(Flat)]`; its layout (a table by default, a
//! fixed struct with `#[flat(fixed)]`) is described by a [`TypeModel`] built
//! once and cached in a [`TypeModelRegistry`]. The [`FlatBufferSerializer`]
//! walks an instance against its model and writes a standard FlatBuffer that
//! any FlatBuffers reader can consume.
//!
//! ## Quick Start
//!
//! ```
//! use flatwire::{Flat, FlatBufferSerializer};
//!
//! #[derive(Debug, Default, PartialEq, Flat)]
//! #[flat(fixed)]
//! struct Vec3 {
//!     x: f32,
//!     y: f32,
//!     z: f32,
//! }
//!
//! #[derive(Debug, Default, PartialEq, Flat)]
//! struct Monster {
//!     pos: Vec3,
//!     #[flat(default = 150)]
//!     mana: i16,
//!     name: Option<String>,
//!     inventory: Vec<u8>,
//! }
//!
//! let serializer = FlatBufferSerializer::new();
//! let orc = Monster {
//!     pos: Vec3 { x: 1.0, y: 2.0, z: 3.0 },
//!     mana: 150,
//!     name: Some("Orc".to_string()),
//!     inventory: vec![0, 1, 2],
//! };
//!
//! let bytes = serializer.serialize(&orc).unwrap();
//! let back: Monster = serializer.deserialize(&bytes).unwrap();
//! assert_eq!(back, orc);
//! ```
//!
//! ## Modules
//!
//! - [`model`]: type models, field descriptors, the model registry
//! - [`buffer`]: the low-level back-to-front buffer builder
//! - [`ser`]: the per-call serialization context
//! - [`de`]: bounds-checked buffer reading and model-driven decoding
//! - [`config`]: serializer and reader settings

// Lets `#[derive(Flat)]` output name `::flatwire` inside this crate too.
extern crate self as flatwire;

pub mod buffer;
pub mod config;
pub mod de;
pub mod error;
pub mod model;
pub mod ser;
mod serializer;

pub use buffer::{BuildError, FlatBufferBuilder, Offset};
pub use config::{ReaderOptions, SerializerConfig};
pub use de::{DecodeError, ReadError};
pub use error::{Error, Result};
pub use model::{
    decode_object, BaseType, FieldAccessor, FieldDescriptor, FieldSpec, Flat, ModelContext,
    ModelError, OwnedValue, Scalar, StructDefBuilder, TypeModel, TypeModelRegistry, Value,
};
pub use ser::{SerializationContext, SerializeError};
pub use serializer::FlatBufferSerializer;

/// Derive [`Flat`] for a struct with named fields or a fieldless enum.
///
/// Container attributes: `#[flat(table)]` (default) or `#[flat(fixed)]`.
/// Field attributes: `#[flat(id = N)]` for an explicit vtable slot and
/// `#[flat(default = expr)]` for a scalar default.
pub use flatwire_codegen::Flat;
