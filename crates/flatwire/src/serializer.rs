// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed entry point tying the registry, the serialization context and the
//! reader together.

use std::sync::Arc;

use crate::config::SerializerConfig;
use crate::de::decode_value;
use crate::error::Result;
use crate::model::{Flat, OwnedValue, TypeModel, TypeModelRegistry, Value};
use crate::ser::{SerializationContext, SerializeError};

/// Serializes and deserializes [`Flat`] values.
///
/// Cheap to clone: clones share the model registry. Each call builds its own
/// buffer, so one serializer can be used from several threads at once.
#[derive(Clone, Default)]
pub struct FlatBufferSerializer {
    registry: Arc<TypeModelRegistry>,
    config: SerializerConfig,
}

impl FlatBufferSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self {
            registry: Arc::new(TypeModelRegistry::new()),
            config,
        }
    }

    /// Use an existing registry, e.g. one shared with other serializers.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<TypeModelRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &Arc<TypeModelRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    pub fn type_model<T: Flat>(&self) -> Result<Arc<TypeModel>> {
        Ok(self.registry.get_type_model::<T>()?)
    }

    /// Encode `value` as a finished buffer. `T` must model a table or a fixed
    /// struct; `Option`, `Box`, `Rc` and `Arc` around one are accepted.
    pub fn serialize<T: Flat>(&self, value: &T) -> Result<Vec<u8>> {
        let model = self.type_model::<T>()?;
        let root = match value.as_value() {
            Value::Object(root) if model.struct_def().is_some() => root,
            other => {
                return Err(SerializeError::UnsupportedRoot {
                    type_name: format!("{} ({})", model.name(), other.kind_name()),
                }
                .into())
            }
        };

        log::debug!("[ser] serializing root '{}'", model.name());
        let builder = SerializationContext::new(root, model, self.config.builder())
            .with_file_identifier(self.config.file_identifier)
            .with_size_prefix(self.config.size_prefixed)
            .serialize()?;
        Ok(builder.into_vec())
    }

    /// Decode `buf` into the untyped value tree of `T`'s model.
    pub fn decode_dynamic<T: Flat>(&self, buf: &[u8]) -> Result<OwnedValue> {
        let model = self.type_model::<T>()?;
        Ok(decode_value(buf, &model, &self.config.reader_options())?)
    }

    pub fn deserialize<T: Flat>(&self, buf: &[u8]) -> Result<T> {
        let value = self.decode_dynamic::<T>(buf)?;
        Ok(T::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::Flat;
    use std::rc::Rc;

    #[derive(Debug, Default, PartialEq, Flat)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn scalar_roots_are_rejected() {
        let serializer = FlatBufferSerializer::new();
        let err = serializer.serialize(&7i32).unwrap_err();
        assert!(matches!(
            err,
            Error::Serialize(SerializeError::UnsupportedRoot { .. })
        ));
    }

    #[test]
    fn null_roots_are_rejected() {
        let serializer = FlatBufferSerializer::new();
        let err = serializer.serialize(&None::<Point>).unwrap_err();
        assert!(matches!(
            err,
            Error::Serialize(SerializeError::UnsupportedRoot { .. })
        ));
    }

    #[test]
    fn wrapped_roots_serialize_like_the_inner_value() {
        let serializer = FlatBufferSerializer::new();
        let point = Point { x: 3, y: -4 };
        let plain = serializer.serialize(&point).unwrap();
        let shared = serializer.serialize(&Rc::new(Point { x: 3, y: -4 })).unwrap();
        assert_eq!(plain, shared);

        let back: Rc<Point> = serializer.deserialize(&shared).unwrap();
        assert_eq!(*back, point);
    }

    #[test]
    fn clones_share_the_registry() {
        let serializer = FlatBufferSerializer::new();
        let other = serializer.clone();
        serializer.type_model::<Point>().unwrap();
        assert!(other.registry().contains::<Point>());
    }

    #[test]
    fn identifier_and_prefix_are_checked_on_read() {
        let config = SerializerConfig::new()
            .file_identifier(*b"PNT0")
            .size_prefixed(true);
        let serializer = FlatBufferSerializer::with_config(config);
        let bytes = serializer.serialize(&Point { x: 1, y: 2 }).unwrap();
        assert_eq!(&bytes[8..12], b"PNT0");
        assert_eq!(
            u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize,
            bytes.len() - 4
        );
        let back: Point = serializer.deserialize(&bytes).unwrap();
        assert_eq!(back, Point { x: 1, y: 2 });

        let plain = FlatBufferSerializer::new()
            .serialize(&Point { x: 1, y: 2 })
            .unwrap();
        let err = serializer.deserialize::<Point>(&plain).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
