// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Crate-level error type.

use std::fmt;

use crate::buffer::BuildError;
use crate::de::{DecodeError, ReadError};
use crate::model::ModelError;
use crate::ser::SerializeError;

/// Any failure surfaced by [`FlatBufferSerializer`](crate::FlatBufferSerializer).
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Model(ModelError),
    Serialize(SerializeError),
    Decode(DecodeError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Model(e) => write!(f, "model: {}", e),
            Error::Serialize(e) => write!(f, "serialize: {}", e),
            Error::Decode(e) => write!(f, "decode: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Model(e) => Some(e),
            Error::Serialize(e) => Some(e),
            Error::Decode(e) => Some(e),
        }
    }
}

impl From<ModelError> for Error {
    fn from(e: ModelError) -> Self {
        Error::Model(e)
    }
}

impl From<SerializeError> for Error {
    fn from(e: SerializeError) -> Self {
        match e {
            SerializeError::Model(inner) => Error::Model(inner),
            other => Error::Serialize(other),
        }
    }
}

impl From<BuildError> for Error {
    fn from(e: BuildError) -> Self {
        Error::Serialize(SerializeError::Build(e))
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Error::Decode(e)
    }
}

impl From<ReadError> for Error {
    fn from(e: ReadError) -> Self {
        Error::Decode(DecodeError::Read(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_are_not_wrapped_twice() {
        let inner = ModelError::RecursiveType { type_name: "Node" };
        let e: Error = SerializeError::Model(inner.clone()).into();
        assert_eq!(e, Error::Model(inner));
    }

    #[test]
    fn read_errors_surface_as_decode() {
        let e: Error = ReadError::DepthExceeded { max_depth: 2 }.into();
        assert!(matches!(e, Error::Decode(DecodeError::Read(_))));
        assert!(e.to_string().starts_with("decode: "));
    }
}
