// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked table, vector and string access.

use super::ReadError;
use crate::buffer::{SIZE_UOFFSET, SIZE_VOFFSET};
use crate::model::{BaseType, Scalar};

fn slice_at(buf: &[u8], pos: usize, len: usize) -> Result<&[u8], ReadError> {
    pos.checked_add(len)
        .and_then(|end| buf.get(pos..end))
        .ok_or(ReadError::OutOfBounds {
            offset: pos,
            len,
            buffer_len: buf.len(),
        })
}

/// Generate a little-endian scalar reader at an absolute position.
macro_rules! impl_read_le {
    ($name:ident, $ty:ty) => {
        pub fn $name(buf: &[u8], pos: usize) -> Result<$ty, ReadError> {
            const SIZE: usize = std::mem::size_of::<$ty>();
            let mut raw = [0u8; SIZE];
            raw.copy_from_slice(slice_at(buf, pos, SIZE)?);
            Ok(<$ty>::from_le_bytes(raw))
        }
    };
}

impl_read_le!(read_i8, i8);
impl_read_le!(read_u8, u8);
impl_read_le!(read_i16, i16);
impl_read_le!(read_u16, u16);
impl_read_le!(read_i32, i32);
impl_read_le!(read_u32, u32);
impl_read_le!(read_i64, i64);
impl_read_le!(read_u64, u64);
impl_read_le!(read_f32, f32);
impl_read_le!(read_f64, f64);

/// Read a scalar of kind `base` at `pos`.
pub fn read_scalar(buf: &[u8], pos: usize, base: BaseType) -> Result<Scalar, ReadError> {
    Ok(match base {
        BaseType::Bool => Scalar::Bool(read_u8(buf, pos)? != 0),
        BaseType::Char => Scalar::Char(read_i8(buf, pos)?),
        BaseType::UChar => Scalar::UChar(read_u8(buf, pos)?),
        BaseType::Short => Scalar::Short(read_i16(buf, pos)?),
        BaseType::UShort => Scalar::UShort(read_u16(buf, pos)?),
        BaseType::Int => Scalar::Int(read_i32(buf, pos)?),
        BaseType::UInt => Scalar::UInt(read_u32(buf, pos)?),
        BaseType::Long => Scalar::Long(read_i64(buf, pos)?),
        BaseType::ULong => Scalar::ULong(read_u64(buf, pos)?),
        BaseType::Float => Scalar::Float(read_f32(buf, pos)?),
        BaseType::Double => Scalar::Double(read_f64(buf, pos)?),
        BaseType::String | BaseType::Vector | BaseType::Struct | BaseType::Union => {
            return Err(ReadError::NotScalar { base_type: base })
        }
    })
}

/// Follow the unsigned offset stored at `pos` to the position it targets.
pub fn follow_uoffset(buf: &[u8], pos: usize) -> Result<usize, ReadError> {
    let rel = read_u32(buf, pos)? as usize;
    pos.checked_add(rel)
        .filter(|&target| target < buf.len())
        .ok_or(ReadError::OutOfBounds {
            offset: pos,
            len: rel,
            buffer_len: buf.len(),
        })
}

/// Read the string whose length prefix is at `pos`.
pub fn read_string(buf: &[u8], pos: usize) -> Result<&str, ReadError> {
    let len = read_u32(buf, pos)? as usize;
    let start = pos + SIZE_UOFFSET;
    let bytes = slice_at(buf, start, len)?;
    if buf.get(start + len) != Some(&0) {
        return Err(ReadError::MissingNul { offset: pos });
    }
    std::str::from_utf8(bytes).map_err(|_| ReadError::InvalidUtf8 { offset: pos })
}

/// View of one table.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    buf: &'a [u8],
    pos: usize,
    vtable: usize,
    vtable_len: usize,
    table_len: usize,
}

impl<'a> Table<'a> {
    /// Table starting at absolute position `pos`.
    pub fn new(buf: &'a [u8], pos: usize) -> Result<Self, ReadError> {
        let soffset = read_i32(buf, pos)?;
        let bad = |reason| ReadError::BadVtable { table: pos, reason };

        let vtable = usize::try_from(pos as i64 - i64::from(soffset))
            .map_err(|_| bad("vtable before buffer start"))?;
        let vtable_len = usize::from(read_u16(buf, vtable)?);
        let table_len = usize::from(read_u16(buf, vtable + SIZE_VOFFSET)?);

        if vtable_len < 2 * SIZE_VOFFSET || vtable_len % SIZE_VOFFSET != 0 {
            return Err(bad("vtable size"));
        }
        slice_at(buf, vtable, vtable_len)?;
        if table_len < SIZE_UOFFSET {
            return Err(bad("table size"));
        }
        slice_at(buf, pos, table_len)?;

        Ok(Self {
            buf,
            pos,
            vtable,
            vtable_len,
            table_len,
        })
    }

    /// Root table of a finished buffer.
    pub fn root(buf: &'a [u8]) -> Result<Self, ReadError> {
        Self::root_at(buf, 0)
    }

    /// Root table whose offset is stored at `start` (4 for size-prefixed
    /// buffers).
    pub fn root_at(buf: &'a [u8], start: usize) -> Result<Self, ReadError> {
        Self::new(buf, follow_uoffset(buf, start)?)
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn vtable_position(&self) -> usize {
        self.vtable
    }

    /// Number of slots recorded in the vtable (trailing absent slots are
    /// trimmed by writers).
    pub fn slot_count(&self) -> usize {
        (self.vtable_len - 2 * SIZE_VOFFSET) / SIZE_VOFFSET
    }

    /// Absolute position of the field in `slot`, `None` when absent.
    pub fn field_position(&self, slot: usize) -> Result<Option<usize>, ReadError> {
        if slot >= self.slot_count() {
            return Ok(None);
        }
        let entry = self.vtable + 2 * SIZE_VOFFSET + slot * SIZE_VOFFSET;
        let off = usize::from(read_u16(self.buf, entry)?);
        if off == 0 {
            return Ok(None);
        }
        if off >= self.table_len {
            return Err(ReadError::BadVtable {
                table: self.pos,
                reason: "field offset outside table",
            });
        }
        Ok(Some(self.pos + off))
    }

    pub fn get_scalar(&self, slot: usize, base: BaseType) -> Result<Option<Scalar>, ReadError> {
        match self.field_position(slot)? {
            Some(pos) => read_scalar(self.buf, pos, base).map(Some),
            None => Ok(None),
        }
    }

    /// Position of an inline struct field.
    pub fn get_struct(&self, slot: usize) -> Result<Option<usize>, ReadError> {
        self.field_position(slot)
    }

    fn indirect(&self, slot: usize) -> Result<Option<usize>, ReadError> {
        match self.field_position(slot)? {
            Some(pos) => follow_uoffset(self.buf, pos).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_string(&self, slot: usize) -> Result<Option<&'a str>, ReadError> {
        match self.indirect(slot)? {
            Some(pos) => read_string(self.buf, pos).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_vector(&self, slot: usize) -> Result<Option<VectorRef<'a>>, ReadError> {
        match self.indirect(slot)? {
            Some(pos) => VectorRef::new(self.buf, pos).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_table(&self, slot: usize) -> Result<Option<Table<'a>>, ReadError> {
        match self.indirect(slot)? {
            Some(pos) => Table::new(self.buf, pos).map(Some),
            None => Ok(None),
        }
    }
}

/// View of a vector: a u32 length followed by inline elements.
#[derive(Debug, Clone, Copy)]
pub struct VectorRef<'a> {
    buf: &'a [u8],
    start: usize,
    len: usize,
}

impl<'a> VectorRef<'a> {
    /// Vector whose length prefix is at `pos`.
    pub fn new(buf: &'a [u8], pos: usize) -> Result<Self, ReadError> {
        let len = read_u32(buf, pos)? as usize;
        Ok(Self {
            buf,
            start: pos + SIZE_UOFFSET,
            len,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element bytes for elements of `elem_size` bytes, checked against the
    /// buffer end.
    pub fn bytes(&self, elem_size: usize) -> Result<&'a [u8], ReadError> {
        let total = self
            .len
            .checked_mul(elem_size)
            .ok_or(ReadError::OutOfBounds {
                offset: self.start,
                len: usize::MAX,
                buffer_len: self.buf.len(),
            })?;
        slice_at(self.buf, self.start, total)
    }

    /// Absolute position of element `index`.
    pub fn element_position(&self, index: usize, elem_size: usize) -> usize {
        self.start + index * elem_size
    }

    pub fn get_scalar(&self, index: usize, base: BaseType) -> Result<Scalar, ReadError> {
        let size = base
            .scalar_size()
            .ok_or(ReadError::NotScalar { base_type: base })?;
        if index >= self.len {
            return Err(ReadError::OutOfBounds {
                offset: self.start,
                len: index.saturating_add(1).saturating_mul(size),
                buffer_len: self.buf.len(),
            });
        }
        read_scalar(self.buf, self.element_position(index, size), base)
    }
}
