// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{
    BuildError, BuildResult, Offset, FILE_IDENTIFIER_LENGTH, MAX_BUFFER_SIZE, SIZE_SOFFSET,
    SIZE_UOFFSET, SIZE_VOFFSET,
};
use crate::model::Scalar;

/// Initial capacity used by [`FlatBufferBuilder::new`].
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nesting {
    None,
    Object,
    Vector,
}

/// Generate the three write flavours for a little-endian scalar:
///
/// - `put_*`: write at the current position, no alignment
/// - `add_*`: align to the scalar's size, then write
/// - `add_*_slot`: skip when equal to the default (unless forced), otherwise
///   write and record the vtable slot of the open table
macro_rules! impl_write_scalar {
    ($put:ident, $add:ident, $slot:ident, $ty:ty) => {
        pub fn $put(&mut self, value: $ty) -> BuildResult<()> {
            self.put_bytes(&value.to_le_bytes())
        }

        pub fn $add(&mut self, value: $ty) -> BuildResult<()> {
            self.prep(std::mem::size_of::<$ty>(), 0)?;
            self.$put(value)
        }

        pub fn $slot(&mut self, slot: usize, value: $ty, default: $ty) -> BuildResult<()> {
            self.check_slot(slot, stringify!($slot))?;
            if value.to_le_bytes() == default.to_le_bytes() && !self.force_defaults {
                return Ok(());
            }
            self.$add(value)?;
            self.track_slot(slot);
            Ok(())
        }
    };
}

/// Builds a FlatBuffer from the back to the front.
///
/// Children are written before their parents: strings, vectors and nested
/// tables first, then the table that references them, and finally the root
/// offset via [`finish`](Self::finish). Only one table or vector may be open
/// at a time.
#[derive(Debug)]
pub struct FlatBufferBuilder {
    buf: Vec<u8>,
    /// Free bytes at the front of `buf`; data occupies `buf[space..]`.
    space: usize,
    min_align: usize,
    /// Offsets of the open table's fields, one per slot; 0 = absent.
    vtable: Vec<usize>,
    object_start: usize,
    /// Offsets of every vtable written so far, for deduplication.
    vtables: Vec<usize>,
    nesting: Nesting,
    vector_num_elems: usize,
    force_defaults: bool,
    finished: bool,
}

impl Default for FlatBufferBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FlatBufferBuilder {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_BUFFER_SIZE);
        Self {
            buf: vec![0; capacity],
            space: capacity,
            min_align: 1,
            vtable: Vec::new(),
            object_start: 0,
            vtables: Vec::new(),
            nesting: Nesting::None,
            vector_num_elems: 0,
            force_defaults: false,
            finished: false,
        }
    }

    /// Bytes written so far.
    pub fn offset(&self) -> usize {
        self.buf.len() - self.space
    }

    /// Offset of the most recently written value.
    pub fn current_offset(&self) -> Offset {
        to_offset(self.offset())
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Largest alignment requested so far.
    pub fn min_align(&self) -> usize {
        self.min_align
    }

    /// When set, slotted scalars equal to their default are still written.
    pub fn force_defaults(&self) -> bool {
        self.force_defaults
    }

    pub fn set_force_defaults(&mut self, force: bool) {
        self.force_defaults = force;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Discard everything written, keeping the allocation.
    pub fn reset(&mut self) {
        self.buf.fill(0);
        self.space = self.buf.len();
        self.min_align = 1;
        self.vtable.clear();
        self.object_start = 0;
        self.vtables.clear();
        self.nesting = Nesting::None;
        self.vector_num_elems = 0;
        self.finished = false;
    }

    fn grow(&mut self) -> BuildResult<()> {
        let old_len = self.buf.len();
        let new_len = if old_len == 0 { 1 } else { old_len * 2 };
        if new_len > MAX_BUFFER_SIZE {
            return Err(BuildError::BufferTooLarge { requested: new_len });
        }
        let mut grown = vec![0u8; new_len];
        grown[new_len - old_len..].copy_from_slice(&self.buf);
        self.buf = grown;
        self.space += new_len - old_len;
        log::trace!("[builder] grew buffer {} -> {} bytes", old_len, new_len);
        Ok(())
    }

    fn ensure_space(&mut self, needed: usize) -> BuildResult<()> {
        while self.space < needed {
            self.grow()?;
        }
        Ok(())
    }

    /// Write `count` zero bytes.
    pub fn pad(&mut self, count: usize) -> BuildResult<()> {
        self.ensure_space(count)?;
        self.buf[self.space - count..self.space].fill(0);
        self.space -= count;
        Ok(())
    }

    /// Prepare to write a value of `size` bytes after `additional_bytes` more
    /// bytes have been written: grow if needed and pad so that the value ends
    /// up aligned to `size`.
    pub fn prep(&mut self, size: usize, additional_bytes: usize) -> BuildResult<()> {
        if size > self.min_align {
            self.min_align = size;
        }
        let align_size = padding_for(self.offset() + additional_bytes, size);
        let needed = align_size
            .checked_add(size)
            .and_then(|n| n.checked_add(additional_bytes))
            .ok_or(BuildError::BufferTooLarge {
                requested: usize::MAX,
            })?;
        self.ensure_space(needed)?;
        self.pad(align_size)
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> BuildResult<()> {
        self.ensure_space(bytes.len())?;
        self.space -= bytes.len();
        self.buf[self.space..self.space + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    impl_write_scalar!(put_i8, add_i8, add_i8_slot, i8);
    impl_write_scalar!(put_u8, add_u8, add_u8_slot, u8);
    impl_write_scalar!(put_i16, add_i16, add_i16_slot, i16);
    impl_write_scalar!(put_u16, add_u16, add_u16_slot, u16);
    impl_write_scalar!(put_i32, add_i32, add_i32_slot, i32);
    impl_write_scalar!(put_u32, add_u32, add_u32_slot, u32);
    impl_write_scalar!(put_i64, add_i64, add_i64_slot, i64);
    impl_write_scalar!(put_u64, add_u64, add_u64_slot, u64);
    impl_write_scalar!(put_f32, add_f32, add_f32_slot, f32);
    impl_write_scalar!(put_f64, add_f64, add_f64_slot, f64);

    pub fn put_bool(&mut self, value: bool) -> BuildResult<()> {
        self.put_u8(u8::from(value))
    }

    pub fn add_bool(&mut self, value: bool) -> BuildResult<()> {
        self.add_u8(u8::from(value))
    }

    pub fn add_bool_slot(&mut self, slot: usize, value: bool, default: bool) -> BuildResult<()> {
        self.add_u8_slot(slot, u8::from(value), u8::from(default))
    }

    /// Align for and write any scalar.
    pub fn add_scalar(&mut self, value: Scalar) -> BuildResult<()> {
        match value {
            Scalar::Bool(v) => self.add_bool(v),
            Scalar::Char(v) => self.add_i8(v),
            Scalar::UChar(v) => self.add_u8(v),
            Scalar::Short(v) => self.add_i16(v),
            Scalar::UShort(v) => self.add_u16(v),
            Scalar::Int(v) => self.add_i32(v),
            Scalar::UInt(v) => self.add_u32(v),
            Scalar::Long(v) => self.add_i64(v),
            Scalar::ULong(v) => self.add_u64(v),
            Scalar::Float(v) => self.add_f32(v),
            Scalar::Double(v) => self.add_f64(v),
        }
    }

    /// Slotted [`add_scalar`](Self::add_scalar). Equality with `default` is
    /// bit-exact.
    pub fn add_scalar_slot(&mut self, slot: usize, value: Scalar, default: Scalar) -> BuildResult<()> {
        self.check_slot(slot, "add_scalar_slot")?;
        if value.same_bits(&default) && !self.force_defaults {
            return Ok(());
        }
        self.add_scalar_slot_always(slot, value)
    }

    /// Write a scalar into `slot` with no default comparison.
    pub fn add_scalar_slot_always(&mut self, slot: usize, value: Scalar) -> BuildResult<()> {
        self.check_slot(slot, "add_scalar_slot")?;
        self.add_scalar(value)?;
        self.track_slot(slot);
        Ok(())
    }

    /// Write an offset to an already written value, relative to where the
    /// offset itself lands.
    pub fn add_offset(&mut self, off: Offset) -> BuildResult<()> {
        self.prep(SIZE_UOFFSET, 0)?;
        let target = off.value() as usize;
        if target > self.offset() {
            return Err(BuildError::ForwardOffset {
                target: off.value(),
                current: self.offset(),
            });
        }
        let relative = self.offset() - target + SIZE_UOFFSET;
        self.put_u32(relative as u32)
    }

    /// Slotted [`add_offset`](Self::add_offset). A zero offset is skipped.
    pub fn add_offset_slot(&mut self, slot: usize, off: Offset) -> BuildResult<()> {
        if off.value() == 0 {
            return Ok(());
        }
        self.check_slot(slot, "add_offset_slot")?;
        self.add_offset(off)?;
        self.track_slot(slot);
        Ok(())
    }

    /// Record a struct that was just written inline as the value of `slot`.
    pub fn add_struct_slot(&mut self, slot: usize, off: Offset) -> BuildResult<()> {
        if off.value() == 0 {
            return Ok(());
        }
        self.check_slot(slot, "add_struct_slot")?;
        if off.value() as usize != self.offset() {
            return Err(BuildError::StructNotInline {
                expected: off.value(),
                actual: self.offset(),
            });
        }
        self.track_slot(slot);
        Ok(())
    }

    fn not_nested(&self, operation: &'static str) -> BuildResult<()> {
        if self.nesting != Nesting::None {
            return Err(BuildError::Nested { operation });
        }
        Ok(())
    }

    fn check_slot(&self, slot: usize, operation: &'static str) -> BuildResult<()> {
        if self.nesting != Nesting::Object {
            return Err(BuildError::NotInObject { operation });
        }
        if slot >= self.vtable.len() {
            return Err(BuildError::SlotOutOfRange {
                slot,
                slots: self.vtable.len(),
            });
        }
        Ok(())
    }

    fn track_slot(&mut self, slot: usize) {
        self.vtable[slot] = self.offset();
    }

    /// Open a table with `num_fields` vtable slots.
    pub fn start_object(&mut self, num_fields: usize) -> BuildResult<()> {
        self.not_nested("start_object")?;
        self.vtable.clear();
        self.vtable.resize(num_fields, 0);
        self.object_start = self.offset();
        self.nesting = Nesting::Object;
        Ok(())
    }

    /// Close the open table: write its vtable (or reuse an identical one)
    /// and return the table's offset.
    pub fn end_object(&mut self) -> BuildResult<Offset> {
        if self.nesting != Nesting::Object {
            return Err(BuildError::NotInObject {
                operation: "end_object",
            });
        }

        // placeholder for the vtable soffset, patched below
        self.add_i32(0)?;
        let vtable_loc = self.offset();
        let table_size = to_voffset(vtable_loc - self.object_start)?;

        let mut used = self.vtable.len();
        while used > 0 && self.vtable[used - 1] == 0 {
            used -= 1;
        }
        for i in (0..used).rev() {
            let field = self.vtable[i];
            let entry = if field == 0 {
                0
            } else {
                to_voffset(vtable_loc - field)?
            };
            self.add_u16(entry)?;
        }
        self.add_u16(table_size)?;
        let vtable_bytes = (used + 2) * SIZE_VOFFSET;
        self.add_u16(to_voffset(vtable_bytes)?)?;

        let new_vtable = self.space;
        let existing = self.vtables.iter().copied().find(|&vt_off| {
            let pos = self.buf.len() - vt_off;
            usize::from(self.read_u16(pos)) == vtable_bytes
                && self.buf[pos..pos + vtable_bytes]
                    == self.buf[new_vtable..new_vtable + vtable_bytes]
        });

        let vt_off = match existing {
            Some(vt_off) => {
                // drop the vtable just written
                self.space = self.buf.len() - vtable_loc;
                vt_off
            }
            None => {
                let vt_off = self.offset();
                self.vtables.push(vt_off);
                vt_off
            }
        };

        let soffset = i32::try_from(vt_off as i64 - vtable_loc as i64).map_err(|_| {
            BuildError::BufferTooLarge {
                requested: vt_off.max(vtable_loc),
            }
        })?;
        let table_pos = self.buf.len() - vtable_loc;
        self.buf[table_pos..table_pos + SIZE_SOFFSET].copy_from_slice(&soffset.to_le_bytes());

        log::trace!(
            "[builder] end_object at {} ({} slots, vtable {})",
            vtable_loc,
            used,
            if existing.is_some() { "shared" } else { "new" }
        );

        self.vtable.clear();
        self.nesting = Nesting::None;
        Ok(to_offset(vtable_loc))
    }

    fn read_u16(&self, pos: usize) -> u16 {
        u16::from_le_bytes([self.buf[pos], self.buf[pos + 1]])
    }

    /// Open a vector of `num_elems` elements of `elem_size` bytes, aligned
    /// to `alignment`. Elements are then written last to first.
    pub fn start_vector(
        &mut self,
        elem_size: usize,
        num_elems: usize,
        alignment: usize,
    ) -> BuildResult<()> {
        self.not_nested("start_vector")?;
        let bytes = elem_size
            .checked_mul(num_elems)
            .filter(|&b| b <= MAX_BUFFER_SIZE)
            .ok_or(BuildError::BufferTooLarge {
                requested: usize::MAX,
            })?;
        self.vector_num_elems = num_elems;
        self.prep(SIZE_UOFFSET, bytes)?;
        self.prep(alignment, bytes)?;
        self.nesting = Nesting::Vector;
        Ok(())
    }

    /// Close the open vector by writing its length prefix.
    pub fn end_vector(&mut self) -> BuildResult<Offset> {
        if self.nesting != Nesting::Vector {
            return Err(BuildError::NotInVector);
        }
        self.nesting = Nesting::None;
        self.put_u32(self.vector_num_elems as u32)?;
        Ok(self.current_offset())
    }

    /// Write a NUL-terminated UTF-8 string.
    pub fn create_string(&mut self, s: &str) -> BuildResult<Offset> {
        self.create_byte_string(s.as_bytes())
    }

    /// Write a NUL-terminated byte string.
    pub fn create_byte_string(&mut self, bytes: &[u8]) -> BuildResult<Offset> {
        self.not_nested("create_string")?;
        self.add_u8(0)?;
        self.start_vector(1, bytes.len(), 1)?;
        self.put_bytes(bytes)?;
        self.end_vector()
    }

    /// Write the root offset. The buffer is complete afterwards.
    pub fn finish(&mut self, root: Offset) -> BuildResult<()> {
        self.finish_with(root, None, false)
    }

    /// Like [`finish`](Self::finish), with a 4-byte file identifier after
    /// the root offset.
    pub fn finish_with_identifier(
        &mut self,
        root: Offset,
        identifier: &[u8; FILE_IDENTIFIER_LENGTH],
    ) -> BuildResult<()> {
        self.finish_with(root, Some(identifier), false)
    }

    /// Like [`finish`](Self::finish), prefixed with the buffer length.
    pub fn finish_size_prefixed(
        &mut self,
        root: Offset,
        identifier: Option<&[u8; FILE_IDENTIFIER_LENGTH]>,
    ) -> BuildResult<()> {
        self.finish_with(root, identifier, true)
    }

    fn finish_with(
        &mut self,
        root: Offset,
        identifier: Option<&[u8; FILE_IDENTIFIER_LENGTH]>,
        size_prefixed: bool,
    ) -> BuildResult<()> {
        self.not_nested("finish")?;
        let mut extra = SIZE_UOFFSET;
        if size_prefixed {
            extra += SIZE_UOFFSET;
        }
        if identifier.is_some() {
            extra += FILE_IDENTIFIER_LENGTH;
        }
        self.prep(self.min_align, extra)?;
        if let Some(identifier) = identifier {
            self.put_bytes(identifier)?;
        }
        self.add_offset(root)?;
        if size_prefixed {
            let size = self.offset() as u32;
            self.add_u32(size)?;
        }
        self.finished = true;
        log::debug!("[builder] finished buffer of {} bytes", self.offset());
        Ok(())
    }

    /// The written bytes, from the first byte of the buffer to the end.
    pub fn finished_data(&self) -> &[u8] {
        &self.buf[self.space..]
    }

    pub fn into_vec(self) -> Vec<u8> {
        let mut buf = self.buf;
        buf.drain(..self.space);
        buf
    }
}

/// Bytes of padding that bring `len` up to a multiple of `align`.
fn padding_for(len: usize, align: usize) -> usize {
    if align <= 1 {
        return 0;
    }
    (align - len % align) % align
}

fn to_offset(pos: usize) -> Offset {
    Offset(pos as u32)
}

fn to_voffset(value: usize) -> BuildResult<u16> {
    u16::try_from(value).map_err(|_| BuildError::TableTooLarge { size: value })
}
