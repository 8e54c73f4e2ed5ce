// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema shapes shared by the integration tests.

#![allow(dead_code)]

use std::rc::Rc;

use flatwire::Flat;

#[derive(Debug, Default, Clone, Copy, PartialEq, Flat)]
#[flat(fixed)]
pub struct TestStruct1 {
    pub int_prop: i32,
    pub byte_prop: u8,
    pub short_prop: i16,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Flat)]
#[flat(fixed)]
pub struct TestStruct2 {
    pub int_prop: i32,
    pub struct_prop: TestStruct1,
}

#[derive(Debug, Default, Clone, PartialEq, Flat)]
pub struct TestTable1 {
    pub int_prop: i32,
    pub byte_prop: u8,
    pub short_prop: i16,
}

#[derive(Debug, Clone, PartialEq, Flat)]
pub struct TestTableWithDefaults {
    #[flat(default = 24)]
    pub int_prop: i32,
    #[flat(default = 8)]
    pub byte_prop: u8,
    #[flat(default = 1024)]
    pub short_prop: i16,
}

impl Default for TestTableWithDefaults {
    fn default() -> Self {
        Self {
            int_prop: 24,
            byte_prop: 8,
            short_prop: 1024,
        }
    }
}

/// Vtable slots differ from declaration order: byte, short, int.
#[derive(Debug, Default, Clone, PartialEq, Flat)]
pub struct TestTableWithUserOrdering {
    #[flat(id = 2)]
    pub int_prop: i32,
    #[flat(id = 0)]
    pub byte_prop: u8,
    #[flat(id = 1)]
    pub short_prop: i16,
}

#[derive(Debug, Default, Clone, PartialEq, Flat)]
pub struct TestTableWithOriginalOrdering {
    pub int_prop: i32,
    pub byte_prop: u8,
    pub short_prop: i16,
}

#[derive(Debug, Default, Clone, PartialEq, Flat)]
pub struct TestTable2 {
    pub string_prop: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Flat)]
#[repr(u8)]
pub enum TestEnum {
    #[default]
    Apple,
    Orange,
    Pear = 7,
}

#[derive(Debug, Default, Clone, PartialEq, Flat)]
pub struct TestTable3 {
    pub bool_prop: bool,
    pub long_prop: i64,
    pub sbyte_prop: i8,
    pub ushort_prop: u16,
    pub ulong_prop: u64,
    pub enum_prop: TestEnum,
    pub float_prop: f32,
    pub double_prop: f64,
}

#[derive(Debug, Default, Clone, PartialEq, Flat)]
pub struct TestTableWithArray {
    pub int_array: Box<[i32]>,
    pub int_list: Vec<i32>,
}

#[derive(Debug, Default, Clone, PartialEq, Flat)]
pub struct TestTableWithStruct {
    pub struct_prop: TestStruct1,
    pub int_prop: i32,
}

#[derive(Debug, Default, Clone, PartialEq, Flat)]
pub struct TestTableWithTable {
    pub table_prop: Option<Rc<TestTable1>>,
    pub int_prop: i32,
}

#[derive(Debug, Default, Clone, PartialEq, Flat)]
pub struct TestTableWithArrayOfStructs {
    pub struct_array: Vec<TestStruct1>,
}

/// Vtable offset of a slot, as used by the `flatbuffers` crate.
pub const fn voffset(slot: u16) -> u16 {
    4 + 2 * slot
}
