// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use flatwire::{Flat, FlatBufferSerializer};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Default, Flat)]
#[flat(fixed)]
struct Point {
    x: i32,
    y: u8,
    z: i16,
}

#[derive(Debug, Default, Flat)]
struct Leaf {
    id: u64,
    label: Option<String>,
}

#[derive(Debug, Default, Flat)]
struct Root {
    flag: bool,
    #[flat(default = 3)]
    level: i32,
    name: String,
    ints: Vec<i32>,
    points: Vec<Point>,
    origin: Point,
    leaf: Option<Leaf>,
}

fuzz_target!(|data: &[u8]| {
    let serializer = FlatBufferSerializer::new();

    // Arbitrary bytes must decode or fail cleanly, never panic
    let _ = serializer.decode_dynamic::<Root>(data);
    let _ = serializer.deserialize::<Root>(data);
    let _ = serializer.deserialize::<Point>(data);
});
