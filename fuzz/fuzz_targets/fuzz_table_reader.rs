// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use flatwire::de::Table;
use flatwire::BaseType;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(table) = Table::root(data) else {
        return;
    };

    // Probe every slot the vtable claims with every accessor
    for slot in 0..table.slot_count().min(64) {
        let _ = table.get_scalar(slot, BaseType::ULong);
        let _ = table.get_string(slot);
        if let Ok(Some(vector)) = table.get_vector(slot) {
            let _ = vector.bytes(4);
            let _ = vector.get_scalar(0, BaseType::Int);
        }
        if let Ok(Some(nested)) = table.get_table(slot) {
            let _ = nested.field_position(0);
        }
    }
});
