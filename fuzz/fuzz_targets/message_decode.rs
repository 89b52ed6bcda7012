//! Fuzz target for decode_message
//!
//! Feeds arbitrary text through the full hex -> bitmap -> field pipeline
//! with a table covering mixed attributes and length modes. Invalid input
//! must always surface as an error value, never a panic.

#![no_main]

use isoforge_codec::{decode_message, Align, FieldAttr, FieldSpec, FieldTable, LengthMode};
use libfuzzer_sys::fuzz_target;

fn table() -> FieldTable {
    let mut table = FieldTable::new();
    for field in 1..=64 {
        let spec = match field % 4 {
            0 => FieldSpec::new(FieldAttr::Ascii, LengthMode::Fixed, Align::Left, 8, '0'),
            1 => FieldSpec::new(FieldAttr::Bcd, LengthMode::Variable, Align::Right, 19, '0'),
            2 => FieldSpec::new(FieldAttr::Binary, LengthMode::Fixed, Align::Left, 64, '0'),
            _ => FieldSpec::new(FieldAttr::Ascii, LengthMode::Variable, Align::Left, 999, '0'),
        };
        table.insert(field, spec.unwrap());
    }
    table
}

fuzz_target!(|data: &[u8]| {
    let hex = String::from_utf8_lossy(data);
    let _ = decode_message(&hex, &table());
});
