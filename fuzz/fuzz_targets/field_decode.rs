//! Fuzz target for single-field decoding
//!
//! Exercises FieldSpec::decode over arbitrary buffers and the whole spec
//! shape space. Decoding must never panic or read past the buffer.

#![no_main]

use isoforge_codec::{Align, Cursor, FieldAttr, FieldSpec, LengthMode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u8, u16, &[u8])| {
    let (shape, length, data) = input;

    let attr = match shape % 3 {
        0 => FieldAttr::Ascii,
        1 => FieldAttr::Bcd,
        _ => FieldAttr::Binary,
    };
    let mode = if shape & 0x04 != 0 { LengthMode::Variable } else { LengthMode::Fixed };
    let align = if shape & 0x08 != 0 { Align::Right } else { Align::Left };

    let Ok(spec) = FieldSpec::new(attr, mode, align, u32::from(length), '0') else {
        return;
    };

    let mut cursor = Cursor::new(data);
    let _ = spec.decode(&mut cursor);
    assert!(cursor.position() <= data.len());
});
