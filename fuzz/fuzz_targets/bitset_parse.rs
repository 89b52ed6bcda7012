//! Fuzz target for the BitSet string constructors
//!
//! Both constructors must reject bad characters with an error and never
//! panic, and every bit of a successfully built set must be readable.

#![no_main]

use isoforge_codec::BitSet;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    if let Ok(bits) = BitSet::from_hex_str(&text) {
        for i in 0..bits.len() {
            let _ = bits.get(i);
        }
    }

    if let Ok(bits) = BitSet::from_binary_str(&text) {
        for i in 0..bits.len() {
            let _ = bits.get(i);
        }
    }
});
