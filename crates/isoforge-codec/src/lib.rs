//! ISO 8583 field codec and bitmap-driven message framing.
//!
//! ISO 8583 messages carry up to 64 numbered fields (128 with a secondary
//! bitmap, which this crate does not yet parse). An 8-byte presence bitmap
//! prefixes the body: bit `i` (MSB-first) marks field `i + 1` as present.
//! Each present field is then encoded back-to-back according to a per-field
//! format descriptor: ASCII, packed BCD, or raw binary payloads, with fixed
//! or BCD-length-prefixed variable sizes and left/right alignment for odd
//! BCD digit counts.
//!
//! # Components
//!
//! - [`BitSet`]: bit-indexed view over a byte buffer (two bit orderings)
//! - [`bcd`]: BCD and hex primitive conversions
//! - [`Cursor`]: byte slice with a read position, underflow-checked
//! - [`FieldSpec`] / [`FieldDraft`]: validated and editable field formats
//! - [`FieldTable`] / [`decode_message`]: bitmap parse and full-message
//!   decode
//!
//! Decoding is purely synchronous and runs to completion on the calling
//! thread. All failures are returned as [`CodecError`] values; nothing in
//! this crate aborts the process.

pub mod bcd;
mod bitset;
mod cursor;
mod errors;
mod field;
mod message;

pub use bitset::{BitOrder, BitSet};
pub use cursor::Cursor;
pub use errors::{CodecError, Result};
pub use field::{Align, FieldAttr, FieldDraft, FieldSpec, LengthMode};
pub use message::{DecodedField, DecodedMessage, FieldTable, decode_message, parse_bitmap};
