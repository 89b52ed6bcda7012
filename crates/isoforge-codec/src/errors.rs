//! Error types for the ISO 8583 codec.
//!
//! Strongly-typed errors for the two layers that can fail: primitive
//! conversions (bad digits, bad nibbles) and message framing (cursor
//! underrun, missing field descriptors). Decode failures are ordinary
//! values returned to the caller; the codec never panics on malformed
//! input.

use thiserror::Error;

/// Convenience alias for codec results.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors produced while decoding ISO 8583 data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A character outside `'0'..='9'` where a decimal digit was required.
    #[error("invalid decimal digit {found:?}")]
    InvalidDigit {
        /// The offending character
        found: char,
    },

    /// A BCD nibble greater than 9.
    ///
    /// Without this check BCD decoding would be indistinguishable from hex
    /// decoding, so it is never coerced.
    #[error("invalid BCD nibble in byte {byte:#04x}")]
    InvalidBcdDigit {
        /// The byte containing the bad nibble
        byte: u8,
    },

    /// A variable-length field declares a maximum outside 0..=9999.
    ///
    /// The BCD length prefix is at most two bytes (four decimal digits), so
    /// larger declared lengths are unrepresentable. Rejected when the spec
    /// is constructed, not at decode time.
    #[error("variable field length {declared} not representable in a BCD prefix (max 9999)")]
    InvalidVariableLength {
        /// The declared maximum length
        declared: u32,
    },

    /// An ASCII field contained bytes that are not valid UTF-8.
    #[error("ASCII field data is not valid UTF-8")]
    InvalidAscii,

    /// Fewer bytes remain than the current read requires.
    ///
    /// Aborts the whole message decode; partial field results are not
    /// returned past this point.
    #[error("buffer underflow: needed {needed} bytes, {remaining} remaining")]
    BufferUnderflow {
        /// Bytes the read required
        needed: usize,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// An editable text field does not parse as the required number.
    ///
    /// Draft rows hold user-edited strings that may be transiently invalid;
    /// this surfaces only when a draft is materialized into a spec.
    #[error("{text:?} is not a valid number")]
    InvalidNumber {
        /// The text that failed to parse
        text: String,
    },

    /// The bitmap marks a field present but the table has no spec for it.
    ///
    /// Field lengths are unknowable without a spec, so decoding cannot
    /// continue past this field.
    #[error("no field spec for present field {number}")]
    MissingFieldSpec {
        /// The field number without a spec
        number: u32,
    },
}
