//! Bit-indexed views over byte buffers.
//!
//! ISO 8583 bitmaps read MSB-first within each byte (bit 0 of the bitmap is
//! the high bit of byte 0), while bit-string visualizers read LSB-first.
//! Both orderings are covered by one type carrying a [`BitOrder`] tag
//! instead of subclassing per ordering, so indexing stays in one place.
//!
//! Both string constructors satisfy the same canonical convention:
//! `get(i)` reflects the `i`-th character of the input string in natural
//! reading order. Trailing bits of a partial final byte are zero.

use crate::errors::{CodecError, Result};

/// Bit ordering within each byte of the backing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// Bit `i` is `byte[i / 8] & (1 << (7 - i % 8))`. Used by ISO 8583
    /// presence bitmaps and hex-string input.
    Msb,
    /// Bit `i` is `byte[i / 8] & (1 << (i % 8))`. Used by binary-digit
    /// string input.
    Lsb,
}

/// Immutable fixed-capacity bit view over an owned byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSet {
    bytes: Vec<u8>,
    order: BitOrder,
}

impl BitSet {
    /// Wrap a byte buffer with the given bit ordering.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>, order: BitOrder) -> Self {
        Self { bytes, order }
    }

    /// Build from a hex-digit string: each character contributes 4 bits in
    /// natural reading order (MSB ordering). An odd-length string is
    /// zero-padded at the end.
    ///
    /// # Errors
    ///
    /// `CodecError::InvalidDigit` for any non-hex character.
    pub fn from_hex_str(hex: &str) -> Result<Self> {
        Ok(Self::from_bytes(crate::bcd::hex_to_bytes(hex)?, BitOrder::Msb))
    }

    /// Build from a string of `'0'`/`'1'` characters, one per bit, in
    /// natural reading order (LSB ordering within each packed byte).
    /// Trailing bits of a partial final byte are zero.
    ///
    /// # Errors
    ///
    /// `CodecError::InvalidDigit` for any character other than `'0'`/`'1'`.
    pub fn from_binary_str(bits: &str) -> Result<Self> {
        let chars: Vec<char> = bits.chars().collect();
        let mut bytes = vec![0u8; chars.len().div_ceil(8)];

        for (i, ch) in chars.into_iter().enumerate() {
            match ch {
                '1' => bytes[i / 8] |= 1 << (i % 8),
                '0' => {},
                other => return Err(CodecError::InvalidDigit { found: other }),
            }
        }

        Ok(Self::from_bytes(bytes, BitOrder::Lsb))
    }

    /// Bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`. Out-of-range access is a
    /// programming error, not a data error; it fails fast.
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len(), "bit index {index} out of range for {} bits", self.len());

        let byte = self.bytes[index / 8];
        let mask = match self.order {
            BitOrder::Msb => 1 << (7 - index % 8),
            BitOrder::Lsb => 1 << (index % 8),
        };

        byte & mask != 0
    }

    /// Capacity in bits (backing bytes times 8).
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Whether the backing buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
