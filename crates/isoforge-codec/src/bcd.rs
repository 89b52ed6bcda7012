//! BCD and hex primitive conversions.
//!
//! Packed BCD stores two decimal digits per byte, one per nibble. These
//! primitives back both the bitmap reader (hex string to bytes) and the
//! field codec (BCD data and BCD length prefixes). Nibbles above 9 are
//! always rejected; coercing them would make BCD decoding indistinguishable
//! from hex decoding.

use crate::{
    errors::{CodecError, Result},
    field::Align,
};

/// Decode one packed-BCD byte into its two decimal digits.
///
/// # Errors
///
/// `CodecError::InvalidBcdDigit` if either nibble is greater than 9.
pub fn bcd_to_string(byte: u8) -> Result<String> {
    let high = byte >> 4;
    let low = byte & 0x0f;

    if high > 9 || low > 9 {
        return Err(CodecError::InvalidBcdDigit { byte });
    }

    Ok(format!("{high}{low}"))
}

/// Decode a run of packed-BCD bytes as an unsigned integer.
///
/// Used for variable-length prefixes: one byte covers 0..=99, two bytes
/// cover 0..=9999.
///
/// # Errors
///
/// `CodecError::InvalidBcdDigit` if any nibble is greater than 9.
pub fn bcd_to_u32(bytes: &[u8]) -> Result<u32> {
    let mut value = 0u32;

    for &byte in bytes {
        let high = byte >> 4;
        let low = byte & 0x0f;

        if high > 9 || low > 9 {
            return Err(CodecError::InvalidBcdDigit { byte });
        }

        value = value * 100 + u32::from(high) * 10 + u32::from(low);
    }

    Ok(value)
}

/// Render one byte as two uppercase hex characters.
#[must_use]
pub fn byte_to_hex(byte: u8) -> String {
    format!("{byte:02X}")
}

/// Render a byte slice as uppercase hex, two characters per byte.
#[must_use]
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        out.push_str(&byte_to_hex(byte));
    }
    out
}

/// Pack a decimal-digit string into BCD bytes.
///
/// An odd-length input is first padded with one `pad` character: prepended
/// for [`Align::Left`] data, appended for [`Align::Right`] data. The pad
/// character itself must be a decimal digit.
///
/// # Errors
///
/// `CodecError::InvalidDigit` if any character (pad included) is outside
/// `'0'..='9'`.
pub fn str_to_bcd(digits: &str, align: Align, pad: char) -> Result<Vec<u8>> {
    let mut chars: Vec<char> = digits.chars().collect();
    if chars.len() % 2 != 0 {
        match align {
            Align::Left => chars.insert(0, pad),
            Align::Right => chars.push(pad),
        }
    }

    let mut out = Vec::with_capacity(chars.len() / 2);
    for pair in chars.chunks_exact(2) {
        let high = decimal_value(pair[0])?;
        let low = decimal_value(pair[1])?;
        out.push((high << 4) | low);
    }

    Ok(out)
}

/// Decode a hex-digit string into bytes, two characters per byte.
///
/// Case-insensitive. An odd-length input is zero-padded at the end before
/// conversion.
///
/// # Errors
///
/// `CodecError::InvalidDigit` if any character is not a hex digit.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>> {
    let mut chars: Vec<char> = hex.chars().collect();
    if chars.len() % 2 != 0 {
        chars.push('0');
    }

    let mut out = Vec::with_capacity(chars.len() / 2);
    for pair in chars.chunks_exact(2) {
        let high = hex_value(pair[0])?;
        let low = hex_value(pair[1])?;
        out.push((high << 4) | low);
    }

    Ok(out)
}

fn decimal_value(ch: char) -> Result<u8> {
    ch.to_digit(10).map(|d| d as u8).ok_or(CodecError::InvalidDigit { found: ch })
}

fn hex_value(ch: char) -> Result<u8> {
    ch.to_digit(16).map(|d| d as u8).ok_or(CodecError::InvalidDigit { found: ch })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn bcd_to_string_splits_nibbles() {
        assert_eq!(bcd_to_string(0x12).unwrap(), "12");
        assert_eq!(bcd_to_string(0x09).unwrap(), "09");
        assert_eq!(bcd_to_string(0x90).unwrap(), "90");
    }

    #[test]
    fn bcd_to_string_rejects_hex_nibbles() {
        assert!(matches!(bcd_to_string(0x1a), Err(CodecError::InvalidBcdDigit { byte: 0x1a })));
        assert!(matches!(bcd_to_string(0xa1), Err(CodecError::InvalidBcdDigit { byte: 0xa1 })));
    }

    #[test]
    fn bcd_to_u32_decodes_prefixes() {
        assert_eq!(bcd_to_u32(&[0x09]).unwrap(), 9);
        assert_eq!(bcd_to_u32(&[0x99]).unwrap(), 99);
        assert_eq!(bcd_to_u32(&[0x01, 0x23]).unwrap(), 123);
        assert_eq!(bcd_to_u32(&[0x98, 0x76]).unwrap(), 9876);
    }

    #[test]
    fn str_to_bcd_packs_digit_pairs() {
        assert_eq!(str_to_bcd("1234", Align::Left, '0').unwrap(), vec![0x12, 0x34]);
    }

    #[test]
    fn str_to_bcd_left_align_prepends_pad() {
        assert_eq!(str_to_bcd("123", Align::Left, '0').unwrap(), vec![0x01, 0x23]);
    }

    #[test]
    fn str_to_bcd_right_align_appends_pad() {
        assert_eq!(str_to_bcd("123", Align::Right, '0').unwrap(), vec![0x12, 0x30]);
    }

    #[test]
    fn str_to_bcd_rejects_non_digits() {
        assert!(matches!(
            str_to_bcd("12a4", Align::Left, '0'),
            Err(CodecError::InvalidDigit { found: 'a' })
        ));
    }

    #[test]
    fn hex_to_bytes_pads_odd_input() {
        assert_eq!(hex_to_bytes("ABC").unwrap(), vec![0xab, 0xc0]);
    }

    #[test]
    fn hex_to_bytes_is_case_insensitive() {
        assert_eq!(hex_to_bytes("ff").unwrap(), hex_to_bytes("FF").unwrap());
    }

    proptest! {
        /// Round-trip: rendering a byte as hex and decoding it yields the
        /// same byte.
        #[test]
        fn hex_round_trip(byte in any::<u8>()) {
            prop_assert_eq!(hex_to_bytes(&byte_to_hex(byte)).unwrap(), vec![byte]);
        }

        /// Every valid BCD byte decodes to exactly two decimal digits.
        #[test]
        fn valid_bcd_decodes_to_two_digits(high in 0u8..=9, low in 0u8..=9) {
            let decoded = bcd_to_string((high << 4) | low).unwrap();
            prop_assert_eq!(decoded.len(), 2);
            prop_assert!(decoded.chars().all(|c| c.is_ascii_digit()));
        }

        /// Packing an even-length digit string and decoding it again is
        /// the identity.
        #[test]
        fn bcd_round_trip(digits in "[0-9]{2,16}") {
            prop_assume!(digits.len() % 2 == 0);

            let packed = str_to_bcd(&digits, Align::Left, '0').unwrap();
            let mut decoded = String::new();
            for byte in packed {
                decoded.push_str(&bcd_to_string(byte).unwrap());
            }
            prop_assert_eq!(decoded, digits);
        }

        /// Hex rendering of arbitrary bytes decodes back to those bytes.
        #[test]
        fn bytes_hex_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assert_eq!(hex_to_bytes(&bytes_to_hex(&bytes)).unwrap(), bytes);
        }
    }
}
