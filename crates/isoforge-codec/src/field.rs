//! Per-field format descriptors and the field decode algorithm.
//!
//! A field's wire format is described by three closed enums (attribute,
//! length mode, alignment) plus a length and a pad character. The whole
//! decode algorithm lives in one `match`-driven function on [`FieldSpec`]
//! rather than being spread across per-variant virtual methods, so the
//! byte accounting is auditable in one place.
//!
//! [`FieldDraft`] is the editable-text counterpart used by UI rows: its
//! strings may be transiently invalid and are only materialized into a
//! validated [`FieldSpec`] at decode time.

use crate::{
    bcd,
    cursor::Cursor,
    errors::{CodecError, Result},
};

/// Data encoding of a field's payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldAttr {
    /// One byte per character, rendered as text.
    #[default]
    Ascii,
    /// Two decimal digits per byte, rendered as a digit string.
    Bcd,
    /// Raw bytes, rendered as uppercase hex.
    Binary,
}

/// How a field's data length is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthMode {
    /// The spec's length is the data length.
    #[default]
    Fixed,
    /// A BCD length prefix on the wire gives the data length; the spec's
    /// length only bounds the prefix width (1 byte for 0..=99, 2 bytes for
    /// 100..=9999).
    Variable,
}

/// Which side of odd-length BCD data carries the pad digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Data occupies the leading digits; the pad is trailing.
    #[default]
    Left,
    /// Data occupies the trailing digits; the pad is leading.
    Right,
}

/// Validated per-field format descriptor.
///
/// Constructed only through [`FieldSpec::new`], which rejects variable
/// lengths that cannot be represented in a BCD prefix. A spec is immutable
/// once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    attr: FieldAttr,
    length_mode: LengthMode,
    align: Align,
    length: u32,
    pad: char,
}

impl FieldSpec {
    /// Largest length representable in a two-byte BCD prefix.
    pub const MAX_VARIABLE_LENGTH: u32 = 9999;

    /// Create a validated spec.
    ///
    /// # Errors
    ///
    /// `CodecError::InvalidVariableLength` if `length_mode` is
    /// [`LengthMode::Variable`] and `length` exceeds
    /// [`Self::MAX_VARIABLE_LENGTH`]. Rejected here, at construction time,
    /// rather than surfacing mid-decode.
    pub fn new(
        attr: FieldAttr,
        length_mode: LengthMode,
        align: Align,
        length: u32,
        pad: char,
    ) -> Result<Self> {
        if length_mode == LengthMode::Variable && length > Self::MAX_VARIABLE_LENGTH {
            return Err(CodecError::InvalidVariableLength { declared: length });
        }

        Ok(Self { attr, length_mode, align, length, pad })
    }

    /// Declared length (data length for fixed fields, prefix bound for
    /// variable fields).
    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Pad character used when packing odd-length BCD data.
    #[must_use]
    pub fn pad(&self) -> char {
        self.pad
    }

    /// Decode one occurrence of this field from the cursor.
    ///
    /// The cursor advances by the total bytes consumed (length prefix plus
    /// data), even when rendering subsequently fails, so a caller may skip
    /// a bad field and continue with the next one.
    ///
    /// # Errors
    ///
    /// - `CodecError::BufferUnderflow` if the prefix or data outruns the
    ///   buffer
    /// - `CodecError::InvalidBcdDigit` for non-decimal nibbles in a BCD
    ///   prefix or BCD data
    /// - `CodecError::InvalidAscii` if ASCII data is not valid UTF-8
    pub fn decode(&self, cursor: &mut Cursor<'_>) -> Result<String> {
        let data_len = match self.length_mode {
            LengthMode::Fixed => self.length as usize,
            LengthMode::Variable => {
                // Prefix width is fixed by the declared bound, not by the
                // value on the wire.
                let prefix_len = if self.length <= 99 { 1 } else { 2 };
                let prefix = cursor.take(prefix_len)?;
                bcd::bcd_to_u32(prefix)? as usize
            },
        };

        let read_len = match self.attr {
            FieldAttr::Ascii => data_len,
            FieldAttr::Bcd => data_len.div_ceil(2),
            FieldAttr::Binary => data_len.div_ceil(8),
        };

        let data = cursor.take(read_len)?;

        match self.attr {
            FieldAttr::Ascii => {
                String::from_utf8(data.to_vec()).map_err(|_| CodecError::InvalidAscii)
            },
            FieldAttr::Bcd => {
                let mut digits = String::with_capacity(read_len * 2);
                for &byte in data {
                    digits.push_str(&bcd::bcd_to_string(byte)?);
                }

                // Odd data length: one nibble of the last/first byte is pad.
                if read_len * 2 == data_len {
                    Ok(digits)
                } else {
                    Ok(match self.align {
                        Align::Left => digits[..data_len].to_string(),
                        Align::Right => digits[digits.len() - data_len..].to_string(),
                    })
                }
            },
            // Binary output is byte-aligned and is deliberately not trimmed
            // to data_len, matching the established wire behavior.
            FieldAttr::Binary => Ok(bcd::bytes_to_hex(data)),
        }
    }
}

/// Editable, possibly-invalid field descriptor.
///
/// One per UI row: every slot holds user-edited text that may transiently
/// fail to parse. No decode logic lives here; [`FieldDraft::validate`]
/// materializes a [`FieldSpec`] (and the field number) when the row is
/// actually used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDraft {
    /// Field number text (1-based).
    pub field: String,
    /// Data encoding.
    pub attr: FieldAttr,
    /// Length mode.
    pub length_mode: LengthMode,
    /// Alignment for odd BCD lengths.
    pub align: Align,
    /// Length text.
    pub length: String,
    /// Pad character text.
    pub pad: String,
}

impl Default for FieldDraft {
    fn default() -> Self {
        Self {
            field: String::new(),
            attr: FieldAttr::Ascii,
            length_mode: LengthMode::Fixed,
            align: Align::Left,
            length: "0".to_string(),
            pad: "0".to_string(),
        }
    }
}

impl FieldDraft {
    /// Materialize the draft into a field number and a validated spec.
    ///
    /// # Errors
    ///
    /// - `CodecError::InvalidNumber` if the field number or length text is
    ///   not numeric, or the pad text is not exactly one character
    /// - `CodecError::InvalidVariableLength` via [`FieldSpec::new`]
    pub fn validate(&self) -> Result<(u32, FieldSpec)> {
        let number: u32 = self
            .field
            .parse()
            .map_err(|_| CodecError::InvalidNumber { text: self.field.clone() })?;

        let length: u32 = self
            .length
            .parse()
            .map_err(|_| CodecError::InvalidNumber { text: self.length.clone() })?;

        let mut pad_chars = self.pad.chars();
        let pad = match (pad_chars.next(), pad_chars.next()) {
            (Some(ch), None) => ch,
            _ => return Err(CodecError::InvalidNumber { text: self.pad.clone() }),
        };

        let spec = FieldSpec::new(self.attr, self.length_mode, self.align, length, pad)?;
        Ok((number, spec))
    }

    /// Whether the draft currently materializes cleanly. Cheap validity
    /// probe for UI feedback.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(attr: FieldAttr, mode: LengthMode, align: Align, length: u32) -> FieldSpec {
        FieldSpec::new(attr, mode, align, length, '0').unwrap()
    }

    #[test]
    fn ascii_fixed_reads_exact_bytes() {
        let data = b"00000001";

        for align in [Align::Left, Align::Right] {
            let mut cursor = Cursor::new(data);
            let value = spec(FieldAttr::Ascii, LengthMode::Fixed, align, 8)
                .decode(&mut cursor)
                .unwrap();

            assert_eq!(value, "00000001");
            assert_eq!(cursor.position(), 8);
        }
    }

    #[test]
    fn ascii_variable_reads_one_byte_prefix() {
        // declared bound 9 -> 1-byte prefix; wire says 9 chars follow
        let mut buffer = vec![0x09];
        buffer.extend_from_slice(b"1234567890");

        let mut cursor = Cursor::new(&buffer);
        let value = spec(FieldAttr::Ascii, LengthMode::Variable, Align::Left, 9)
            .decode(&mut cursor)
            .unwrap();

        assert_eq!(value, "123456789");
        assert_eq!(cursor.position(), 10);
    }

    #[test]
    fn variable_bound_over_99_uses_two_byte_prefix() {
        let mut buffer = vec![0x00, 0x03];
        buffer.extend_from_slice(b"abcdef");

        let mut cursor = Cursor::new(&buffer);
        let value = spec(FieldAttr::Ascii, LengthMode::Variable, Align::Left, 100)
            .decode(&mut cursor)
            .unwrap();

        assert_eq!(value, "abc");
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn bcd_fixed_odd_length_left_keeps_first_digits() {
        let buffer = bcd::str_to_bcd("1234567890", Align::Left, '0').unwrap();

        let mut cursor = Cursor::new(&buffer);
        let value = spec(FieldAttr::Bcd, LengthMode::Fixed, Align::Left, 9)
            .decode(&mut cursor)
            .unwrap();

        assert_eq!(value, "123456789");
    }

    #[test]
    fn bcd_fixed_odd_length_right_keeps_last_digits() {
        let buffer = bcd::str_to_bcd("1234567890", Align::Left, '0').unwrap();

        let mut cursor = Cursor::new(&buffer);
        let value = spec(FieldAttr::Bcd, LengthMode::Fixed, Align::Right, 9)
            .decode(&mut cursor)
            .unwrap();

        assert_eq!(value, "234567890");
    }

    #[test]
    fn bcd_variable_trims_by_alignment() {
        let mut buffer = vec![0x09];
        buffer.extend(bcd::str_to_bcd("1234567890", Align::Left, '0').unwrap());

        let mut cursor = Cursor::new(&buffer);
        let left = spec(FieldAttr::Bcd, LengthMode::Variable, Align::Left, 9)
            .decode(&mut cursor)
            .unwrap();
        assert_eq!(left, "123456789");

        let mut cursor = Cursor::new(&buffer);
        let right = spec(FieldAttr::Bcd, LengthMode::Variable, Align::Right, 9)
            .decode(&mut cursor)
            .unwrap();
        assert_eq!(right, "234567890");
    }

    #[test]
    fn binary_fixed_renders_hex_untrimmed() {
        // length 80 bits -> 10 bytes
        let data = b"1234567890";

        let mut cursor = Cursor::new(data);
        let value = spec(FieldAttr::Binary, LengthMode::Fixed, Align::Left, 80)
            .decode(&mut cursor)
            .unwrap();

        assert_eq!(value, "31323334353637383930");
        assert_eq!(cursor.position(), 10);
    }

    #[test]
    fn binary_variable_rounds_bits_up_to_bytes() {
        // 72 bits -> 9 bytes read
        let mut buffer = bcd::str_to_bcd("72", Align::Left, '0').unwrap();
        buffer.extend_from_slice(b"1234567890");

        let mut cursor = Cursor::new(&buffer);
        let value = spec(FieldAttr::Binary, LengthMode::Variable, Align::Left, 72)
            .decode(&mut cursor)
            .unwrap();

        assert_eq!(value, bcd::bytes_to_hex(b"123456789"));
        assert_eq!(cursor.position(), 10);
    }

    #[test]
    fn decode_is_idempotent_over_fresh_cursors() {
        let mut buffer = vec![0x07];
        buffer.extend_from_slice(b"abcdefg");
        let field = spec(FieldAttr::Ascii, LengthMode::Variable, Align::Left, 9);

        let mut first = Cursor::new(&buffer);
        let mut second = Cursor::new(&buffer);

        assert_eq!(field.decode(&mut first).unwrap(), field.decode(&mut second).unwrap());
        assert_eq!(first.position(), second.position());
    }

    #[test]
    fn underflow_is_reported_not_garbage() {
        let data = b"abc";
        let mut cursor = Cursor::new(data);

        let result =
            spec(FieldAttr::Ascii, LengthMode::Fixed, Align::Left, 8).decode(&mut cursor);
        assert!(matches!(result, Err(CodecError::BufferUnderflow { needed: 8, remaining: 3 })));
    }

    #[test]
    fn bad_bcd_nibble_is_reported() {
        let buffer = [0x1f, 0x23];
        let mut cursor = Cursor::new(&buffer);

        let result = spec(FieldAttr::Bcd, LengthMode::Fixed, Align::Left, 4).decode(&mut cursor);
        assert!(matches!(result, Err(CodecError::InvalidBcdDigit { byte: 0x1f })));
        // bytes were consumed before rendering failed
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn variable_length_over_9999_rejected_at_construction() {
        let result = FieldSpec::new(FieldAttr::Ascii, LengthMode::Variable, Align::Left, 10_000, '0');
        assert!(matches!(result, Err(CodecError::InvalidVariableLength { declared: 10_000 })));
    }

    #[test]
    fn draft_materializes_into_spec() {
        let draft = FieldDraft {
            field: "2".to_string(),
            attr: FieldAttr::Bcd,
            length_mode: LengthMode::Variable,
            align: Align::Right,
            length: "19".to_string(),
            pad: "0".to_string(),
        };

        let (number, spec) = draft.validate().unwrap();
        assert_eq!(number, 2);
        assert_eq!(spec.length(), 19);
        assert!(draft.is_valid());
    }

    #[test]
    fn draft_with_non_numeric_text_is_invalid_but_holds() {
        let draft = FieldDraft { field: "2".to_string(), length: "1x".to_string(), ..Default::default() };

        assert!(!draft.is_valid());
        assert!(matches!(draft.validate(), Err(CodecError::InvalidNumber { .. })));
    }

    #[test]
    fn default_draft_has_empty_field_number() {
        let draft = FieldDraft::default();
        assert!(!draft.is_valid());
        assert_eq!(draft.length, "0");
    }
}
