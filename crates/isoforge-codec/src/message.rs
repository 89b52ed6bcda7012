//! Bitmap-driven whole-message decoding.
//!
//! A message begins with an 8-byte primary bitmap read MSB-first: bit 0
//! marks field 1, bit 63 marks field 64. Present fields follow back to
//! back in ascending field order, each decoded against its entry in a
//! caller-supplied [`FieldTable`]. Secondary bitmaps (fields 65..=128) are
//! not parsed.

use std::collections::BTreeMap;

use crate::{
    bcd,
    bitset::{BitOrder, BitSet},
    cursor::Cursor,
    errors::{CodecError, Result},
    field::FieldSpec,
};

/// Number of bytes in the primary bitmap.
const BITMAP_BYTES: usize = 8;

/// Ordered mapping from field number to its validated spec.
///
/// Iteration order is ascending field number, which is also the wire order
/// of present fields. Inserting an existing number replaces its spec.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    specs: BTreeMap<u32, FieldSpec>,
}

impl FieldTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the spec for a field number.
    pub fn insert(&mut self, number: u32, spec: FieldSpec) {
        self.specs.insert(number, spec);
    }

    /// Spec for a field number, if configured.
    #[must_use]
    pub fn get(&self, number: u32) -> Option<&FieldSpec> {
        self.specs.get(&number)
    }

    /// Number of configured fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether no fields are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl FromIterator<(u32, FieldSpec)> for FieldTable {
    fn from_iter<I: IntoIterator<Item = (u32, FieldSpec)>>(iter: I) -> Self {
        Self { specs: iter.into_iter().collect() }
    }
}

/// One decoded field of a message.
///
/// Field-local failures (a bad BCD nibble, non-UTF-8 ASCII data) are
/// carried per field so the rest of the message still displays; the cursor
/// has already advanced past the field's bytes when rendering fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedField {
    /// 1-based field number.
    pub number: u32,
    /// Rendered value, or the field-local decode failure.
    pub value: std::result::Result<String, CodecError>,
}

/// All fields of one decoded message, in ascending field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedMessage {
    /// Decoded fields, ascending by number.
    pub fields: Vec<DecodedField>,
}

/// Read the 8-byte primary bitmap and return present field numbers in
/// ascending order. The cursor is left positioned at the first field's
/// bytes.
///
/// # Errors
///
/// `CodecError::BufferUnderflow` if fewer than 8 bytes remain.
pub fn parse_bitmap(cursor: &mut Cursor<'_>) -> Result<Vec<u32>> {
    let bytes = cursor.take(BITMAP_BYTES)?;
    let bitmap = BitSet::from_bytes(bytes.to_vec(), BitOrder::Msb);

    let mut present = Vec::new();
    for field in 1..=bitmap.len() as u32 {
        if bitmap.get(field as usize - 1) {
            present.push(field);
        }
    }

    Ok(present)
}

/// Decode a full hex-encoded message against a field table.
///
/// The hex input is case-insensitive; an odd-length string is zero-padded.
/// Field-local render failures are recorded in the result and decoding
/// continues with the next field. A cursor underrun or a present field
/// with no table entry aborts the message with a single error, since field
/// boundaries past that point are unknowable.
///
/// # Errors
///
/// - `CodecError::InvalidDigit` for non-hex input
/// - `CodecError::BufferUnderflow` if the bitmap or any field outruns the
///   buffer
/// - `CodecError::MissingFieldSpec` if the bitmap marks a field the table
///   does not describe
pub fn decode_message(hex: &str, table: &FieldTable) -> Result<DecodedMessage> {
    let bytes = bcd::hex_to_bytes(hex)?;
    let mut cursor = Cursor::new(&bytes);

    let present = parse_bitmap(&mut cursor)?;

    let mut fields = Vec::with_capacity(present.len());
    for number in present {
        let spec = table.get(number).ok_or(CodecError::MissingFieldSpec { number })?;

        let value = match spec.decode(&mut cursor) {
            Ok(value) => Ok(value),
            // Underrun means the cursor did not advance; every later field
            // boundary is unknown, so give up on the whole message.
            Err(err @ CodecError::BufferUnderflow { .. }) => return Err(err),
            Err(err) => Err(err),
        };

        fields.push(DecodedField { number, value });
    }

    Ok(DecodedMessage { fields })
}
