//! Byte cursor with underflow-checked reads.

use crate::errors::{CodecError, Result};

/// A byte slice plus a read position.
///
/// Each read advances the position. A cursor is owned exclusively by one
/// decode call for its duration; it is never shared across concurrent
/// decodes. Short reads fail with [`CodecError::BufferUnderflow`] instead
/// of reading garbage or panicking out of bounds.
#[derive(Debug)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of `bytes`.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Read the next `n` bytes and advance past them.
    ///
    /// # Errors
    ///
    /// `CodecError::BufferUnderflow` if fewer than `n` bytes remain; the
    /// position is left unchanged in that case.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(CodecError::BufferUnderflow { needed: n, remaining: self.remaining() });
        }

        let slice = &self.bytes[self.position..self.position + n];
        self.position += n;
        Ok(slice)
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Total bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_advances_position() {
        let data = [1u8, 2, 3, 4];
        let mut cursor = Cursor::new(&data);

        assert_eq!(cursor.take(2).unwrap(), &[1, 2]);
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.remaining(), 2);
        assert_eq!(cursor.take(2).unwrap(), &[3, 4]);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn short_read_fails_without_advancing() {
        let data = [1u8, 2];
        let mut cursor = Cursor::new(&data);

        assert!(matches!(
            cursor.take(3),
            Err(CodecError::BufferUnderflow { needed: 3, remaining: 2 })
        ));
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.take(2).unwrap(), &[1, 2]);
    }

    #[test]
    fn zero_length_take_always_succeeds() {
        let mut cursor = Cursor::new(&[]);
        assert_eq!(cursor.take(0).unwrap(), &[] as &[u8]);
    }
}
