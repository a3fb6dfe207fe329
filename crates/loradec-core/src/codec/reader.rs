use std::ops::Range;

use super::error::DecodeError;

/// Bounds-checked view over an uplink payload.
///
/// Multi-byte words are big-endian: the byte at the lower offset is the most
/// significant one.
pub struct PayloadReader<'a> {
    payload: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn require_len(&self, needed: usize) -> Result<(), DecodeError> {
        if self.payload.len() < needed {
            return Err(DecodeError::TooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, DecodeError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(DecodeError::TooShort {
                needed: offset.saturating_add(1),
                actual: self.payload.len(),
            })
    }

    pub fn read_u16_be(&self, offset: usize) -> Result<u16, DecodeError> {
        let end = offset.checked_add(2).ok_or(DecodeError::TooShort {
            needed: usize::MAX,
            actual: self.payload.len(),
        })?;
        let bytes = self.read_slice(offset..end)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], DecodeError> {
        self.payload.get(range.clone()).ok_or(DecodeError::TooShort {
            needed: range.end,
            actual: self.payload.len(),
        })
    }
}

/// Combine the two bytes at `offset` into a big-endian `u16`.
///
/// # Examples
/// ```
/// use loradec_core::codec::assemble;
///
/// assert_eq!(assemble(&[0x01, 0x02], 0).unwrap(), 0x0102);
/// assert!(assemble(&[0x01, 0x02], 1).is_err());
/// ```
///
/// # Errors
/// Returns `DecodeError::TooShort` when `offset + 1` is not a valid index.
pub fn assemble(buffer: &[u8], offset: usize) -> Result<u16, DecodeError> {
    PayloadReader::new(buffer).read_u16_be(offset)
}
