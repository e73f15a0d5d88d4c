//! Bounds-checked byte cursor that every decode procedure reads through.
//!
//! A cursor is created over the remaining input at the start of each instruction, so
//! [`Cursor::consumed`] always yields exactly the bytes of the instruction being decoded.

use crate::decoder::DecodeError;

/// Raised when a read would run past the end of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("wanted {wanted} byte(s) at offset {offset}, only {remaining} remain")]
pub struct OutOfBounds {
    pub offset: usize,
    pub wanted: usize,
    pub remaining: usize,
}

impl From<OutOfBounds> for DecodeError {
    fn from(e: OutOfBounds) -> Self {
        DecodeError::TruncatedInstruction(e)
    }
}

/// Byte order used for multi-byte reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8], endian: Endian) -> Self {
        Self { buf, pos: 0, endian }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Bytes read so far.
    #[inline]
    pub fn consumed(&self) -> &'a [u8] {
        &self.buf[..self.pos]
    }

    fn check(&self, n: usize) -> Result<(), OutOfBounds> {
        if self.remaining() < n {
            return Err(OutOfBounds {
                offset: self.pos,
                wanted: n,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Returns the next `n` bytes without advancing.
    pub fn peek(&self, n: usize) -> Result<&'a [u8], OutOfBounds> {
        self.check(n)?;
        Ok(&self.buf[self.pos..self.pos + n])
    }

    /// Returns up to `n` bytes without advancing; never fails.
    pub fn peek_up_to(&self, n: usize) -> &'a [u8] {
        let end = (self.pos + n).min(self.buf.len());
        &self.buf[self.pos..end]
    }

    pub fn advance(&mut self, n: usize) -> Result<(), OutOfBounds> {
        self.check(n)?;
        self.pos += n;
        Ok(())
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], OutOfBounds> {
        let bytes = self.peek(n)?;
        self.pos += n;
        Ok(bytes)
    }

    pub fn peek_u8(&self) -> Result<u8, OutOfBounds> {
        Ok(self.peek(1)?[0])
    }

    pub fn read_u8(&mut self) -> Result<u8, OutOfBounds> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, OutOfBounds> {
        Ok(self.read_u8()? as i8)
    }

    pub fn peek_u16_with(&self, endian: Endian) -> Result<u16, OutOfBounds> {
        let b = self.peek(2)?;
        let raw = [b[0], b[1]];
        Ok(match endian {
            Endian::Little => u16::from_le_bytes(raw),
            Endian::Big => u16::from_be_bytes(raw),
        })
    }

    pub fn read_u16_with(&mut self, endian: Endian) -> Result<u16, OutOfBounds> {
        let v = self.peek_u16_with(endian)?;
        self.pos += 2;
        Ok(v)
    }

    pub fn peek_u32_with(&self, endian: Endian) -> Result<u32, OutOfBounds> {
        let b = self.peek(4)?;
        let raw = [b[0], b[1], b[2], b[3]];
        Ok(match endian {
            Endian::Little => u32::from_le_bytes(raw),
            Endian::Big => u32::from_be_bytes(raw),
        })
    }

    pub fn read_u32_with(&mut self, endian: Endian) -> Result<u32, OutOfBounds> {
        let v = self.peek_u32_with(endian)?;
        self.pos += 4;
        Ok(v)
    }

    pub fn read_u64_with(&mut self, endian: Endian) -> Result<u64, OutOfBounds> {
        let b = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(match endian {
            Endian::Little => u64::from_le_bytes(raw),
            Endian::Big => u64::from_be_bytes(raw),
        })
    }

    /// Reads a 16-bit value in the cursor's byte order.
    pub fn read_u16(&mut self) -> Result<u16, OutOfBounds> {
        self.read_u16_with(self.endian)
    }

    pub fn peek_u16(&self) -> Result<u16, OutOfBounds> {
        self.peek_u16_with(self.endian)
    }

    /// Reads a 32-bit value in the cursor's byte order.
    pub fn read_u32(&mut self) -> Result<u32, OutOfBounds> {
        self.read_u32_with(self.endian)
    }

    pub fn peek_u32(&self) -> Result<u32, OutOfBounds> {
        self.peek_u32_with(self.endian)
    }

    pub fn read_i16_le(&mut self) -> Result<i16, OutOfBounds> {
        Ok(self.read_u16_with(Endian::Little)? as i16)
    }

    pub fn read_i32_le(&mut self) -> Result<i32, OutOfBounds> {
        Ok(self.read_u32_with(Endian::Little)? as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_respect_endianness() {
        let bytes = [0x12, 0x34, 0x56, 0x78];
        let mut le = Cursor::new(&bytes, Endian::Little);
        assert_eq!(le.peek_u32().unwrap(), 0x7856_3412);
        assert_eq!(le.read_u16().unwrap(), 0x3412);
        assert_eq!(le.consumed(), &[0x12, 0x34]);

        let mut be = Cursor::new(&bytes, Endian::Big);
        assert_eq!(be.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(be.remaining(), 0);
    }

    #[test]
    fn test_out_of_bounds() {
        let bytes = [0xaa, 0xbb, 0xcc];
        let mut cursor = Cursor::new(&bytes, Endian::Little);
        cursor.advance(2).unwrap();
        let err = cursor.read_u16().unwrap_err();
        assert_eq!(err.wanted, 2);
        assert_eq!(err.remaining, 1);
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.peek_up_to(4), &[0xcc]);
        assert!(matches!(
            DecodeError::from(err),
            DecodeError::TruncatedInstruction(_)
        ));
    }
}
