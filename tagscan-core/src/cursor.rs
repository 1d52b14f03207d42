//! Bounds-checked reads over an immutable byte buffer
//!
//! Every format parser in this crate reads through `ByteCursor`. Reads
//! are pure functions over `(buffer, offset)`: the cursor holds no
//! position of its own, so a failed read cannot leave anything half
//! advanced. Multi-byte reads are big-endian unless named `_le`
//! (RIFF sizes and Vorbis comment lengths are little-endian).

use crate::error::{Error, Result};

/// Borrowed view over the input buffer with offset-addressed reads
#[derive(Clone, Copy)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Total buffer length in bytes
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Borrow `len` bytes starting at `offset` without copying
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let end = offset.checked_add(len).ok_or(Error::OutOfBounds {
            offset,
            len,
            available: self.buf.len(),
        })?;
        if end > self.buf.len() {
            return Err(Error::OutOfBounds {
                offset,
                len,
                available: self.buf.len(),
            });
        }
        Ok(&self.buf[offset..end])
    }

    pub fn u8(&self, offset: usize) -> Result<u8> {
        Ok(self.slice(offset, 1)?[0])
    }

    pub fn u16_be(&self, offset: usize) -> Result<u16> {
        let b = self.slice(offset, 2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn u16_le(&self, offset: usize) -> Result<u16> {
        let b = self.slice(offset, 2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// 24-bit big-endian read (FLAC block lengths, ID3v2.2 frame sizes)
    pub fn u24_be(&self, offset: usize) -> Result<u32> {
        let b = self.slice(offset, 3)?;
        Ok(((b[0] as u32) << 16) | ((b[1] as u32) << 8) | b[2] as u32)
    }

    pub fn u32_be(&self, offset: usize) -> Result<u32> {
        let b = self.slice(offset, 4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn u32_le(&self, offset: usize) -> Result<u32> {
        let b = self.slice(offset, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn u64_be(&self, offset: usize) -> Result<u64> {
        let b = self.slice(offset, 8)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Four-byte tag (frame/chunk/atom identifier)
    pub fn tag4(&self, offset: usize) -> Result<[u8; 4]> {
        let b = self.slice(offset, 4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    /// Syncsafe 32-bit read: four bytes, low 7 bits each, 28-bit value
    ///
    /// ID3v2 tag and frame sizes use this encoding so the size bytes
    /// can never be mistaken for an MPEG sync marker.
    pub fn syncsafe_u32(&self, offset: usize) -> Result<u32> {
        let b = self.slice(offset, 4)?;
        Ok(((b[0] as u32 & 0x7F) << 21)
            | ((b[1] as u32 & 0x7F) << 14)
            | ((b[2] as u32 & 0x7F) << 7)
            | (b[3] as u32 & 0x7F))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        let c = ByteCursor::new(&data);

        assert_eq!(c.u8(0).unwrap(), 0x01);
        assert_eq!(c.u8(4).unwrap(), 0x05);
        assert_eq!(c.u16_be(0).unwrap(), 0x0102);
        assert_eq!(c.u16_le(0).unwrap(), 0x0201);
        assert_eq!(c.u24_be(1).unwrap(), 0x020304);
        assert_eq!(c.u32_be(0).unwrap(), 0x01020304);
        assert_eq!(c.u32_le(0).unwrap(), 0x04030201);

        let wide = [0u8, 0, 0, 0, 1, 2, 3, 4];
        assert_eq!(ByteCursor::new(&wide).u64_be(0).unwrap(), 0x01020304);
    }

    #[test]
    fn test_out_of_bounds() {
        let data = [0x01, 0x02];
        let c = ByteCursor::new(&data);

        assert!(c.u8(2).is_err());
        assert!(c.u32_be(0).is_err());
        assert!(c.slice(1, 2).is_err());
        // Offsets near usize::MAX must not overflow the bounds check
        assert!(c.slice(usize::MAX, 2).is_err());
        assert!(c.u8(usize::MAX).is_err());
    }

    #[test]
    fn test_failed_read_is_side_effect_free() {
        let data = [0xAA];
        let c = ByteCursor::new(&data);

        assert!(c.u32_be(0).is_err());
        // Same cursor still serves valid reads afterwards
        assert_eq!(c.u8(0).unwrap(), 0xAA);
    }

    #[test]
    fn test_syncsafe_u32() {
        // 0x00 0x00 0x02 0x01 -> (2 << 7) | 1 = 257
        let data = [0x00, 0x00, 0x02, 0x01];
        let c = ByteCursor::new(&data);
        assert_eq!(c.syncsafe_u32(0).unwrap(), 257);

        // High bit of each byte is ignored
        let data = [0xFF, 0xFF, 0xFF, 0xFF];
        let c = ByteCursor::new(&data);
        assert_eq!(c.syncsafe_u32(0).unwrap(), 0x0FFF_FFFF);
    }

    #[test]
    fn test_tag4() {
        let data = *b"fLaCxx";
        let c = ByteCursor::new(&data);
        assert_eq!(&c.tag4(0).unwrap(), b"fLaC");
    }
}
