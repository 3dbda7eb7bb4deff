//! Little-endian primitive reader for the replay container.

use super::DecodeError;

/// Cursor over the raw replay bytes.
pub(crate) struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        ByteReader { buf, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub(crate) fn take(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::Truncated {
                field,
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, field)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self, field: &'static str) -> Result<u8, DecodeError> {
        Ok(self.array::<1>(field)?[0])
    }

    pub(crate) fn u16(&mut self, field: &'static str) -> Result<u16, DecodeError> {
        self.array(field).map(u16::from_le_bytes)
    }

    pub(crate) fn i32(&mut self, field: &'static str) -> Result<i32, DecodeError> {
        self.array(field).map(i32::from_le_bytes)
    }

    pub(crate) fn i64(&mut self, field: &'static str) -> Result<i64, DecodeError> {
        self.array(field).map(i64::from_le_bytes)
    }

    pub(crate) fn f64(&mut self, field: &'static str) -> Result<f64, DecodeError> {
        self.array(field).map(f64::from_le_bytes)
    }

    /// Unsigned LEB128, capped at 64 bits.
    pub(crate) fn uleb128(&mut self, field: &'static str) -> Result<u64, DecodeError> {
        let start = self.pos;
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.u8(field)?;
            if shift >= 64 {
                return Err(DecodeError::InvalidLength { field, offset: start });
            }
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// A string as written by the game: `0x00` for absent, or `0x0b`,
    /// a ULEB128 byte length and UTF-8 data.
    pub(crate) fn osu_string(&mut self, field: &'static str) -> Result<String, DecodeError> {
        let offset = self.pos;
        match self.u8(field)? {
            0x00 => Ok(String::new()),
            0x0b => {
                let len = self.uleb128(field)?;
                let len = usize::try_from(len)
                    .map_err(|_| DecodeError::InvalidLength { field, offset })?;
                let bytes = self.take(len, field)?;
                String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8 { field, offset })
            }
            marker => Err(DecodeError::BadStringMarker { field, offset, marker }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_values() {
        let bytes = [0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xff];
        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.u16("a").unwrap(), 0x1234);
        assert_eq!(r.i32("b").unwrap(), 0x1234_5678);
        assert_eq!(r.remaining(), 1);
        assert!(matches!(
            r.i32("c"),
            Err(DecodeError::Truncated { field: "c", offset: 6, needed: 4, available: 1 })
        ));
    }

    #[test]
    fn reads_multi_byte_uleb128() {
        let bytes = [0xe5, 0x8e, 0x26];
        assert_eq!(ByteReader::new(&bytes).uleb128("n").unwrap(), 624_485);
    }

    #[test]
    fn reads_strings() {
        let bytes = [0x00, 0x0b, 0x03, b'a', b'b', b'c', 0x07];
        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.osu_string("empty").unwrap(), "");
        assert_eq!(r.osu_string("abc").unwrap(), "abc");
        assert!(matches!(
            r.osu_string("bad"),
            Err(DecodeError::BadStringMarker { marker: 0x07, .. })
        ));
    }

    #[test]
    fn rejects_overlong_uleb128() {
        let bytes = [0xff; 12];
        assert!(matches!(
            ByteReader::new(&bytes).uleb128("n"),
            Err(DecodeError::InvalidLength { .. })
        ));
    }
}
