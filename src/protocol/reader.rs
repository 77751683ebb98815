//! Bounds-checked little-endian reads over a block window

use crate::DecodeError;

/// Read-only view over the bytes of one block.
///
/// Every accessor checks bounds and fails with [`DecodeError::InsufficientData`]
/// instead of reading past the window.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fail unless the window holds at least `needed` bytes.
    pub fn require(&self, needed: usize) -> Result<(), DecodeError> {
        if self.data.len() < needed {
            return Err(DecodeError::insufficient(needed, self.data.len()));
        }
        Ok(())
    }

    /// Exactly `len` bytes starting at `offset`.
    pub fn bytes(&self, offset: usize, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = offset.checked_add(len).ok_or(DecodeError::insufficient(usize::MAX, self.len()))?;
        self.data.get(offset..end).ok_or(DecodeError::insufficient(end, self.data.len()))
    }

    /// All bytes from `offset` to the end of the window (empty past the end).
    pub fn rest(&self, offset: usize) -> &'a [u8] {
        self.data.get(offset..).unwrap_or(&[])
    }

    fn array<const N: usize>(&self, offset: usize) -> Result<[u8; N], DecodeError> {
        let bytes = self.bytes(offset, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn u32(&self, offset: usize) -> Result<u32, DecodeError> {
        self.array::<4>(offset).map(u32::from_le_bytes)
    }

    pub fn i32(&self, offset: usize) -> Result<i32, DecodeError> {
        self.array::<4>(offset).map(i32::from_le_bytes)
    }

    pub fn i64(&self, offset: usize) -> Result<i64, DecodeError> {
        self.array::<8>(offset).map(i64::from_le_bytes)
    }

    pub fn f32(&self, offset: usize) -> Result<f32, DecodeError> {
        self.array::<4>(offset).map(f32::from_le_bytes)
    }

    pub fn f64(&self, offset: usize) -> Result<f64, DecodeError> {
        self.array::<8>(offset).map(f64::from_le_bytes)
    }

    /// Fixed-width string field, truncated at the first NUL.
    pub fn fixed_str(&self, offset: usize, width: usize) -> Result<String, DecodeError> {
        self.bytes(offset, width).map(nul_terminated)
    }

    /// NUL-terminated string running from `offset` to the end of the window.
    ///
    /// A missing terminator takes the whole remainder.
    pub fn trailing_str(&self, offset: usize) -> String {
        nul_terminated(self.rest(offset))
    }
}

/// Text up to the first NUL (or the whole slice), lossily decoded.
pub fn nul_terminated(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_bounds_checked() {
        let data = [1u8, 0, 0, 0, 2, 0, 0];
        let reader = ByteReader::new(&data);

        assert_eq!(reader.u32(0), Ok(1));
        assert_eq!(reader.u32(4), Err(DecodeError::insufficient(8, 7)));
        assert!(reader.f64(0).is_err());
        assert!(reader.bytes(usize::MAX, 2).is_err());
        assert_eq!(reader.rest(10), &[] as &[u8]);
    }

    #[test]
    fn strings_stop_at_terminator() {
        let data = b"B737\0garbage";
        let reader = ByteReader::new(data);

        assert_eq!(reader.trailing_str(0), "B737");
        assert_eq!(reader.fixed_str(0, 3).as_deref(), Ok("B73"));
        assert_eq!(reader.trailing_str(5), "garbage");
        assert_eq!(reader.trailing_str(100), "");
    }
}
