//! Bounds-checked view over a finished buffer.
//!
//! Every read checks `offset + size <= len` and fails with
//! [`Error::OutOfBounds`] instead of clamping. Writes live only on the
//! builder's private storage.

use crate::error::{Error, Result};
use crate::scalar::Scalar;

/// Size of an unsigned forward offset (`uoffset`).
pub const UOFFSET_SIZE: usize = 4;

/// Size of the signed table-to-vtable offset (`soffset`).
pub const SOFFSET_SIZE: usize = 4;

/// Size of a vtable entry (`voffset`).
pub const VOFFSET_SIZE: usize = 2;

/// Read-only little-endian view over buffer bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ByteBuffer<'a> {
    bytes: &'a [u8],
}

impl<'a> ByteBuffer<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Number of bytes in the buffer.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The underlying bytes.
    pub fn as_slice(&self) -> &'a [u8] {
        self.bytes
    }

    /// Borrow `len` bytes starting at `offset`.
    pub fn read_bytes(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(Error::OutOfBounds {
                offset,
                len,
                buffer_len: self.bytes.len(),
            })?;
        Ok(&self.bytes[offset..end])
    }

    /// Decode a scalar at `offset`.
    #[inline]
    pub fn read<T: Scalar>(&self, offset: usize) -> Result<T> {
        self.read_bytes(offset, T::SIZE).map(T::from_le)
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        self.read(offset)
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        self.read(offset)
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        self.read(offset)
    }

    pub fn read_u64(&self, offset: usize) -> Result<u64> {
        self.read(offset)
    }

    pub fn read_i8(&self, offset: usize) -> Result<i8> {
        self.read(offset)
    }

    pub fn read_i16(&self, offset: usize) -> Result<i16> {
        self.read(offset)
    }

    pub fn read_i32(&self, offset: usize) -> Result<i32> {
        self.read(offset)
    }

    pub fn read_i64(&self, offset: usize) -> Result<i64> {
        self.read(offset)
    }

    pub fn read_f32(&self, offset: usize) -> Result<f32> {
        self.read(offset)
    }

    pub fn read_f64(&self, offset: usize) -> Result<f64> {
        self.read(offset)
    }

    /// Borrow `len` bytes at `offset` as UTF-8.
    pub fn read_str(&self, offset: usize, len: usize) -> Result<&'a str> {
        let bytes = self.read_bytes(offset, len)?;
        std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8 { offset })
    }

    /// Follow the `uoffset` stored at `pos` to an absolute position.
    ///
    /// The target must have room for the 4-byte word every object starts
    /// with (string length, vector count, or table soffset).
    pub fn follow(&self, pos: usize) -> Result<usize> {
        let rel = self.read_u32(pos)? as usize;
        let target = pos.checked_add(rel).ok_or(Error::OutOfBounds {
            offset: pos,
            len: rel,
            buffer_len: self.bytes.len(),
        })?;
        self.read_bytes(target, UOFFSET_SIZE)?;
        Ok(target)
    }

    /// Read a length-prefixed region at `pos`: `[u32 len][bytes]`.
    pub fn read_prefixed(&self, pos: usize, elem_size: usize) -> Result<(usize, usize)> {
        let count = self.read_u32(pos)? as usize;
        let start = pos + UOFFSET_SIZE;
        let byte_len = count.checked_mul(elem_size).ok_or(Error::OutOfBounds {
            offset: start,
            len: usize::MAX,
            buffer_len: self.bytes.len(),
        })?;
        self.read_bytes(start, byte_len)?;
        Ok((start, count))
    }
}

impl std::fmt::Debug for ByteBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("len", &self.bytes.len())
            .finish()
    }
}
