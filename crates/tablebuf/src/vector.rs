//! Length-prefixed vectors and the [`Follow`] decoding trait.

use std::marker::PhantomData;

use crate::buffer::{ByteBuffer, UOFFSET_SIZE};
use crate::error::{Error, Result};
use crate::scalar::Scalar;
use crate::table::Table;

/// Marker for string objects.
#[derive(Debug)]
pub enum StringTag {}

/// Marker for table objects.
#[derive(Debug)]
pub enum TableTag {}

/// Marker for vectors whose elements are `T`.
#[derive(Debug)]
pub struct VectorTag<T>(std::convert::Infallible, PhantomData<T>);

/// Decodes a value found at a position in a buffer.
///
/// Scalars decode in place. Strings, tables and vectors are reached through
/// the `uoffset` stored at the position, so the same impl serves both table
/// fields and vector elements.
pub trait Follow<'a> {
    type Inner;

    /// Width of one element when stored inline in a vector.
    const SIZE: usize;

    fn follow(buf: ByteBuffer<'a>, pos: usize) -> Result<Self::Inner>;
}

macro_rules! impl_follow_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<'a> Follow<'a> for $ty {
                type Inner = $ty;
                const SIZE: usize = <$ty as Scalar>::SIZE;

                #[inline]
                fn follow(buf: ByteBuffer<'a>, pos: usize) -> Result<$ty> {
                    buf.read(pos)
                }
            }
        )*
    };
}

impl_follow_scalar!(bool, u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl<'a> Follow<'a> for StringTag {
    type Inner = &'a str;
    const SIZE: usize = UOFFSET_SIZE;

    fn follow(buf: ByteBuffer<'a>, pos: usize) -> Result<&'a str> {
        let at = buf.follow(pos)?;
        let (start, len) = buf.read_prefixed(at, 1)?;
        buf.read_str(start, len)
    }
}

impl<'a> Follow<'a> for TableTag {
    type Inner = Table<'a>;
    const SIZE: usize = UOFFSET_SIZE;

    fn follow(buf: ByteBuffer<'a>, pos: usize) -> Result<Table<'a>> {
        Ok(Table::from_buffer(buf, buf.follow(pos)?))
    }
}

impl<'a, T: Follow<'a>> Follow<'a> for VectorTag<T> {
    type Inner = Vector<'a, T>;
    const SIZE: usize = UOFFSET_SIZE;

    fn follow(buf: ByteBuffer<'a>, pos: usize) -> Result<Vector<'a, T>> {
        let at = buf.follow(pos)?;
        let (start, len) = buf.read_prefixed(at, T::SIZE)?;
        Ok(Vector {
            buf,
            start,
            len,
            _marker: PhantomData,
        })
    }
}

/// Zero-copy view over `[u32 count][elements]`.
///
/// The element region is bounds-checked once when the view is created.
pub struct Vector<'a, T> {
    buf: ByteBuffer<'a>,
    start: usize,
    len: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: Follow<'a>> Vector<'a, T> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Absolute position of the first element.
    pub fn pos(&self) -> usize {
        self.start
    }

    /// Decode element `index`.
    pub fn get(&self, index: usize) -> Result<T::Inner> {
        if index >= self.len {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        T::follow(self.buf, self.start + index * T::SIZE)
    }

    pub fn iter(self) -> impl Iterator<Item = Result<T::Inner>> + 'a
    where
        T: 'a,
    {
        (0..self.len).map(move |i| self.get(i))
    }
}

impl<'a> Vector<'a, u8> {
    /// The element bytes, borrowed from the buffer.
    pub fn as_bytes(&self) -> &'a [u8] {
        &self.buf.as_slice()[self.start..self.start + self.len]
    }
}

impl<T> Clone for Vector<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Vector<'_, T> {}

impl<T> std::fmt::Debug for Vector<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vector")
            .field("start", &self.start)
            .field("len", &self.len)
            .finish()
    }
}
