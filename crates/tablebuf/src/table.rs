//! Zero-copy table views and root access.
//!
//! A table starts with an `i32` soffset; its vtable lives at
//! `table_pos - soffset`. Field `slot` is at `table_pos + vtable[slot]`
//! unless the vtable entry is 0, in which case the field is absent.
//!
//! Nothing is read when a [`Table`] is created. Each accessor decodes only
//! the bytes it needs.

use crate::buffer::{ByteBuffer, SOFFSET_SIZE, UOFFSET_SIZE};
use crate::error::{Error, Result};
use crate::scalar::Scalar;
use crate::vector::{Follow, StringTag, TableTag, Vector, VectorTag};
use crate::vtable::{VTABLE_HEADER_SIZE, VTableView};

/// Length of a file identifier.
pub const FILE_IDENTIFIER_LENGTH: usize = 4;

/// Length of the optional `u32` size prefix.
pub const SIZE_PREFIX_LENGTH: usize = 4;

/// View of one table inside a buffer.
#[derive(Clone, Copy, Debug)]
pub struct Table<'a> {
    buf: ByteBuffer<'a>,
    pos: usize,
}

impl<'a> Table<'a> {
    /// View the table whose soffset is at `pos`.
    pub fn new(bytes: &'a [u8], pos: usize) -> Self {
        Self::from_buffer(ByteBuffer::new(bytes), pos)
    }

    pub(crate) fn from_buffer(buf: ByteBuffer<'a>, pos: usize) -> Self {
        Self { buf, pos }
    }

    /// Absolute position of the table start.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn buffer(&self) -> ByteBuffer<'a> {
        self.buf
    }

    /// Resolve this table's vtable.
    pub fn vtable(&self) -> Result<VTableView<'a>> {
        let soffset = self.buf.read_i32(self.pos)?;
        let vt_pos = self.pos as i64 - soffset as i64;
        let out_of_bounds = Error::OutOfBounds {
            offset: self.pos,
            len: SOFFSET_SIZE,
            buffer_len: self.buf.len(),
        };
        let vt_pos = usize::try_from(vt_pos).map_err(|_| out_of_bounds.clone())?;
        self.buf
            .read_bytes(vt_pos, VTABLE_HEADER_SIZE)
            .map_err(|_| out_of_bounds)?;
        Ok(VTableView::new(self.buf, vt_pos))
    }

    /// Offset of a field from the table start, 0 when absent.
    pub fn field_offset(&self, slot_byte_offset: u16) -> Result<u16> {
        self.vtable()?.get(slot_byte_offset)
    }

    /// Follow the `uoffset` stored at absolute position `pos`.
    pub fn indirect(&self, pos: usize) -> Result<usize> {
        self.buf.follow(pos)
    }

    /// Read a scalar field, falling back to `default` when absent.
    pub fn get<T: Scalar>(&self, slot_byte_offset: u16, default: T) -> Result<T> {
        Ok(self.get_optional(slot_byte_offset)?.unwrap_or(default))
    }

    /// Read a scalar field that has no default.
    pub fn get_optional<T: Scalar>(&self, slot_byte_offset: u16) -> Result<Option<T>> {
        match self.field_offset(slot_byte_offset)? {
            0 => Ok(None),
            o => self.buf.read(self.pos + o as usize).map(Some),
        }
    }

    /// Read a field stored as an offset to another object.
    pub fn get_ref<T: Follow<'a>>(&self, slot_byte_offset: u16) -> Result<Option<T::Inner>> {
        match self.field_offset(slot_byte_offset)? {
            0 => Ok(None),
            o => T::follow(self.buf, self.pos + o as usize).map(Some),
        }
    }

    pub fn get_str(&self, slot_byte_offset: u16) -> Result<Option<&'a str>> {
        self.get_ref::<StringTag>(slot_byte_offset)
    }

    pub fn get_table(&self, slot_byte_offset: u16) -> Result<Option<Table<'a>>> {
        self.get_ref::<TableTag>(slot_byte_offset)
    }

    pub fn get_vector<T: Follow<'a>>(&self, slot_byte_offset: u16) -> Result<Option<Vector<'a, T>>> {
        self.get_ref::<VectorTag<T>>(slot_byte_offset)
    }
}

/// Root table of a buffer whose root offset is at position 0.
pub fn root(bytes: &[u8]) -> Result<Table<'_>> {
    root_at(bytes, 0)
}

/// Root table of a buffer whose root offset is at `offset`.
pub fn root_at(bytes: &[u8], offset: usize) -> Result<Table<'_>> {
    let buf = ByteBuffer::new(bytes);
    let pos = buf.follow(offset)?;
    Ok(Table::from_buffer(buf, pos))
}

/// Root table, after checking the file identifier.
pub fn root_with_identifier<'a>(
    bytes: &'a [u8],
    identifier: &[u8; FILE_IDENTIFIER_LENGTH],
) -> Result<Table<'a>> {
    check_identifier(bytes, identifier, false)?;
    root(bytes)
}

/// Root table of a buffer written by `finish_size_prefixed`.
///
/// The prefix must not claim more bytes than the buffer holds; reads are
/// confined to the prefixed region.
pub fn size_prefixed_root(bytes: &[u8]) -> Result<Table<'_>> {
    let declared = ByteBuffer::new(bytes).read_u32(0)? as usize;
    let available = bytes.len() - SIZE_PREFIX_LENGTH;
    if declared > available {
        return Err(Error::BadSizePrefix {
            declared,
            available,
        });
    }
    root_at(&bytes[..SIZE_PREFIX_LENGTH + declared], SIZE_PREFIX_LENGTH)
}

/// Size-prefixed root table, after checking the file identifier.
pub fn size_prefixed_root_with_identifier<'a>(
    bytes: &'a [u8],
    identifier: &[u8; FILE_IDENTIFIER_LENGTH],
) -> Result<Table<'a>> {
    check_identifier(bytes, identifier, true)?;
    size_prefixed_root(bytes)
}

/// The 4 identifier bytes that follow the root offset.
pub fn file_identifier(bytes: &[u8], size_prefixed: bool) -> Result<[u8; FILE_IDENTIFIER_LENGTH]> {
    let at = identifier_pos(size_prefixed);
    let raw = ByteBuffer::new(bytes).read_bytes(at, FILE_IDENTIFIER_LENGTH)?;
    let mut ident = [0u8; FILE_IDENTIFIER_LENGTH];
    ident.copy_from_slice(raw);
    Ok(ident)
}

/// Whether the buffer carries `identifier`. Short buffers never match.
pub fn buffer_has_identifier(
    bytes: &[u8],
    identifier: &[u8; FILE_IDENTIFIER_LENGTH],
    size_prefixed: bool,
) -> bool {
    file_identifier(bytes, size_prefixed).is_ok_and(|found| &found == identifier)
}

fn check_identifier(
    bytes: &[u8],
    expected: &[u8; FILE_IDENTIFIER_LENGTH],
    size_prefixed: bool,
) -> Result<()> {
    let found = file_identifier(bytes, size_prefixed)?;
    if &found != expected {
        return Err(Error::BadIdentifier {
            expected: *expected,
            found,
        });
    }
    Ok(())
}

fn identifier_pos(size_prefixed: bool) -> usize {
    if size_prefixed {
        SIZE_PREFIX_LENGTH + UOFFSET_SIZE
    } else {
        UOFFSET_SIZE
    }
}
