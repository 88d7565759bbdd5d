//! Table shape descriptors.
//!
//! Wire layout: `[u16 vtable_byte_size][u16 table_byte_size][u16 slot]*`,
//! where a slot of 0 means the field is absent and the reader uses its
//! default. Slot ids need not be contiguous: a reserved or deprecated id is
//! simply never written.

use std::collections::HashMap;

use crate::buffer::{ByteBuffer, VOFFSET_SIZE};
use crate::error::Result;

/// Size of the two leading `u16` words of a vtable.
pub const VTABLE_HEADER_SIZE: usize = 2 * VOFFSET_SIZE;

/// Highest slot id whose vtable size still fits the `u16` size word.
pub const MAX_SLOT_ID: u16 = ((u16::MAX as usize - VTABLE_HEADER_SIZE) / VOFFSET_SIZE - 1) as u16;

/// Most slots a single table may declare.
pub const MAX_FIELDS: u16 = MAX_SLOT_ID + 1;

/// Byte position of a slot inside a vtable (`4 + 2 * slot_id`).
///
/// Accessors address fields by this value, e.g. slot 0 is `4`, slot 3 is `10`.
///
/// # Panics
/// If `slot_id` exceeds [`MAX_SLOT_ID`].
#[inline]
pub const fn slot_byte_offset(slot_id: u16) -> u16 {
    assert!(slot_id <= MAX_SLOT_ID, "slot id exceeds MAX_SLOT_ID");
    (VTABLE_HEADER_SIZE + slot_id as usize * VOFFSET_SIZE) as u16
}

/// Inverse of [`slot_byte_offset`].
#[inline]
pub const fn slot_id(slot_byte_offset: u16) -> u16 {
    (slot_byte_offset as usize - VTABLE_HEADER_SIZE) as u16 / VOFFSET_SIZE as u16
}

/// One table shape: the table's byte size and per-slot field offsets.
///
/// Equality is exact. Two tables share a vtable only if they have the same
/// slot count, the same offset for every slot and the same size.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct VTable {
    table_size: u16,
    slots: Vec<u16>,
}

impl VTable {
    /// Create a vtable, dropping trailing absent slots.
    pub fn new(table_size: u16, mut slots: Vec<u16>) -> Self {
        while slots.last() == Some(&0) {
            slots.pop();
        }
        Self { table_size, slots }
    }

    /// Size of the table body in bytes, including its soffset.
    pub fn table_size(&self) -> u16 {
        self.table_size
    }

    pub fn slots(&self) -> &[u16] {
        &self.slots
    }

    /// Field offset for a slot id, 0 when absent.
    pub fn slot(&self, slot_id: u16) -> u16 {
        self.slots.get(slot_id as usize).copied().unwrap_or(0)
    }

    /// Encoded size of this vtable.
    pub fn byte_size(&self) -> usize {
        VTABLE_HEADER_SIZE + self.slots.len() * VOFFSET_SIZE
    }

    /// Encode as it appears in a buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.byte_size());
        bytes.extend_from_slice(&(self.byte_size() as u16).to_le_bytes());
        bytes.extend_from_slice(&self.table_size.to_le_bytes());
        for slot in &self.slots {
            bytes.extend_from_slice(&slot.to_le_bytes());
        }
        bytes
    }
}

/// Vtables emitted during one build session, keyed by content.
///
/// Positions are builder offsets (bytes from the end of the buffer).
#[derive(Debug, Default)]
pub struct VTablePool {
    written: HashMap<VTable, u32>,
}

impl VTablePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of an identical vtable already written, if any.
    pub fn lookup(&self, vtable: &VTable) -> Option<u32> {
        self.written.get(vtable).copied()
    }

    pub fn register(&mut self, vtable: VTable, offset: u32) {
        self.written.insert(vtable, offset);
    }

    /// Number of distinct vtables written.
    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }

    pub fn clear(&mut self) {
        self.written.clear();
    }
}

/// Read-side view of a vtable inside a finished buffer.
#[derive(Clone, Copy, Debug)]
pub struct VTableView<'a> {
    buf: ByteBuffer<'a>,
    pos: usize,
}

impl<'a> VTableView<'a> {
    pub fn new(buf: ByteBuffer<'a>, pos: usize) -> Self {
        Self { buf, pos }
    }

    /// Absolute position of the vtable.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn byte_size(&self) -> Result<u16> {
        self.buf.read_u16(self.pos)
    }

    pub fn table_size(&self) -> Result<u16> {
        self.buf.read_u16(self.pos + VOFFSET_SIZE)
    }

    /// Number of slots this vtable covers.
    pub fn slot_count(&self) -> Result<usize> {
        let size = self.byte_size()? as usize;
        Ok(size.saturating_sub(VTABLE_HEADER_SIZE) / VOFFSET_SIZE)
    }

    /// Field offset stored at `slot_byte_offset`, 0 if absent or beyond
    /// the end of this vtable.
    pub fn get(&self, slot_byte_offset: u16) -> Result<u16> {
        let slot = slot_byte_offset as usize;
        if slot < VTABLE_HEADER_SIZE || slot + VOFFSET_SIZE > self.byte_size()? as usize {
            return Ok(0);
        }
        self.buf.read_u16(self.pos + slot)
    }

    /// Decode into an owned [`VTable`].
    pub fn to_vtable(&self) -> Result<VTable> {
        let slots = (0..self.slot_count()?)
            .map(|i| self.buf.read_u16(self.pos + VTABLE_HEADER_SIZE + i * VOFFSET_SIZE))
            .collect::<Result<Vec<_>>>()?;
        Ok(VTable::new(self.table_size()?, slots))
    }
}
