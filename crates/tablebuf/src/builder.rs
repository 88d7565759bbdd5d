//! Bottom-up buffer builder.
//!
//! Objects are written back to front: the buffer grows toward lower
//! addresses, and every object is finished before anything refers to it, so
//! offsets are always known when written and nothing is patched later.
//!
//! Offsets handed out by the builder ([`WipOffset`]) count bytes from the
//! end of the buffer, which keeps them stable when the buffer grows.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::buffer::{SOFFSET_SIZE, UOFFSET_SIZE};
use crate::invariants::{BuilderStateError, fail};
use crate::offset::WipOffset;
use crate::scalar::Scalar;
use crate::table::FILE_IDENTIFIER_LENGTH;
use crate::vector::{StringTag, TableTag, VectorTag};
use crate::vtable::{MAX_FIELDS, VTable, VTablePool};

/// Initial allocation for [`Builder::new`].
pub const DEFAULT_CAPACITY: usize = 1024;

/// Widest scalar in the format; table starts are aligned to it.
const MAX_ALIGN: usize = 8;

/// Largest buffer the 32-bit offsets can address safely.
const MAX_BUFFER_SIZE: usize = i32::MAX as usize;

/// A field written into the open table.
#[derive(Clone, Copy, Debug)]
struct FieldLoc {
    /// Builder offset of the field's first byte.
    offset: u32,
    slot: u16,
}

/// The table between `start_table` and `end_table`.
#[derive(Clone, Copy, Debug)]
struct OpenTable {
    /// Builder offset when the table was started.
    start: u32,
    num_fields: u16,
}

/// Serializes an object tree into one flat buffer.
///
/// States: idle, building a table (between [`start_table`](Self::start_table)
/// and [`end_table`](Self::end_table)), finished. Tables do not nest: build
/// children first, then the parent.
///
/// # Panics
/// Every method panics with a [`BuilderStateError`] message when called in
/// the wrong state. A build that panicked must be discarded.
#[derive(Debug)]
pub struct Builder {
    /// Backing storage; written bytes are `buf[head..]`.
    buf: Vec<u8>,
    head: usize,
    min_align: usize,
    fields: Vec<FieldLoc>,
    table: Option<OpenTable>,
    vtables: VTablePool,
    strings: HashMap<String, WipOffset<StringTag>>,
    force_defaults: bool,
    finished: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            head: capacity,
            min_align: 1,
            fields: Vec::new(),
            table: None,
            vtables: VTablePool::new(),
            strings: HashMap::new(),
            force_defaults: false,
            finished: false,
        }
    }

    /// Store scalar fields even when they equal their default.
    pub fn force_defaults(&mut self, force: bool) {
        self.force_defaults = force;
    }

    /// Start a new buffer, keeping the allocation.
    pub fn reset(&mut self) {
        self.head = self.buf.len();
        self.min_align = 1;
        self.fields.clear();
        self.table = None;
        self.vtables.clear();
        self.strings.clear();
        self.finished = false;
    }

    /// Bytes written so far.
    pub fn used_space(&self) -> usize {
        self.buf.len() - self.head
    }

    /// Number of distinct vtables written in this session.
    pub fn vtable_count(&self) -> usize {
        self.vtables.len()
    }

    /// Largest alignment any written value required.
    pub fn min_align(&self) -> usize {
        self.min_align
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn in_table(&self) -> bool {
        self.table.is_some()
    }

    pub(crate) fn open_num_fields(&self) -> Option<u16> {
        self.table.map(|t| t.num_fields)
    }

    fn offset(&self) -> u32 {
        self.used_space() as u32
    }

    // Low-level writes

    /// Double the allocation, moving written bytes to the new end.
    fn grow(&mut self) {
        let old_len = self.buf.len();
        if old_len >= MAX_BUFFER_SIZE {
            fail(BuilderStateError::BufferTooLarge);
        }
        let new_len = (old_len * 2).clamp(1, MAX_BUFFER_SIZE);
        let mut grown = vec![0u8; new_len];
        grown[new_len - old_len..].copy_from_slice(&self.buf);
        self.head += new_len - old_len;
        self.buf = grown;
        trace!(from = old_len, to = new_len, "grew buffer");
    }

    fn pad(&mut self, n: usize) {
        self.buf[self.head - n..self.head].fill(0);
        self.head -= n;
    }

    /// Make room for `size` bytes plus `additional` already-aligned bytes,
    /// padding so the value lands on a multiple of `size`.
    fn prep(&mut self, size: usize, additional: usize) {
        self.min_align = self.min_align.max(size);
        self.align(size, additional);
    }

    /// Pad so that `additional` more bytes end on a multiple of `alignment`,
    /// leaving room for one more `alignment`-sized value.
    fn align(&mut self, alignment: usize, additional: usize) {
        let align_size = (!(self.used_space() + additional)).wrapping_add(1) & (alignment - 1);
        while self.head < align_size + alignment + additional {
            self.grow();
        }
        self.pad(align_size);
    }

    /// Write a value into space reserved by [`prep`](Self::prep).
    fn place<T: Scalar>(&mut self, value: T) {
        self.head -= T::SIZE;
        value.write_le(&mut self.buf[self.head..]);
    }

    fn push<T: Scalar>(&mut self, value: T) -> u32 {
        self.prep(T::SIZE, 0);
        self.place(value);
        self.offset()
    }

    /// Write a uoffset pointing forward to an already written object.
    fn push_uoffset(&mut self, target: u32) -> u32 {
        self.prep(UOFFSET_SIZE, 0);
        self.ensure_written(target);
        let rel = self.offset() - target + UOFFSET_SIZE as u32;
        self.place(rel);
        self.offset()
    }

    // Tables

    /// Open a table with room for slot ids `0..num_fields`.
    pub fn start_table(&mut self, num_fields: u16) {
        self.ensure_not_finished();
        if self.in_table() {
            fail(BuilderStateError::NestedTable);
        }
        if num_fields > MAX_FIELDS {
            fail(BuilderStateError::TooManyFields(num_fields));
        }
        // Tables start on the widest scalar alignment, so field padding and
        // table size depend only on the fields written.
        self.align(MAX_ALIGN, 0);
        self.fields.clear();
        self.table = Some(OpenTable {
            start: self.offset(),
            num_fields,
        });
    }

    fn track_field(&mut self, slot: u16, offset: u32) {
        self.fields.push(FieldLoc { offset, slot });
    }

    /// Add a scalar field. Nothing is written when `value == default`
    /// (unless defaults are forced); readers reproduce the default.
    pub fn add_scalar<T: Scalar>(&mut self, slot: u16, value: T, default: T) {
        self.ensure_slot("add_scalar", slot);
        if value == default && !self.force_defaults {
            return;
        }
        self.add_scalar_always(slot, value);
    }

    /// Add a scalar field regardless of its default.
    pub fn add_scalar_always<T: Scalar>(&mut self, slot: u16, value: T) {
        self.ensure_slot("add_scalar_always", slot);
        let offset = self.push(value);
        self.track_field(slot, offset);
    }

    /// Add a scalar field without a default: written only when present.
    pub fn add_optional<T: Scalar>(&mut self, slot: u16, value: Option<T>) {
        self.ensure_slot("add_optional", slot);
        if let Some(value) = value {
            self.add_scalar_always(slot, value);
        }
    }

    /// Add a field referring to a finished string, table or vector.
    pub fn add_offset<T>(&mut self, slot: u16, target: WipOffset<T>) {
        self.ensure_slot("add_offset", slot);
        let offset = self.push_uoffset(target.value());
        self.track_field(slot, offset);
    }

    /// Close the open table and write (or reuse) its vtable.
    pub fn end_table(&mut self) -> WipOffset<TableTag> {
        self.ensure_not_finished();
        let Some(open) = self.table.take() else {
            fail(BuilderStateError::NotInTable("end_table"));
        };

        let object_offset = self.push(0i32);
        let table_size = (object_offset - open.start) as usize;
        let table_size = u16::try_from(table_size)
            .unwrap_or_else(|_| fail(BuilderStateError::TableTooLarge(table_size)));

        let mut slots = vec![0u16; open.num_fields as usize];
        for loc in &self.fields {
            slots[loc.slot as usize] = (object_offset - loc.offset) as u16;
        }
        let vtable = VTable::new(table_size, slots);

        let vtable_offset = match self.vtables.lookup(&vtable) {
            Some(existing) => {
                trace!(offset = existing, "reused vtable");
                existing
            }
            None => {
                for &slot in vtable.slots().iter().rev() {
                    self.push(slot);
                }
                self.push(vtable.table_size());
                let written = self.push(vtable.byte_size() as u16);
                trace!(offset = written, bytes = vtable.byte_size(), "wrote vtable");
                self.vtables.register(vtable, written);
                written
            }
        };

        let table_pos = self.buf.len() - object_offset as usize;
        let soffset = vtable_offset as i32 - object_offset as i32;
        soffset.write_le(&mut self.buf[table_pos..table_pos + SOFFSET_SIZE]);

        self.fields.clear();
        WipOffset::new(object_offset)
    }

    // Strings and vectors

    /// Write `[u32 len][utf8 bytes][0]`, 4-byte aligned.
    pub fn create_string(&mut self, s: &str) -> WipOffset<StringTag> {
        self.ensure_idle("create_string");
        let bytes = s.as_bytes();
        self.prep(UOFFSET_SIZE, bytes.len() + 1);
        self.place(0u8);
        self.head -= bytes.len();
        self.buf[self.head..self.head + bytes.len()].copy_from_slice(bytes);
        self.place(bytes.len() as u32);
        WipOffset::new(self.offset())
    }

    /// Like [`create_string`](Self::create_string), but identical strings
    /// within a session share one copy.
    pub fn create_shared_string(&mut self, s: &str) -> WipOffset<StringTag> {
        self.ensure_idle("create_shared_string");
        if let Some(&existing) = self.strings.get(s) {
            return existing;
        }
        let offset = self.create_string(s);
        self.strings.insert(s.to_owned(), offset);
        offset
    }

    /// Reserve space for a vector body so its elements and the leading
    /// count both land aligned.
    fn start_vector(&mut self, elem_size: usize, len: usize) {
        let byte_len = elem_size * len;
        self.prep(UOFFSET_SIZE, byte_len);
        self.prep(elem_size, byte_len);
    }

    fn end_vector<T>(&mut self, len: usize) -> WipOffset<T> {
        self.place(len as u32);
        WipOffset::new(self.offset())
    }

    /// Write a vector of scalars.
    pub fn create_vector<T: Scalar>(&mut self, items: &[T]) -> WipOffset<VectorTag<T>> {
        self.ensure_idle("create_vector");
        self.start_vector(T::SIZE, items.len());
        for &item in items.iter().rev() {
            self.place(item);
        }
        self.end_vector(items.len())
    }

    pub fn create_byte_vector(&mut self, bytes: &[u8]) -> WipOffset<VectorTag<u8>> {
        self.ensure_idle("create_byte_vector");
        self.start_vector(1, bytes.len());
        self.head -= bytes.len();
        self.buf[self.head..self.head + bytes.len()].copy_from_slice(bytes);
        self.end_vector(bytes.len())
    }

    /// Write a vector of offsets to finished objects (tables, strings).
    pub fn create_vector_of_offsets<T>(
        &mut self,
        items: &[WipOffset<T>],
    ) -> WipOffset<VectorTag<T>> {
        self.ensure_idle("create_vector_of_offsets");
        self.start_vector(UOFFSET_SIZE, items.len());
        for item in items.iter().rev() {
            self.push_uoffset(item.value());
        }
        self.end_vector(items.len())
    }

    pub fn create_vector_of_strings<S: AsRef<str>>(
        &mut self,
        items: &[S],
    ) -> WipOffset<VectorTag<StringTag>> {
        let offsets: Vec<_> = items
            .iter()
            .map(|s| self.create_string(s.as_ref()))
            .collect();
        self.create_vector_of_offsets(&offsets)
    }

    // Finishing

    /// Write the root offset and optional file identifier.
    pub fn finish(
        &mut self,
        root: WipOffset<TableTag>,
        identifier: Option<&[u8; FILE_IDENTIFIER_LENGTH]>,
    ) -> &[u8] {
        self.finish_with(root, identifier, false)
    }

    /// Like [`finish`](Self::finish), with a leading `u32` byte count.
    pub fn finish_size_prefixed(
        &mut self,
        root: WipOffset<TableTag>,
        identifier: Option<&[u8; FILE_IDENTIFIER_LENGTH]>,
    ) -> &[u8] {
        self.finish_with(root, identifier, true)
    }

    fn finish_with(
        &mut self,
        root: WipOffset<TableTag>,
        identifier: Option<&[u8; FILE_IDENTIFIER_LENGTH]>,
        size_prefixed: bool,
    ) -> &[u8] {
        self.ensure_idle("finish");
        if root.value() == 0 {
            fail(BuilderStateError::NoRoot);
        }

        let mut prefix = UOFFSET_SIZE;
        if identifier.is_some() {
            prefix += FILE_IDENTIFIER_LENGTH;
        }
        if size_prefixed {
            prefix += UOFFSET_SIZE;
        }
        self.prep(self.min_align, prefix);

        if let Some(identifier) = identifier {
            self.prep(UOFFSET_SIZE, FILE_IDENTIFIER_LENGTH);
            for &b in identifier.iter().rev() {
                self.place(b);
            }
        }
        self.push_uoffset(root.value());
        if size_prefixed {
            let size = self.offset();
            self.push(size);
        }

        self.finished = true;
        debug!(
            bytes = self.used_space(),
            vtables = self.vtables.len(),
            size_prefixed,
            "finished buffer"
        );
        self.finished_data()
    }

    /// The finished buffer.
    pub fn finished_data(&self) -> &[u8] {
        if !self.finished {
            fail(BuilderStateError::NotFinished);
        }
        &self.buf[self.head..]
    }

    /// Take the finished buffer, releasing the builder.
    pub fn into_finished(mut self) -> Vec<u8> {
        if !self.finished {
            fail(BuilderStateError::NotFinished);
        }
        self.buf.drain(..self.head);
        self.buf
    }
}
