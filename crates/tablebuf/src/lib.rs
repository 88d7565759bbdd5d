#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Zero-copy reader and bottom-up builder for vtable-encoded table buffers.
//!
//! This crate contains:
//! - Bounds-checked little-endian buffer access ([`ByteBuffer`], [`Scalar`])
//! - Table shape descriptors and their per-session pool ([`VTable`])
//! - Lazy read views ([`Table`], [`Vector`]) and root access
//! - The backward-growing [`Builder`]
//!
//! Wire format (all integers little-endian):
//! - Root: `[u32 root][4-byte identifier?][pad][objects]`
//! - Table: `[i32 soffset_to_vtable][fields]`
//! - VTable: `[u16 vtable_size][u16 table_size][u16 slot]*`
//! - String: `[u32 len][utf8][0]`, Vector: `[u32 count][elements]`

pub mod buffer;
pub mod builder;
pub mod error;
mod invariants;
pub mod offset;
pub mod scalar;
pub mod table;
pub mod vector;
pub mod vtable;

#[cfg(test)]
mod roundtrip_tests;

pub use buffer::ByteBuffer;
pub use builder::Builder;
pub use error::{Error, Result};
pub use invariants::BuilderStateError;
pub use offset::WipOffset;
pub use scalar::Scalar;
pub use table::{
    FILE_IDENTIFIER_LENGTH, SIZE_PREFIX_LENGTH, Table, buffer_has_identifier, file_identifier,
    root, root_at, root_with_identifier, size_prefixed_root, size_prefixed_root_with_identifier,
};
pub use vector::{Follow, StringTag, TableTag, Vector, VectorTag};
pub use vtable::{
    MAX_FIELDS, MAX_SLOT_ID, VTable, VTablePool, VTableView, slot_byte_offset, slot_id,
};
