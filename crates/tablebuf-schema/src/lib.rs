#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Schema descriptions as data, and everything built on them.
//!
//! - [`Schema`]: tables, fields, slot ids and defaults, loaded from JSON
//! - [`DynTable`]: reads any field of any table by name or slot id
//! - [`encode_json`] / [`decode_json`]: JSON documents to buffers and back
//! - [`dump`](dump::dump): annotated layout of a buffer

pub mod colors;
pub mod decode;
pub mod dump;
pub mod dynamic;
pub mod encode;
pub mod error;
pub mod schema;

#[cfg(test)]
mod codec_tests;
#[cfg(test)]
mod dynamic_tests;
#[cfg(test)]
mod test_utils;

pub use colors::Colors;
pub use decode::{DecodeOptions, MAX_DEPTH, decode_json, table_to_json, value_to_json};
pub use dump::dump;
pub use dynamic::{DynTable, DynVector, RootOptions, Value};
pub use encode::{EncodeOptions, encode_json};
pub use error::{Result, SchemaError};
pub use schema::{FieldDef, FieldType, MAX_SLOT_ID, Schema, TableDef, parse_identifier};
