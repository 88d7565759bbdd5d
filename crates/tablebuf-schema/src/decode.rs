//! Buffer to JSON.

use serde_json::{Map, Value as Json};

use crate::dynamic::{DynTable, RootOptions, Value};
use crate::error::{Result, SchemaError};
use crate::schema::Schema;

/// Deepest table nesting `decode_json` follows.
pub const MAX_DEPTH: usize = 64;

#[derive(Clone, Copy, Debug, Default)]
pub struct DecodeOptions {
    pub root: RootOptions,
    /// Also emit absent scalar fields, with their default value.
    pub include_defaults: bool,
}

/// Decode the root table of `bytes` into a JSON object.
///
/// Fields appear in slot order. Absent strings, tables and vectors are
/// omitted, as are deprecated fields.
pub fn decode_json(schema: &Schema, bytes: &[u8], opts: &DecodeOptions) -> Result<Json> {
    let root = DynTable::root(schema, bytes, &opts.root)?;
    table_to_json(root, opts.include_defaults)
}

pub fn table_to_json(table: DynTable<'_>, include_defaults: bool) -> Result<Json> {
    table_at_depth(table, include_defaults, 0)
}

pub fn value_to_json(value: Value<'_>, include_defaults: bool) -> Result<Json> {
    value_at_depth(value, include_defaults, 0)
}

fn table_at_depth(table: DynTable<'_>, include_defaults: bool, depth: usize) -> Result<Json> {
    if depth >= MAX_DEPTH {
        return Err(SchemaError::TooDeep {
            table: table.name().to_owned(),
            max: MAX_DEPTH,
        });
    }
    let mut object = Map::new();
    for field in table.def().fields_by_id() {
        if field.deprecated {
            continue;
        }
        if field.ty.is_scalar() && !include_defaults && !table.is_present(field)? {
            continue;
        }
        if let Some(value) = table.read(field)? {
            let value = value_at_depth(value, include_defaults, depth + 1)?;
            object.insert(field.name.clone(), value);
        }
    }
    Ok(Json::Object(object))
}

fn value_at_depth(value: Value<'_>, include_defaults: bool, depth: usize) -> Result<Json> {
    Ok(match value {
        Value::Bool(b) => Json::Bool(b),
        Value::Byte(n) => n.into(),
        Value::UByte(n) => n.into(),
        Value::Short(n) => n.into(),
        Value::UShort(n) => n.into(),
        Value::Int(n) => n.into(),
        Value::UInt(n) => n.into(),
        Value::Long(n) => n.into(),
        Value::ULong(n) => n.into(),
        // Non-finite floats have no JSON form and become null.
        Value::Float(n) => n.into(),
        Value::Double(n) => n.into(),
        Value::String(s) => s.into(),
        Value::Table(t) => table_at_depth(t, include_defaults, depth)?,
        Value::Vector(v) => Json::Array(
            v.iter()
                .map(|elem| elem.and_then(|elem| value_at_depth(elem, include_defaults, depth)))
                .collect::<Result<_>>()?,
        ),
    })
}
