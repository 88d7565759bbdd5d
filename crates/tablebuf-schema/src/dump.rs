//! Human-readable buffer layout for debugging.
//!
//! Lists the buffer header, then every reachable table once, in the order
//! it is first reached: its position, its vtable and each declared slot.

use std::collections::{HashSet, VecDeque};
use std::fmt::Write as _;

use tablebuf::file_identifier;

use crate::colors::Colors;
use crate::dynamic::{DynTable, RootOptions, Value};
use crate::error::Result;
use crate::schema::Schema;

/// Render the layout of `bytes` as read through `schema`.
pub fn dump(schema: &Schema, bytes: &[u8], opts: &RootOptions, colors: Colors) -> Result<String> {
    let c = &colors;
    let root = DynTable::root(schema, bytes, opts)?;
    let mut out = String::new();

    writeln!(out, "{}[buffer]{}", c.section, c.reset).unwrap();
    write!(out, "size {}", bytes.len()).unwrap();
    if opts.size_prefixed {
        write!(out, "{}  ; size-prefixed{}", c.note, c.reset).unwrap();
    }
    out.push('\n');
    if opts.identifier.is_some() || schema.file_identifier.is_some() {
        let ident = file_identifier(bytes, opts.size_prefixed)?;
        let ident = String::from_utf8_lossy(&ident);
        writeln!(out, "identifier {}{ident:?}{}", c.string, c.reset).unwrap();
    }
    writeln!(out, "root {} @{}", root.name(), root.table().pos()).unwrap();
    out.push('\n');

    writeln!(out, "{}[tables]{}", c.section, c.reset).unwrap();
    let mut queue = VecDeque::from([root]);
    let mut seen = HashSet::from([root.table().pos()]);
    let mut first = true;
    while let Some(table) = queue.pop_front() {
        if !first {
            out.push('\n');
        }
        first = false;
        let mut reached = Vec::new();
        dump_table(&mut out, table, &mut reached, c)?;
        for child in reached {
            if seen.insert(child.table().pos()) {
                queue.push_back(child);
            }
        }
    }

    Ok(out)
}

fn dump_table<'a>(
    out: &mut String,
    table: DynTable<'a>,
    reached: &mut Vec<DynTable<'a>>,
    c: &Colors,
) -> Result<()> {
    let vtable = table.table().vtable()?;
    writeln!(
        out,
        "{}{}{} @{}{}  ; vtable @{} ({} bytes), table {} bytes{}",
        c.table,
        table.name(),
        c.reset,
        table.table().pos(),
        c.note,
        vtable.pos(),
        vtable.byte_size()?,
        vtable.table_size()?,
        c.reset,
    )
    .unwrap();

    for field in table.def().fields_by_id() {
        let id = field.id;
        let name = &field.name;
        if field.deprecated {
            writeln!(out, "  #{id} - {name}{}  ; deprecated{}", c.note, c.reset).unwrap();
            continue;
        }
        let offset = table.table().field_offset(field.slot_byte_offset())?;
        let value = table.read(field)?;
        match (offset, value) {
            (0, None) => {
                writeln!(out, "  #{id} - {name}{}  ; absent{}", c.note, c.reset).unwrap();
            }
            (0, Some(value)) => {
                let value = format_value(value, reached, c)?;
                writeln!(out, "  #{id} - {name} = {value}{}  ; default{}", c.note, c.reset)
                    .unwrap();
            }
            (offset, Some(value)) => {
                let value = format_value(value, reached, c)?;
                writeln!(out, "  #{id} +{offset} {name} = {value}").unwrap();
            }
            (offset, None) => {
                writeln!(out, "  #{id} +{offset} {name}").unwrap();
            }
        }
    }
    Ok(())
}

fn format_value<'a>(value: Value<'a>, reached: &mut Vec<DynTable<'a>>, c: &Colors) -> Result<String> {
    Ok(match value {
        Value::Bool(v) => v.to_string(),
        Value::Byte(v) => v.to_string(),
        Value::UByte(v) => v.to_string(),
        Value::Short(v) => v.to_string(),
        Value::UShort(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::UInt(v) => v.to_string(),
        Value::Long(v) => v.to_string(),
        Value::ULong(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::String(s) => format!("{}{s:?}{}", c.string, c.reset),
        Value::Table(t) => {
            reached.push(t);
            format!("{} @{}", t.name(), t.table().pos())
        }
        Value::Vector(v) => {
            let items = v
                .iter()
                .map(|item| item.and_then(|item| format_value(item, reached, c)))
                .collect::<Result<Vec<_>>>()?;
            format!("[{}]", items.join(", "))
        }
    })
}
