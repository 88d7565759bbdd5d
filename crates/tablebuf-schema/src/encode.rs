//! JSON to buffer.
//!
//! Children are built before their parents: for each table, strings,
//! vectors and subtables are written first, then the table itself.

use serde_json::Value as Json;
use tablebuf::{Builder, FILE_IDENTIFIER_LENGTH, TableTag, WipOffset};
use tracing::{debug, warn};

use crate::dynamic::Value;
use crate::error::{Result, SchemaError};
use crate::schema::{FieldDef, FieldType, Schema};

#[derive(Clone, Copy, Debug, Default)]
pub struct EncodeOptions {
    pub size_prefixed: bool,
    /// Store scalars equal to their default.
    pub force_defaults: bool,
    /// Overrides the schema's file identifier.
    pub identifier: Option<[u8; FILE_IDENTIFIER_LENGTH]>,
}

/// A field whose value is ready to be added to the open table.
enum Pending {
    Scalar(u16, Value<'static>, Option<Value<'static>>),
    Offset(u16, u32),
}

impl Pending {
    fn slot(&self) -> u16 {
        match *self {
            Pending::Scalar(slot, ..) | Pending::Offset(slot, _) => slot,
        }
    }
}

/// Encode a JSON document as a buffer of the schema's root type.
pub fn encode_json(schema: &Schema, json: &Json, opts: &EncodeOptions) -> Result<Vec<u8>> {
    let identifier = match opts.identifier {
        Some(ident) => Some(ident),
        None => schema.identifier()?,
    };

    let mut encoder = Encoder {
        schema,
        builder: Builder::new(),
    };
    encoder.builder.force_defaults(opts.force_defaults);

    let root = encoder.table(&schema.root, json)?;
    let builder = &mut encoder.builder;
    if opts.size_prefixed {
        builder.finish_size_prefixed(root, identifier.as_ref());
    } else {
        builder.finish(root, identifier.as_ref());
    }
    debug!(
        root = %schema.root,
        vtables = builder.vtable_count(),
        "encoded document"
    );
    Ok(encoder.builder.into_finished())
}

struct Encoder<'s> {
    schema: &'s Schema,
    builder: Builder,
}

impl Encoder<'_> {
    fn table(&mut self, name: &str, json: &Json) -> Result<WipOffset<TableTag>> {
        let def = self.schema.table(name)?;
        let Json::Object(object) = json else {
            return Err(SchemaError::ExpectedObject {
                table: name.to_owned(),
                found: kind(json),
            });
        };

        let mut pending = Vec::with_capacity(object.len());
        for (key, value) in object {
            let field = def.field(key).ok_or_else(|| SchemaError::UnknownField {
                table: name.to_owned(),
                field: key.clone(),
            })?;
            if field.deprecated {
                warn!(table = name, field = key.as_str(), "skipping deprecated field");
                continue;
            }
            if value.is_null() {
                continue;
            }
            pending.push((field, self.field(name, field, value)?));
        }

        // Largest first keeps padding inside the table to a minimum.
        pending.sort_by_key(|(field, p)| (std::cmp::Reverse(field.ty.inline_size()), p.slot()));

        let b = &mut self.builder;
        b.start_table(def.num_fields());
        for (_, p) in pending {
            match p {
                Pending::Scalar(slot, value, default) => add_scalar(b, slot, value, default),
                Pending::Offset(slot, offset) => b.add_offset(slot, WipOffset::<()>::new(offset)),
            }
        }
        Ok(b.end_table())
    }

    fn field(&mut self, table: &str, field: &FieldDef, json: &Json) -> Result<Pending> {
        let slot = field.id;
        let offset = match &field.ty {
            FieldType::String => {
                let s = json
                    .as_str()
                    .ok_or_else(|| mismatch(table, field, &field.ty, json))?;
                self.builder.create_string(s).value()
            }
            FieldType::Table(name) => self.table(name, json)?.value(),
            FieldType::Vector(elem) => self.vector(table, field, elem, json)?,
            ty => {
                let value = Value::from_json_scalar(ty, json)
                    .ok_or_else(|| mismatch(table, field, ty, json))?;
                return Ok(Pending::Scalar(slot, value, field.default_value()));
            }
        };
        Ok(Pending::Offset(slot, offset))
    }

    fn vector(&mut self, table: &str, field: &FieldDef, elem: &FieldType, json: &Json) -> Result<u32> {
        let Json::Array(items) = json else {
            return Err(mismatch(table, field, &field.ty, json));
        };

        macro_rules! scalars {
            ($variant:ident) => {{
                let values = items
                    .iter()
                    .map(|item| match Value::from_json_scalar(elem, item) {
                        Some(Value::$variant(v)) => Ok(v),
                        _ => Err(mismatch(table, field, elem, item)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                self.builder.create_vector(&values).value()
            }};
        }

        Ok(match elem {
            FieldType::Bool => scalars!(Bool),
            FieldType::Byte => scalars!(Byte),
            FieldType::UByte => scalars!(UByte),
            FieldType::Short => scalars!(Short),
            FieldType::UShort => scalars!(UShort),
            FieldType::Int => scalars!(Int),
            FieldType::UInt => scalars!(UInt),
            FieldType::Long => scalars!(Long),
            FieldType::ULong => scalars!(ULong),
            FieldType::Float => scalars!(Float),
            FieldType::Double => scalars!(Double),
            FieldType::String => {
                let strings = items
                    .iter()
                    .map(|item| item.as_str().ok_or_else(|| mismatch(table, field, elem, item)))
                    .collect::<Result<Vec<_>>>()?;
                self.builder.create_vector_of_strings(&strings).value()
            }
            FieldType::Table(name) => {
                let tables = items
                    .iter()
                    .map(|item| self.table(name, item))
                    .collect::<Result<Vec<_>>>()?;
                self.builder.create_vector_of_offsets(&tables).value()
            }
            FieldType::Vector(_) => {
                return Err(SchemaError::NestedVector {
                    table: table.to_owned(),
                    field: field.name.clone(),
                });
            }
        })
    }
}

fn add_scalar(b: &mut Builder, slot: u16, value: Value<'_>, default: Option<Value<'_>>) {
    macro_rules! typed {
        ($($variant:ident),*) => {
            match (value, default) {
                $(
                    (Value::$variant(v), Some(Value::$variant(d))) => b.add_scalar(slot, v, d),
                    (Value::$variant(v), _) => b.add_scalar_always(slot, v),
                )*
                (Value::String(_) | Value::Table(_) | Value::Vector(_), _) => {}
            }
        };
    }
    typed!(Bool, Byte, UByte, Short, UShort, Int, UInt, Long, ULong, Float, Double);
}

fn mismatch(table: &str, field: &FieldDef, expected: &FieldType, found: &Json) -> SchemaError {
    SchemaError::TypeMismatch {
        table: table.to_owned(),
        field: field.name.clone(),
        expected: expected.to_string(),
        found: kind(found),
    }
}

/// JSON type name for error messages.
fn kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}
