//! Schema descriptions.
//!
//! A schema is plain data, loaded from JSON:
//!
//! ```json
//! {
//!   "root": "Session",
//!   "file_identifier": "ORTM",
//!   "tables": {
//!     "Session": { "fields": [
//!       { "name": "version", "id": 0, "type": "string" },
//!       { "name": "model", "id": 1, "type": { "table": "Model" } }
//!     ] },
//!     "Model": { "fields": [
//!       { "name": "opset", "id": 0, "type": "long", "default": 17 }
//!     ] }
//!   }
//! }
//! ```
//!
//! Slot ids may skip values; a skipped id is reserved and always absent.

use std::collections::{HashMap, HashSet};
use std::collections::hash_map::Entry;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tablebuf::FILE_IDENTIFIER_LENGTH;

use crate::dynamic::Value;
use crate::error::{Result, SchemaError};

pub use tablebuf::MAX_SLOT_ID;

/// Declared type of a field or vector element.
///
/// Scalars are written as bare strings (`"int"`), references as single-key
/// objects (`{"table": "Model"}`, `{"vector": "string"}`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Bool,
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    String,
    Table(String),
    Vector(Box<FieldType>),
}

impl FieldType {
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::String | Self::Table(_) | Self::Vector(_))
    }

    /// Bytes the value occupies inline in a table or vector.
    pub fn inline_size(&self) -> usize {
        match self {
            Self::Bool | Self::Byte | Self::UByte => 1,
            Self::Short | Self::UShort => 2,
            Self::Int | Self::UInt | Self::Float => 4,
            Self::Long | Self::ULong | Self::Double => 8,
            Self::String | Self::Table(_) | Self::Vector(_) => 4,
        }
    }

    /// Implicit default of a scalar type.
    pub fn zero(&self) -> Option<Value<'static>> {
        Some(match self {
            Self::Bool => Value::Bool(false),
            Self::Byte => Value::Byte(0),
            Self::UByte => Value::UByte(0),
            Self::Short => Value::Short(0),
            Self::UShort => Value::UShort(0),
            Self::Int => Value::Int(0),
            Self::UInt => Value::UInt(0),
            Self::Long => Value::Long(0),
            Self::ULong => Value::ULong(0),
            Self::Float => Value::Float(0.0),
            Self::Double => Value::Double(0.0),
            Self::String | Self::Table(_) | Self::Vector(_) => return None,
        })
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::UByte => "ubyte",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Long => "long",
            Self::ULong => "ulong",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Table(name) => name.as_str(),
            Self::Vector(elem) => return write!(f, "[{elem}]"),
        };
        f.write_str(name)
    }
}

/// One field of a table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    /// Slot id; the vtable entry lives at `4 + 2 * id`.
    pub id: u16,
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Default for scalar fields. Absent means zero (or `false`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Deprecated fields are never written and always read as absent.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

impl FieldDef {
    pub fn slot_byte_offset(&self) -> u16 {
        tablebuf::slot_byte_offset(self.id)
    }

    /// The value readers see when a scalar field is absent.
    pub fn default_value(&self) -> Option<Value<'static>> {
        self.default
            .as_ref()
            .and_then(|d| Value::from_json_scalar(&self.ty, d))
            .or_else(|| self.ty.zero())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl TableDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_id(&self, id: u16) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Slots a builder must reserve: the highest id plus one.
    pub fn num_fields(&self) -> u16 {
        self.fields
            .iter()
            .map(|f| f.id.saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    /// Fields ordered by slot id.
    pub fn fields_by_id(&self) -> Vec<&FieldDef> {
        let mut fields: Vec<_> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.id);
        fields
    }
}

/// A set of tables and the root type of buffers built from them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub root: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_identifier: Option<String>,
    pub tables: IndexMap<String, TableDef>,
}

impl Schema {
    /// Parse and validate a schema description.
    pub fn from_json(json: &str) -> Result<Self> {
        let schema: Schema = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn table(&self, name: &str) -> Result<&TableDef> {
        self.tables
            .get(name)
            .ok_or_else(|| SchemaError::UnknownTable(name.to_owned()))
    }

    pub fn root_table(&self) -> Result<&TableDef> {
        self.table(&self.root)
    }

    /// The declared file identifier as raw bytes.
    pub fn identifier(&self) -> Result<Option<[u8; FILE_IDENTIFIER_LENGTH]>> {
        self.file_identifier
            .as_deref()
            .map(parse_identifier)
            .transpose()
    }

    /// Check internal consistency: the root and every referenced table
    /// exist, names and slot ids are unique per table, defaults fit their
    /// types, and vectors do not nest.
    pub fn validate(&self) -> Result<()> {
        self.root_table()?;
        self.identifier()?;
        for (name, table) in &self.tables {
            self.validate_table(name, table)?;
        }
        Ok(())
    }

    fn validate_table(&self, table_name: &str, table: &TableDef) -> Result<()> {
        let mut names = HashSet::new();
        let mut slots: HashMap<u16, &str> = HashMap::new();

        for field in &table.fields {
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    table: table_name.to_owned(),
                    field: field.name.clone(),
                });
            }
            match slots.entry(field.id) {
                Entry::Occupied(first) => {
                    return Err(SchemaError::DuplicateSlot {
                        table: table_name.to_owned(),
                        id: field.id,
                        first: (*first.get()).to_owned(),
                        second: field.name.clone(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(&field.name);
                }
            }
            if field.id > MAX_SLOT_ID {
                return Err(SchemaError::SlotTooLarge {
                    table: table_name.to_owned(),
                    field: field.name.clone(),
                    id: field.id,
                    max: MAX_SLOT_ID,
                });
            }
            self.validate_type(table_name, field, &field.ty, false)?;
            self.validate_default(table_name, field)?;
        }
        Ok(())
    }

    fn validate_type(
        &self,
        table_name: &str,
        field: &FieldDef,
        ty: &FieldType,
        in_vector: bool,
    ) -> Result<()> {
        match ty {
            FieldType::Table(target) => self.table(target).map(|_| ()),
            FieldType::Vector(_) if in_vector => Err(SchemaError::NestedVector {
                table: table_name.to_owned(),
                field: field.name.clone(),
            }),
            FieldType::Vector(elem) => self.validate_type(table_name, field, elem, true),
            _ => Ok(()),
        }
    }

    fn validate_default(&self, table_name: &str, field: &FieldDef) -> Result<()> {
        let Some(default) = &field.default else {
            return Ok(());
        };
        if !field.ty.is_scalar() {
            return Err(SchemaError::DefaultOnNonScalar {
                table: table_name.to_owned(),
                field: field.name.clone(),
            });
        }
        if Value::from_json_scalar(&field.ty, default).is_none() {
            return Err(SchemaError::BadDefault {
                table: table_name.to_owned(),
                field: field.name.clone(),
                ty: field.ty.to_string(),
            });
        }
        Ok(())
    }
}

/// Parse a 4-character file identifier.
pub fn parse_identifier(text: &str) -> Result<[u8; FILE_IDENTIFIER_LENGTH]> {
    text.as_bytes()
        .try_into()
        .map_err(|_| SchemaError::BadIdentifier(text.to_owned()))
}
