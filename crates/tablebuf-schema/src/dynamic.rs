//! Schema-driven field access.
//!
//! [`DynTable`] pairs a table view with its [`TableDef`] and reads fields by
//! name or slot id, so one dispatcher serves every table a schema declares.

use std::fmt;

use tablebuf::{
    FILE_IDENTIFIER_LENGTH, StringTag, Table, TableTag, Vector, root_with_identifier,
    size_prefixed_root, size_prefixed_root_with_identifier,
};

use crate::error::{Result, SchemaError};
use crate::schema::{FieldDef, FieldType, Schema, TableDef};

/// How to locate the root table of a buffer.
#[derive(Clone, Copy, Debug, Default)]
pub struct RootOptions {
    pub size_prefixed: bool,
    /// Identifier to verify. `None` skips the check.
    pub identifier: Option<[u8; FILE_IDENTIFIER_LENGTH]>,
}

/// A decoded field value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value<'a> {
    Bool(bool),
    Byte(i8),
    UByte(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    String(&'a str),
    Table(DynTable<'a>),
    Vector(DynVector<'a>),
}

impl<'a> Value<'a> {
    /// Convert a JSON scalar to a value of type `ty`.
    ///
    /// Returns `None` for non-scalar types and for numbers that do not fit.
    pub fn from_json_scalar(ty: &FieldType, json: &serde_json::Value) -> Option<Value<'static>> {
        fn int<T: TryFrom<i64>>(json: &serde_json::Value) -> Option<T> {
            json.as_i64().and_then(|n| T::try_from(n).ok())
        }

        Some(match ty {
            FieldType::Bool => Value::Bool(match (json.as_bool(), json.as_u64()) {
                (Some(b), _) => b,
                (None, Some(0)) => false,
                (None, Some(1)) => true,
                _ => return None,
            }),
            FieldType::Byte => Value::Byte(int(json)?),
            FieldType::UByte => Value::UByte(int(json)?),
            FieldType::Short => Value::Short(int(json)?),
            FieldType::UShort => Value::UShort(int(json)?),
            FieldType::Int => Value::Int(int(json)?),
            FieldType::UInt => Value::UInt(int(json)?),
            FieldType::Long => Value::Long(json.as_i64()?),
            FieldType::ULong => Value::ULong(json.as_u64()?),
            FieldType::Float => Value::Float(json.as_f64()? as f32),
            FieldType::Double => Value::Double(json.as_f64()?),
            FieldType::String | FieldType::Table(_) | FieldType::Vector(_) => return None,
        })
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Any integer that fits in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        Some(match *self {
            Value::Byte(n) => n.into(),
            Value::UByte(n) => n.into(),
            Value::Short(n) => n.into(),
            Value::UShort(n) => n.into(),
            Value::Int(n) => n.into(),
            Value::UInt(n) => n.into(),
            Value::Long(n) => n,
            Value::ULong(n) => i64::try_from(n).ok()?,
            _ => return None,
        })
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(n) => Some(n.into()),
            Value::Double(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<DynTable<'a>> {
        match *self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<DynVector<'a>> {
        match *self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }
}

/// A table view that knows its schema.
#[derive(Clone, Copy)]
pub struct DynTable<'a> {
    schema: &'a Schema,
    name: &'a str,
    def: &'a TableDef,
    table: Table<'a>,
}

impl<'a> DynTable<'a> {
    /// Interpret `table` as an instance of the schema table `name`.
    pub fn new(schema: &'a Schema, name: &str, table: Table<'a>) -> Result<Self> {
        let (name, def) = schema
            .tables
            .get_key_value(name)
            .ok_or_else(|| SchemaError::UnknownTable(name.to_owned()))?;
        Ok(Self {
            schema,
            name: name.as_str(),
            def,
            table,
        })
    }

    /// Open the root table of `bytes` as the schema's root type.
    pub fn root(schema: &'a Schema, bytes: &'a [u8], opts: &RootOptions) -> Result<Self> {
        let table = match (opts.size_prefixed, opts.identifier.as_ref()) {
            (false, None) => tablebuf::root(bytes)?,
            (false, Some(ident)) => root_with_identifier(bytes, ident)?,
            (true, None) => size_prefixed_root(bytes)?,
            (true, Some(ident)) => size_prefixed_root_with_identifier(bytes, ident)?,
        };
        Self::new(schema, &schema.root, table)
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn def(&self) -> &'a TableDef {
        self.def
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn table(&self) -> Table<'a> {
        self.table
    }

    /// Read a field by name.
    ///
    /// Scalars always yield a value (stored or default). Strings, tables and
    /// vectors yield `None` when absent.
    pub fn get(&self, name: &str) -> Result<Option<Value<'a>>> {
        let field = self
            .def
            .field(name)
            .ok_or_else(|| SchemaError::UnknownField {
                table: self.name.to_owned(),
                field: name.to_owned(),
            })?;
        self.read(field)
    }

    /// Read a field by slot id. Ids the schema does not declare are absent.
    pub fn get_by_id(&self, id: u16) -> Result<Option<Value<'a>>> {
        match self.def.field_by_id(id) {
            Some(field) => self.read(field),
            None => Ok(None),
        }
    }

    /// Whether the field is stored in the buffer rather than defaulted.
    pub fn is_present(&self, field: &FieldDef) -> Result<bool> {
        if field.deprecated {
            return Ok(false);
        }
        Ok(self.table.field_offset(field.slot_byte_offset())? != 0)
    }

    pub fn read(&self, field: &'a FieldDef) -> Result<Option<Value<'a>>> {
        if field.deprecated {
            return Ok(field.default_value());
        }

        let slot = field.slot_byte_offset();
        let t = &self.table;
        let stored = match &field.ty {
            FieldType::Bool => t.get_optional(slot)?.map(Value::Bool),
            FieldType::Byte => t.get_optional(slot)?.map(Value::Byte),
            FieldType::UByte => t.get_optional(slot)?.map(Value::UByte),
            FieldType::Short => t.get_optional(slot)?.map(Value::Short),
            FieldType::UShort => t.get_optional(slot)?.map(Value::UShort),
            FieldType::Int => t.get_optional(slot)?.map(Value::Int),
            FieldType::UInt => t.get_optional(slot)?.map(Value::UInt),
            FieldType::Long => t.get_optional(slot)?.map(Value::Long),
            FieldType::ULong => t.get_optional(slot)?.map(Value::ULong),
            FieldType::Float => t.get_optional(slot)?.map(Value::Float),
            FieldType::Double => t.get_optional(slot)?.map(Value::Double),
            FieldType::String => return Ok(t.get_str(slot)?.map(Value::String)),
            FieldType::Table(name) => {
                return t
                    .get_table(slot)?
                    .map(|child| DynTable::new(self.schema, name, child).map(Value::Table))
                    .transpose();
            }
            FieldType::Vector(elem) => {
                return Ok(DynVector::read(self, field, elem)?.map(Value::Vector));
            }
        };
        Ok(stored.or_else(|| field.default_value()))
    }
}

impl PartialEq for DynTable<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.table.pos() == other.table.pos()
    }
}

impl fmt::Debug for DynTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @{}", self.name, self.table.pos())
    }
}

#[derive(Clone, Copy)]
enum Elements<'a> {
    Bool(Vector<'a, bool>),
    Byte(Vector<'a, i8>),
    UByte(Vector<'a, u8>),
    Short(Vector<'a, i16>),
    UShort(Vector<'a, u16>),
    Int(Vector<'a, i32>),
    UInt(Vector<'a, u32>),
    Long(Vector<'a, i64>),
    ULong(Vector<'a, u64>),
    Float(Vector<'a, f32>),
    Double(Vector<'a, f64>),
    String(Vector<'a, StringTag>),
    Table(Vector<'a, TableTag>, &'a str),
}

macro_rules! each_elements {
    ($elements:expr, $v:ident => $body:expr) => {
        match $elements {
            Elements::Bool($v) => $body,
            Elements::Byte($v) => $body,
            Elements::UByte($v) => $body,
            Elements::Short($v) => $body,
            Elements::UShort($v) => $body,
            Elements::Int($v) => $body,
            Elements::UInt($v) => $body,
            Elements::Long($v) => $body,
            Elements::ULong($v) => $body,
            Elements::Float($v) => $body,
            Elements::Double($v) => $body,
            Elements::String($v) => $body,
            Elements::Table($v, _) => $body,
        }
    };
}

/// A vector view that decodes elements according to the schema.
#[derive(Clone, Copy)]
pub struct DynVector<'a> {
    schema: &'a Schema,
    elem: &'a FieldType,
    elements: Elements<'a>,
}

impl<'a> DynVector<'a> {
    fn read(owner: &DynTable<'a>, field: &FieldDef, elem: &'a FieldType) -> Result<Option<Self>> {
        let t = &owner.table;
        let slot = field.slot_byte_offset();
        let elements = match elem {
            FieldType::Bool => t.get_vector(slot)?.map(Elements::Bool),
            FieldType::Byte => t.get_vector(slot)?.map(Elements::Byte),
            FieldType::UByte => t.get_vector(slot)?.map(Elements::UByte),
            FieldType::Short => t.get_vector(slot)?.map(Elements::Short),
            FieldType::UShort => t.get_vector(slot)?.map(Elements::UShort),
            FieldType::Int => t.get_vector(slot)?.map(Elements::Int),
            FieldType::UInt => t.get_vector(slot)?.map(Elements::UInt),
            FieldType::Long => t.get_vector(slot)?.map(Elements::Long),
            FieldType::ULong => t.get_vector(slot)?.map(Elements::ULong),
            FieldType::Float => t.get_vector(slot)?.map(Elements::Float),
            FieldType::Double => t.get_vector(slot)?.map(Elements::Double),
            FieldType::String => t.get_vector(slot)?.map(Elements::String),
            FieldType::Table(name) => t
                .get_vector(slot)?
                .map(|v| Elements::Table(v, name.as_str())),
            FieldType::Vector(_) => {
                return Err(SchemaError::NestedVector {
                    table: owner.name.to_owned(),
                    field: field.name.clone(),
                });
            }
        };
        Ok(elements.map(|elements| Self {
            schema: owner.schema,
            elem,
            elements,
        }))
    }

    pub fn elem_type(&self) -> &'a FieldType {
        self.elem
    }

    pub fn len(&self) -> usize {
        each_elements!(self.elements, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Absolute position of the first element.
    pub fn pos(&self) -> usize {
        each_elements!(self.elements, v => v.pos())
    }

    /// The raw bytes of a `[ubyte]` vector.
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self.elements {
            Elements::UByte(v) => Some(v.as_bytes()),
            _ => None,
        }
    }

    pub fn get(&self, index: usize) -> Result<Value<'a>> {
        Ok(match self.elements {
            Elements::Bool(v) => Value::Bool(v.get(index)?),
            Elements::Byte(v) => Value::Byte(v.get(index)?),
            Elements::UByte(v) => Value::UByte(v.get(index)?),
            Elements::Short(v) => Value::Short(v.get(index)?),
            Elements::UShort(v) => Value::UShort(v.get(index)?),
            Elements::Int(v) => Value::Int(v.get(index)?),
            Elements::UInt(v) => Value::UInt(v.get(index)?),
            Elements::Long(v) => Value::Long(v.get(index)?),
            Elements::ULong(v) => Value::ULong(v.get(index)?),
            Elements::Float(v) => Value::Float(v.get(index)?),
            Elements::Double(v) => Value::Double(v.get(index)?),
            Elements::String(v) => Value::String(v.get(index)?),
            Elements::Table(v, name) => Value::Table(DynTable::new(self.schema, name, v.get(index)?)?),
        })
    }

    pub fn iter(self) -> impl Iterator<Item = Result<Value<'a>>> + 'a {
        (0..self.len()).map(move |i| self.get(i))
    }
}

impl PartialEq for DynVector<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.elem == other.elem && self.pos() == other.pos() && self.len() == other.len()
    }
}

impl fmt::Debug for DynVector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}; {}] @{}", self.elem, self.len(), self.pos())
    }
}
