//! Schema, encode and decode errors.

/// Error raised while loading a schema or converting between JSON and
/// buffers.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed buffer: {0}")]
    Buffer(#[from] tablebuf::Error),
    #[error("unknown table `{0}`")]
    UnknownTable(String),
    #[error("table `{table}` has no field `{field}`")]
    UnknownField { table: String, field: String },
    #[error("table `{table}` declares field `{field}` twice")]
    DuplicateField { table: String, field: String },
    #[error("table `{table}`: fields `{first}` and `{second}` both use slot {id}")]
    DuplicateSlot {
        table: String,
        id: u16,
        first: String,
        second: String,
    },
    #[error("table `{table}`: slot {id} of field `{field}` exceeds the maximum of {max}")]
    SlotTooLarge {
        table: String,
        field: String,
        id: u16,
        max: u16,
    },
    #[error("table `{table}`: field `{field}` is a vector of vectors")]
    NestedVector { table: String, field: String },
    #[error("table `{table}`: default of field `{field}` does not fit `{ty}`")]
    BadDefault {
        table: String,
        field: String,
        ty: String,
    },
    #[error("table `{table}`: only scalar field `{field}` may declare a default")]
    DefaultOnNonScalar { table: String, field: String },
    #[error("file identifier must be exactly 4 bytes, got {0:?}")]
    BadIdentifier(String),
    #[error("`{table}.{field}`: expected {expected}, found {found}")]
    TypeMismatch {
        table: String,
        field: String,
        expected: String,
        found: &'static str,
    },
    #[error("table `{table}`: expected a JSON object, found {found}")]
    ExpectedObject { table: String, found: &'static str },
    #[error("table `{table}` is nested deeper than {max} levels")]
    TooDeep { table: String, max: usize },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
