use indoc::indoc;

use crate::schema::Schema;

/// A session holding a model, loosely shaped like an inference session.
///
/// Slot 2 of `Session` is deprecated.
pub const SESSION_SCHEMA: &str = indoc! {r#"
    {
      "root": "Session",
      "file_identifier": "ORTM",
      "tables": {
        "Session": {
          "fields": [
            { "name": "version", "id": 0, "type": "string" },
            { "name": "model", "id": 1, "type": { "table": "Model" } },
            { "name": "legacy", "id": 2, "type": "int", "deprecated": true },
            { "name": "resolver", "id": 3, "type": { "table": "Resolver" } }
          ]
        },
        "Model": {
          "fields": [
            { "name": "x", "id": 0, "type": "int" },
            { "name": "opset", "id": 1, "type": "long", "default": 17 },
            { "name": "producer", "id": 2, "type": "string" },
            { "name": "dims", "id": 3, "type": { "vector": "short" } },
            { "name": "initializers", "id": 4, "type": { "vector": { "table": "Tensor" } } },
            { "name": "tags", "id": 5, "type": { "vector": "string" } },
            { "name": "training", "id": 6, "type": "bool" },
            { "name": "scale", "id": 7, "type": "float", "default": 1.0 }
          ]
        },
        "Tensor": {
          "fields": [
            { "name": "name", "id": 0, "type": "string" },
            { "name": "data_type", "id": 1, "type": "ubyte", "default": 1 },
            { "name": "raw", "id": 2, "type": { "vector": "ubyte" } }
          ]
        },
        "Resolver": {}
      }
    }
"#};

pub fn session_schema() -> Schema {
    Schema::from_json(SESSION_SCHEMA).unwrap()
}
