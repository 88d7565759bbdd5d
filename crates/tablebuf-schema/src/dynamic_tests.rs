use serde_json::json;
use tablebuf::{Builder, Error};

use crate::dynamic::{DynTable, RootOptions, Value};
use crate::encode::{EncodeOptions, encode_json};
use crate::error::SchemaError;
use crate::schema::FieldType;
use crate::test_utils::session_schema;

fn sample() -> Vec<u8> {
    let doc = json!({
        "version": "1.17.0",
        "model": {
            "x": 5,
            "dims": [1, 3, 224, 224],
            "initializers": [
                { "name": "weight", "raw": [0, 1, 255] },
                { "name": "bias", "data_type": 10 }
            ]
        }
    });
    encode_json(&session_schema(), &doc, &EncodeOptions::default()).unwrap()
}

#[test]
fn reads_fields_by_name() {
    let schema = session_schema();
    let bytes = sample();
    let session = DynTable::root(&schema, &bytes, &RootOptions::default()).unwrap();

    assert_eq!(session.name(), "Session");
    assert_eq!(session.get("version").unwrap(), Some(Value::String("1.17.0")));

    let model = session.get("model").unwrap().unwrap().as_table().unwrap();
    assert_eq!(model.name(), "Model");
    assert_eq!(model.get("x").unwrap(), Some(Value::Int(5)));
    // Absent scalars resolve to their default, absent references to None.
    assert_eq!(model.get("opset").unwrap(), Some(Value::Long(17)));
    assert_eq!(model.get("producer").unwrap(), None);
    assert_eq!(session.get("resolver").unwrap(), None);
}

#[test]
fn reads_fields_by_id() {
    let schema = session_schema();
    let bytes = sample();
    let session = DynTable::root(&schema, &bytes, &RootOptions::default()).unwrap();

    assert_eq!(session.get_by_id(0).unwrap().unwrap().as_str(), Some("1.17.0"));
    // Slot 2 is deprecated: its default, whatever the buffer says.
    assert_eq!(session.get_by_id(2).unwrap(), Some(Value::Int(0)));
    // Slots the schema does not declare are absent.
    assert_eq!(session.get_by_id(9).unwrap(), None);
}

#[test]
fn unknown_field_name_is_an_error() {
    let schema = session_schema();
    let bytes = sample();
    let session = DynTable::root(&schema, &bytes, &RootOptions::default()).unwrap();

    let err = session.get("nope").unwrap_err();
    assert_eq!(err.to_string(), "table `Session` has no field `nope`");
}

#[test]
fn presence_is_distinct_from_value() {
    let schema = session_schema();
    let bytes = sample();
    let session = DynTable::root(&schema, &bytes, &RootOptions::default()).unwrap();
    let model = session.get("model").unwrap().unwrap().as_table().unwrap();
    let def = schema.table("Model").unwrap();

    assert!(model.is_present(def.field("x").unwrap()).unwrap());
    assert!(!model.is_present(def.field("opset").unwrap()).unwrap());
}

#[test]
fn scalar_vectors() {
    let schema = session_schema();
    let bytes = sample();
    let session = DynTable::root(&schema, &bytes, &RootOptions::default()).unwrap();
    let model = session.get("model").unwrap().unwrap().as_table().unwrap();

    let dims = model.get("dims").unwrap().unwrap().as_vector().unwrap();
    assert_eq!(dims.elem_type(), &FieldType::Short);
    assert_eq!(dims.len(), 4);
    assert_eq!(dims.get(1).unwrap(), Value::Short(3));
    let all: Vec<_> = dims.iter().map(|v| v.unwrap().as_i64().unwrap()).collect();
    assert_eq!(all, [1i64, 3, 224, 224]);

    assert!(matches!(
        dims.get(4).unwrap_err(),
        SchemaError::Buffer(Error::IndexOutOfRange { index: 4, len: 4 })
    ));
}

#[test]
fn table_vectors() {
    let schema = session_schema();
    let bytes = sample();
    let session = DynTable::root(&schema, &bytes, &RootOptions::default()).unwrap();
    let model = session.get("model").unwrap().unwrap().as_table().unwrap();

    let inits = model.get("initializers").unwrap().unwrap().as_vector().unwrap();
    assert_eq!(inits.len(), 2);

    let weight = inits.get(0).unwrap().as_table().unwrap();
    assert_eq!(weight.name(), "Tensor");
    assert_eq!(weight.get("name").unwrap(), Some(Value::String("weight")));
    assert_eq!(weight.get("data_type").unwrap(), Some(Value::UByte(1)));
    let raw = weight.get("raw").unwrap().unwrap().as_vector().unwrap();
    assert_eq!(raw.as_bytes(), Some(&[0u8, 1, 255][..]));

    let bias = inits.get(1).unwrap().as_table().unwrap();
    assert_eq!(bias.get("data_type").unwrap(), Some(Value::UByte(10)));
    assert_eq!(bias.get("raw").unwrap(), None);
}

#[test]
fn deprecated_slot_ignores_stored_data() {
    let schema = session_schema();
    let mut b = Builder::new();
    b.start_table(4);
    b.add_scalar(2, 99i32, 0);
    let root = b.end_table();
    let bytes = b.finish(root, Some(b"ORTM")).to_vec();

    let opts = RootOptions {
        identifier: Some(*b"ORTM"),
        ..RootOptions::default()
    };
    let session = DynTable::root(&schema, &bytes, &opts).unwrap();
    assert_eq!(session.table().get(tablebuf::slot_byte_offset(2), 0i32).unwrap(), 99);
    assert_eq!(session.get("legacy").unwrap(), Some(Value::Int(0)));
}

#[test]
fn wrong_identifier() {
    let schema = session_schema();
    let bytes = sample();
    let opts = RootOptions {
        identifier: Some(*b"XXXX"),
        ..RootOptions::default()
    };

    let err = DynTable::root(&schema, &bytes, &opts).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::Buffer(Error::BadIdentifier { found, .. }) if &found == b"ORTM"
    ));
}

#[test]
fn unknown_table_name() {
    let schema = session_schema();
    let bytes = sample();
    let table = tablebuf::root(&bytes).unwrap();

    assert!(matches!(
        DynTable::new(&schema, "Graph", table),
        Err(SchemaError::UnknownTable(_))
    ));
}
