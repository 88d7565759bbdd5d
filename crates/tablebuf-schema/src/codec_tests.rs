use indoc::indoc;
use serde_json::json;
use tablebuf::{Builder, Error, buffer_has_identifier};

use crate::decode::{DecodeOptions, MAX_DEPTH, decode_json};
use crate::dynamic::RootOptions;
use crate::encode::{EncodeOptions, encode_json};
use crate::error::SchemaError;
use crate::schema::Schema;
use crate::test_utils::session_schema;

fn encode(doc: &serde_json::Value) -> Vec<u8> {
    encode_json(&session_schema(), doc, &EncodeOptions::default()).unwrap()
}

fn decode(bytes: &[u8]) -> serde_json::Value {
    decode_json(&session_schema(), bytes, &DecodeOptions::default()).unwrap()
}

#[test]
fn full_document_roundtrip() {
    let doc = json!({
        "version": "1.17.0",
        "model": {
            "x": -5,
            "opset": 21,
            "producer": "tablebuf",
            "dims": [1, 3, 224, 224],
            "initializers": [
                { "name": "weight", "data_type": 7, "raw": [1, 2, 3] },
                { "name": "bias" }
            ],
            "tags": ["vision", "fp16"],
            "training": true,
            "scale": 0.5
        },
        "resolver": {}
    });

    assert_eq!(decode(&encode(&doc)), doc);
}

#[test]
fn defaults_are_omitted_then_restored() {
    let schema = session_schema();
    let doc = json!({ "model": { "x": 0, "opset": 17, "scale": 1.0 } });
    let bytes = encode(&doc);

    assert_eq!(decode(&bytes), json!({ "model": {} }));

    let opts = DecodeOptions {
        include_defaults: true,
        ..DecodeOptions::default()
    };
    assert_eq!(
        decode_json(&schema, &bytes, &opts).unwrap(),
        json!({
            "model": { "x": 0, "opset": 17, "training": false, "scale": 1.0 }
        })
    );
}

#[test]
fn force_defaults_stores_every_scalar() {
    let schema = session_schema();
    let doc = json!({ "model": { "x": 0, "opset": 17 } });
    let opts = EncodeOptions {
        force_defaults: true,
        ..EncodeOptions::default()
    };

    let forced = encode_json(&schema, &doc, &opts).unwrap();
    let lean = encode(&doc);
    assert!(forced.len() > lean.len());
    // Stored defaults decode as present fields.
    assert_eq!(decode(&forced), doc);
}

#[test]
fn writes_schema_identifier() {
    let bytes = encode(&json!({ "version": "1" }));

    assert_eq!(&bytes[4..8], b"ORTM");
    assert!(buffer_has_identifier(&bytes, b"ORTM", false));
}

#[test]
fn identifier_override() {
    let schema = session_schema();
    let opts = EncodeOptions {
        identifier: Some(*b"TEST"),
        ..EncodeOptions::default()
    };
    let bytes = encode_json(&schema, &json!({}), &opts).unwrap();

    let decode_opts = DecodeOptions {
        root: RootOptions {
            identifier: Some(*b"ORTM"),
            ..RootOptions::default()
        },
        ..DecodeOptions::default()
    };
    assert!(matches!(
        decode_json(&schema, &bytes, &decode_opts),
        Err(SchemaError::Buffer(Error::BadIdentifier { .. }))
    ));
}

#[test]
fn size_prefixed_roundtrip() {
    let schema = session_schema();
    let doc = json!({ "version": "1.17.0", "model": { "x": 1 } });
    let bytes = encode_json(
        &schema,
        &doc,
        &EncodeOptions {
            size_prefixed: true,
            ..EncodeOptions::default()
        },
    )
    .unwrap();

    let declared = u32::from_le_bytes(bytes[..4].try_into().unwrap()) as usize;
    assert_eq!(declared, bytes.len() - 4);

    let opts = DecodeOptions {
        root: RootOptions {
            size_prefixed: true,
            identifier: Some(*b"ORTM"),
        },
        ..DecodeOptions::default()
    };
    assert_eq!(decode_json(&schema, &bytes, &opts).unwrap(), doc);
}

#[test]
fn null_and_deprecated_fields_are_skipped() {
    let doc = json!({ "version": null, "legacy": 42, "model": { "producer": null } });

    assert_eq!(decode(&encode(&doc)), json!({ "model": {} }));
}

#[test]
fn unknown_field() {
    let err = encode_json(
        &session_schema(),
        &json!({ "model": { "y": 1 } }),
        &EncodeOptions::default(),
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "table `Model` has no field `y`");
}

#[test]
fn type_mismatch() {
    let err = encode_json(
        &session_schema(),
        &json!({ "model": { "x": "five" } }),
        &EncodeOptions::default(),
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "`Model.x`: expected int, found a string");
}

#[test]
fn out_of_range_vector_element() {
    let err = encode_json(
        &session_schema(),
        &json!({ "model": { "initializers": [{ "raw": [1, 256] }] } }),
        &EncodeOptions::default(),
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "`Tensor.raw`: expected ubyte, found a number");
}

#[test]
fn root_must_be_an_object() {
    let err = encode_json(&session_schema(), &json!([1]), &EncodeOptions::default()).unwrap_err();

    assert_eq!(
        err.to_string(),
        "table `Session`: expected a JSON object, found an array"
    );
}

#[test]
fn truncated_buffer_is_an_error() {
    let bytes = encode(&json!({ "version": "1.17.0", "model": { "producer": "tablebuf" } }));
    let truncated = &bytes[..bytes.len() / 2];

    assert!(matches!(
        decode_json(&session_schema(), truncated, &DecodeOptions::default()),
        Err(SchemaError::Buffer(_))
    ));
}

/// A `Node` chain `len` tables long, each pointing at the next.
fn node_chain(len: usize) -> Vec<u8> {
    let mut b = Builder::new();
    let mut next = None;
    for _ in 0..len {
        b.start_table(1);
        if let Some(child) = next {
            b.add_offset(0, child);
        }
        next = Some(b.end_table());
    }
    b.finish(next.unwrap(), None).to_vec()
}

#[test]
fn nesting_depth_is_capped() {
    let schema = Schema::from_json(indoc! {r#"
        { "root": "Node", "tables": { "Node": { "fields": [
          { "name": "next", "id": 0, "type": { "table": "Node" } }
        ] } } }
    "#})
    .unwrap();
    let opts = DecodeOptions::default();

    let at_limit = decode_json(&schema, &node_chain(MAX_DEPTH), &opts).unwrap();
    assert!(at_limit.pointer("/next/next/next").is_some());

    let err = decode_json(&schema, &node_chain(MAX_DEPTH + 1), &opts).unwrap_err();
    assert!(matches!(err, SchemaError::TooDeep { max: MAX_DEPTH, .. }));
    assert_eq!(err.to_string(), "table `Node` is nested deeper than 64 levels");
}
