//! End-to-end tests through accessor code written the way a generator
//! would emit it: one wrapper per table, one method per field.

use crate::builder::Builder;
use crate::error::Result;
use crate::offset::WipOffset;
use crate::table::{Table, root_with_identifier};
use crate::vector::{StringTag, TableTag};

const ORT_IDENTIFIER: &[u8; 4] = b"ORTM";

struct InferenceSession<'a>(Table<'a>);

impl<'a> InferenceSession<'a> {
    const VT_ORT_VERSION: u16 = 4;
    const VT_MODEL: u16 = 6;
    // Slot 8 (id 2) is reserved.
    const VT_KERNEL_TYPE_STR_RESOLVER: u16 = 10;

    fn ort_version(&self) -> Result<Option<&'a str>> {
        self.0.get_str(Self::VT_ORT_VERSION)
    }

    fn model(&self) -> Result<Option<Model<'a>>> {
        Ok(self.0.get_table(Self::VT_MODEL)?.map(Model))
    }

    fn kernel_type_str_resolver(&self) -> Result<Option<Table<'a>>> {
        self.0.get_table(Self::VT_KERNEL_TYPE_STR_RESOLVER)
    }
}

struct Model<'a>(Table<'a>);

impl<'a> Model<'a> {
    const VT_X: u16 = 4;
    const VT_PRODUCER: u16 = 6;
    const VT_OPSET: u16 = 8;
    const VT_INITIALIZERS: u16 = 10;

    fn x(&self) -> Result<i32> {
        self.0.get(Self::VT_X, 0)
    }

    fn producer(&self) -> Result<Option<&'a str>> {
        self.0.get_str(Self::VT_PRODUCER)
    }

    fn opset(&self) -> Result<i64> {
        self.0.get(Self::VT_OPSET, 17)
    }

    fn initializers(&self) -> Result<Option<crate::vector::Vector<'a, TableTag>>> {
        self.0.get_vector(Self::VT_INITIALIZERS)
    }
}

fn add_session(
    b: &mut Builder,
    version: Option<WipOffset<StringTag>>,
    model: Option<WipOffset<TableTag>>,
    resolver: Option<WipOffset<TableTag>>,
) -> WipOffset<TableTag> {
    b.start_table(4);
    if let Some(version) = version {
        b.add_offset(0, version);
    }
    if let Some(model) = model {
        b.add_offset(1, model);
    }
    if let Some(resolver) = resolver {
        b.add_offset(3, resolver);
    }
    b.end_table()
}

#[test]
fn inference_session_scenario() {
    let mut b = Builder::new();
    let version = b.create_string("1.17.0");
    b.start_table(1);
    b.add_scalar(0, 5i32, 0);
    let model = b.end_table();
    let session = add_session(&mut b, Some(version), Some(model), None);
    let bytes = b.finish(session, Some(ORT_IDENTIFIER)).to_vec();

    let session = InferenceSession(root_with_identifier(&bytes, ORT_IDENTIFIER).unwrap());
    assert_eq!(session.ort_version().unwrap(), Some("1.17.0"));
    assert_eq!(session.model().unwrap().unwrap().x().unwrap(), 5);
    assert!(session.kernel_type_str_resolver().unwrap().is_none());
}

#[test]
fn defaults_survive_roundtrip() {
    let mut b = Builder::new();
    b.start_table(4);
    b.add_scalar(0, 0i32, 0);
    b.add_scalar(2, 17i64, 17);
    let model = b.end_table();
    let session = add_session(&mut b, None, Some(model), None);
    let bytes = b.finish(session, Some(ORT_IDENTIFIER)).to_vec();

    let session = InferenceSession(root_with_identifier(&bytes, ORT_IDENTIFIER).unwrap());
    assert_eq!(session.ort_version().unwrap(), None);
    let model = session.model().unwrap().unwrap();
    assert_eq!(model.x().unwrap(), 0);
    assert_eq!(model.opset().unwrap(), 17);
    assert_eq!(model.producer().unwrap(), None);
    assert!(model.initializers().unwrap().is_none());
}

#[test]
fn nested_graph_roundtrip() {
    let mut b = Builder::new();

    let names = ["weight", "bias", "scale"];
    let mut initializers = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let name = b.create_shared_string(name);
        b.start_table(2);
        b.add_offset(0, name);
        b.add_scalar(1, i as u32, 0);
        initializers.push(b.end_table());
    }
    let initializers = b.create_vector_of_offsets(&initializers);
    let producer = b.create_string("tablebuf");

    b.start_table(4);
    b.add_scalar(0, -3i32, 0);
    b.add_offset(1, producer);
    b.add_scalar(2, 21i64, 17);
    b.add_offset(3, initializers);
    let model = b.end_table();

    b.start_table(1);
    let resolver = b.end_table();
    let version = b.create_string("1.17.0");
    let session = add_session(&mut b, Some(version), Some(model), Some(resolver));
    let bytes = b.finish(session, Some(ORT_IDENTIFIER)).to_vec();

    let session = InferenceSession(root_with_identifier(&bytes, ORT_IDENTIFIER).unwrap());
    let model = session.model().unwrap().unwrap();
    assert_eq!(model.x().unwrap(), -3);
    assert_eq!(model.producer().unwrap(), Some("tablebuf"));
    assert_eq!(model.opset().unwrap(), 21);

    let initializers = model.initializers().unwrap().unwrap();
    assert_eq!(initializers.len(), 3);
    for (i, init) in initializers.iter().enumerate() {
        let init = init.unwrap();
        assert_eq!(init.get_str(4).unwrap(), Some(names[i]));
        assert_eq!(init.get(6, 0u32).unwrap(), i as u32);
    }

    let resolver = session.kernel_type_str_resolver().unwrap().unwrap();
    assert_eq!(resolver.vtable().unwrap().byte_size().unwrap(), 4);
}

#[test]
fn views_are_shareable_across_threads() {
    let mut b = Builder::new();
    let version = b.create_string("1.17.0");
    let session = add_session(&mut b, Some(version), None, None);
    let bytes = b.finish(session, Some(ORT_IDENTIFIER)).to_vec();
    let table = root_with_identifier(&bytes, ORT_IDENTIFIER).unwrap();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let session = InferenceSession(table);
                assert_eq!(session.ort_version().unwrap(), Some("1.17.0"));
            });
        }
    });
}
