use std::path::PathBuf;

use tablebuf_schema::{EncodeOptions, encode_json, parse_identifier};

use super::loader::{Result, load_json, load_schema, write_output};

pub struct EncodeArgs {
    pub schema: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub identifier: Option<String>,
    pub size_prefixed: bool,
    pub force_defaults: bool,
}

/// Encode `input` and write the buffer to `output`. Returns the buffer size.
pub fn execute(args: &EncodeArgs) -> Result<usize> {
    let schema = load_schema(&args.schema)?;
    let doc = load_json(&args.input)?;
    let opts = EncodeOptions {
        size_prefixed: args.size_prefixed,
        force_defaults: args.force_defaults,
        identifier: args.identifier.as_deref().map(parse_identifier).transpose()?,
    };

    let bytes = encode_json(&schema, &doc, &opts)?;
    write_output(&args.output, &bytes)?;
    Ok(bytes.len())
}

pub fn run(args: EncodeArgs) {
    match execute(&args) {
        Ok(len) => {
            tracing::info!(output = %args.output.display(), len, "wrote buffer");
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
