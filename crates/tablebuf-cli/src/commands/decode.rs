use std::path::PathBuf;

use tablebuf_schema::{DecodeOptions, decode_json};

use super::loader::{Result, load_buffer, load_schema, root_options, write_output};

pub struct DecodeArgs {
    pub schema: PathBuf,
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub identifier: Option<String>,
    pub size_prefixed: bool,
    pub include_defaults: bool,
    pub compact: bool,
}

/// Decode `input` and render it as JSON text.
pub fn execute(args: &DecodeArgs) -> Result<String> {
    let schema = load_schema(&args.schema)?;
    let buf = load_buffer(&args.input)?;
    let opts = DecodeOptions {
        root: root_options(&schema, args.identifier.as_deref(), args.size_prefixed)?,
        include_defaults: args.include_defaults,
    };

    let json = decode_json(&schema, &buf, &opts)?;
    let mut text = if args.compact {
        json.to_string()
    } else {
        serde_json::to_string_pretty(&json).map_err(tablebuf_schema::SchemaError::from)?
    };
    text.push('\n');
    Ok(text)
}

pub fn run(args: DecodeArgs) {
    let result = execute(&args).and_then(|text| match &args.output {
        Some(path) => write_output(path, text.as_bytes()),
        None => {
            print!("{}", text);
            Ok(())
        }
    });

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
