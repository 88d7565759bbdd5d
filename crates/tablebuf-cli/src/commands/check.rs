use std::path::PathBuf;

use tablebuf_schema::{DecodeOptions, decode_json};

use super::loader::{Result, load_buffer, load_schema, root_options};

pub struct CheckArgs {
    pub schema: PathBuf,
    pub input: Option<PathBuf>,
    pub identifier: Option<String>,
    pub size_prefixed: bool,
}

/// Validate the schema. With a buffer, also read every reachable field.
pub fn execute(args: &CheckArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let Some(input) = &args.input else {
        return Ok(());
    };

    let buf = load_buffer(input)?;
    let opts = DecodeOptions {
        root: root_options(&schema, args.identifier.as_deref(), args.size_prefixed)?,
        include_defaults: true,
    };
    decode_json(&schema, &buf, &opts)?;
    Ok(())
}

pub fn run(args: CheckArgs) {
    if let Err(e) = execute(&args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
