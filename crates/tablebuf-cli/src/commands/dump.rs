use std::path::PathBuf;

use tablebuf_schema::{Colors, dump};

use super::loader::{Result, load_buffer, load_schema, root_options};

pub struct DumpArgs {
    pub schema: PathBuf,
    pub input: PathBuf,
    pub identifier: Option<String>,
    pub size_prefixed: bool,
    pub color: bool,
}

pub fn execute(args: &DumpArgs) -> Result<String> {
    let schema = load_schema(&args.schema)?;
    let buf = load_buffer(&args.input)?;
    let opts = root_options(&schema, args.identifier.as_deref(), args.size_prefixed)?;

    Ok(dump(&schema, &buf, &opts, Colors::new(args.color))?)
}

pub fn run(args: DumpArgs) {
    match execute(&args) {
        Ok(out) => print!("{}", out),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
