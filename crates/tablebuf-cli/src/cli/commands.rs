//! Command builders for the CLI.
//!
//! Each command is built from the shared arg builders in `args.rs`.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("tablebuf")
        .about("Zero-copy table buffers: encode, decode and inspect")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(encode_command())
        .subcommand(decode_command())
        .subcommand(dump_command())
        .subcommand(check_command())
}

/// Encode a JSON document into a buffer.
pub fn encode_command() -> Command {
    Command::new("encode")
        .about("Encode a JSON document into a buffer")
        .override_usage("  tablebuf encode --schema <FILE> <JSON> -o <FILE>")
        .after_help(
            r#"EXAMPLES:
  tablebuf encode -s session.json doc.json -o doc.bin
  tablebuf encode -s session.json doc.json -o doc.bin --size-prefixed
  tablebuf encode -s session.json doc.json -o doc.bin --identifier TEST"#,
        )
        .arg(schema_arg())
        .arg(json_input_arg())
        .arg(output_file_arg().required(true))
        .arg(identifier_arg())
        .arg(size_prefixed_arg())
        .arg(force_defaults_arg())
}

/// Decode a buffer into JSON.
pub fn decode_command() -> Command {
    Command::new("decode")
        .about("Decode a buffer into JSON")
        .override_usage("  tablebuf decode --schema <FILE> <BUFFER> [-o <FILE>]")
        .after_help(
            r#"EXAMPLES:
  tablebuf decode -s session.json doc.bin
  tablebuf decode -s session.json doc.bin --defaults   # absent scalars too
  tablebuf decode -s session.json doc.bin --compact -o doc.json"#,
        )
        .arg(schema_arg())
        .arg(buffer_input_arg())
        .arg(output_file_arg())
        .arg(identifier_arg())
        .arg(size_prefixed_arg())
        .arg(defaults_arg())
        .arg(compact_arg())
}

/// Show the layout of a buffer.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Show the table and vtable layout of a buffer")
        .override_usage("  tablebuf dump --schema <FILE> <BUFFER>")
        .after_help(
            r#"EXAMPLES:
  tablebuf dump -s session.json doc.bin
  tablebuf dump -s session.json doc.bin --color never"#,
        )
        .arg(schema_arg())
        .arg(buffer_input_arg())
        .arg(identifier_arg())
        .arg(size_prefixed_arg())
        .arg(color_arg())
}

/// Validate a schema, and optionally a buffer against it.
pub fn check_command() -> Command {
    Command::new("check")
        .about("Validate a schema, and optionally a buffer against it")
        .override_usage("  tablebuf check --schema <FILE> [BUFFER]")
        .after_help(
            r#"EXAMPLES:
  tablebuf check -s session.json           # schema only
  tablebuf check -s session.json doc.bin   # also read every field of doc.bin"#,
        )
        .arg(schema_arg())
        .arg(optional_buffer_arg())
        .arg(identifier_arg())
        .arg(size_prefixed_arg())
}
