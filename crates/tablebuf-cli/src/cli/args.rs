//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` so the same definition can be reused
//! across commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Schema description (--schema).
pub fn schema_arg() -> Arg {
    Arg::new("schema")
        .short('s')
        .long("schema")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help("Schema description (JSON)")
}

/// JSON document to encode (positional).
pub fn json_input_arg() -> Arg {
    Arg::new("input")
        .value_name("JSON")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help("JSON document to encode")
}

/// Encoded buffer (positional).
pub fn buffer_input_arg() -> Arg {
    Arg::new("input")
        .value_name("BUFFER")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help("Encoded buffer")
}

/// Optional buffer to verify (positional).
pub fn optional_buffer_arg() -> Arg {
    buffer_input_arg()
        .required(false)
        .help("Encoded buffer to verify against the schema")
}

/// Write output to file (-o/--output).
pub fn output_file_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Write output to file")
}

/// File identifier override (--identifier).
pub fn identifier_arg() -> Arg {
    Arg::new("identifier")
        .long("identifier")
        .value_name("ID")
        .help("4-character file identifier (defaults to the schema's)")
}

/// Size-prefixed buffers (--size-prefixed).
pub fn size_prefixed_arg() -> Arg {
    Arg::new("size_prefixed")
        .long("size-prefixed")
        .action(ArgAction::SetTrue)
        .help("Buffer starts with a u32 byte count")
}

/// Store scalars equal to their default (--force-defaults).
pub fn force_defaults_arg() -> Arg {
    Arg::new("force_defaults")
        .long("force-defaults")
        .action(ArgAction::SetTrue)
        .help("Store scalar fields even when they equal their default")
}

/// Emit absent scalars with their defaults (--defaults).
pub fn defaults_arg() -> Arg {
    Arg::new("defaults")
        .long("defaults")
        .action(ArgAction::SetTrue)
        .help("Include absent scalar fields with their default values")
}

/// Output compact JSON (--compact).
pub fn compact_arg() -> Arg {
    Arg::new("compact")
        .long("compact")
        .action(ArgAction::SetTrue)
        .help("Output compact JSON")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}
