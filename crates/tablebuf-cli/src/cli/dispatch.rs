//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::check::CheckArgs;
use crate::commands::decode::DecodeArgs;
use crate::commands::dump::DumpArgs;
use crate::commands::encode::EncodeArgs;

pub struct EncodeParams {
    pub schema: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub identifier: Option<String>,
    pub size_prefixed: bool,
    pub force_defaults: bool,
}

impl EncodeParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            schema: required_path(m, "schema"),
            input: required_path(m, "input"),
            output: required_path(m, "output"),
            identifier: m.get_one::<String>("identifier").cloned(),
            size_prefixed: m.get_flag("size_prefixed"),
            force_defaults: m.get_flag("force_defaults"),
        }
    }
}

impl From<EncodeParams> for EncodeArgs {
    fn from(p: EncodeParams) -> Self {
        Self {
            schema: p.schema,
            input: p.input,
            output: p.output,
            identifier: p.identifier,
            size_prefixed: p.size_prefixed,
            force_defaults: p.force_defaults,
        }
    }
}

pub struct DecodeParams {
    pub schema: PathBuf,
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub identifier: Option<String>,
    pub size_prefixed: bool,
    pub defaults: bool,
    pub compact: bool,
}

impl DecodeParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            schema: required_path(m, "schema"),
            input: required_path(m, "input"),
            output: m.get_one::<PathBuf>("output").cloned(),
            identifier: m.get_one::<String>("identifier").cloned(),
            size_prefixed: m.get_flag("size_prefixed"),
            defaults: m.get_flag("defaults"),
            compact: m.get_flag("compact"),
        }
    }
}

impl From<DecodeParams> for DecodeArgs {
    fn from(p: DecodeParams) -> Self {
        Self {
            schema: p.schema,
            input: p.input,
            output: p.output,
            identifier: p.identifier,
            size_prefixed: p.size_prefixed,
            include_defaults: p.defaults,
            compact: p.compact,
        }
    }
}

pub struct DumpParams {
    pub schema: PathBuf,
    pub input: PathBuf,
    pub identifier: Option<String>,
    pub size_prefixed: bool,
    pub color: ColorChoice,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            schema: required_path(m, "schema"),
            input: required_path(m, "input"),
            identifier: m.get_one::<String>("identifier").cloned(),
            size_prefixed: m.get_flag("size_prefixed"),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            schema: p.schema,
            input: p.input,
            identifier: p.identifier,
            size_prefixed: p.size_prefixed,
            color: p.color.should_colorize(),
        }
    }
}

pub struct CheckParams {
    pub schema: PathBuf,
    pub input: Option<PathBuf>,
    pub identifier: Option<String>,
    pub size_prefixed: bool,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            schema: required_path(m, "schema"),
            input: m.get_one::<PathBuf>("input").cloned(),
            identifier: m.get_one::<String>("identifier").cloned(),
            size_prefixed: m.get_flag("size_prefixed"),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            schema: p.schema,
            input: p.input,
            identifier: p.identifier,
            size_prefixed: p.size_prefixed,
        }
    }
}

/// Clap enforces `required(true)` before dispatch, so a missing value is a bug.
fn required_path(m: &ArgMatches, id: &str) -> PathBuf {
    m.get_one::<PathBuf>(id)
        .cloned()
        .unwrap_or_else(|| unreachable!("clap should have required --{id}"))
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
