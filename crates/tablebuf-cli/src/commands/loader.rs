//! File loading shared by every command.

use std::path::{Path, PathBuf};

use tablebuf_schema::{RootOptions, Schema, SchemaError, parse_identifier};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

pub type Result<T> = std::result::Result<T, CliError>;

pub fn load_schema(path: &Path) -> Result<Schema> {
    let text = read_to_string(path)?;
    let schema = Schema::from_json(&text)?;
    tracing::debug!(path = %path.display(), tables = schema.tables.len(), "loaded schema");
    Ok(schema)
}

pub fn load_json(path: &Path) -> Result<serde_json::Value> {
    let text = read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| CliError::InvalidJson {
        path: path.to_owned(),
        source,
    })
}

pub fn load_buffer(path: &Path) -> Result<Vec<u8>> {
    let buf = std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })?;
    tracing::debug!(path = %path.display(), len = buf.len(), "loaded buffer");
    Ok(buf)
}

pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|source| CliError::Write {
        path: path.to_owned(),
        source,
    })
}

/// The identifier given on the command line wins over the schema's.
pub fn resolve_identifier(schema: &Schema, flag: Option<&str>) -> Result<Option<[u8; 4]>> {
    match flag {
        Some(id) => Ok(Some(parse_identifier(id)?)),
        None => Ok(schema.identifier()?),
    }
}

pub fn root_options(
    schema: &Schema,
    identifier: Option<&str>,
    size_prefixed: bool,
) -> Result<RootOptions> {
    Ok(RootOptions {
        size_prefixed,
        identifier: resolve_identifier(schema, identifier)?,
    })
}

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })
}
