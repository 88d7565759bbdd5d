//! Read-side errors.
//!
//! Field absence is never an error: it yields the declared default or `None`.

/// Error raised while interpreting a finished buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("out of bounds: {len} bytes at offset {offset} (buffer is {buffer_len} bytes)")]
    OutOfBounds {
        offset: usize,
        len: usize,
        buffer_len: usize,
    },
    #[error("index {index} out of range for vector of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("bad file identifier: expected {expected:?}, found {found:?}")]
    BadIdentifier { expected: [u8; 4], found: [u8; 4] },
    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("size prefix declares {declared} bytes, only {available} available")]
    BadSizePrefix { declared: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
