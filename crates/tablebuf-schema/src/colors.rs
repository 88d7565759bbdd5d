//! Terminal styles for layout dumps, one per kind of token `dump` prints.

/// ANSI escape codes keyed by what they mark. Every code is empty when off.
#[derive(Clone, Copy, Debug)]
pub struct Colors {
    /// `[buffer]`, `[tables]`.
    pub section: &'static str,
    /// Table names at the head of each table listing.
    pub table: &'static str,
    /// String values and the file identifier.
    pub string: &'static str,
    /// Trailing `; ...` annotations.
    pub note: &'static str,
    pub reset: &'static str,
}

impl Default for Colors {
    fn default() -> Self {
        Self::OFF
    }
}

impl Colors {
    pub const ON: Self = Self {
        section: "\x1b[1;34m",
        table: "\x1b[34m",
        string: "\x1b[32m",
        note: "\x1b[2m",
        reset: "\x1b[0m",
    };

    pub const OFF: Self = Self {
        section: "",
        table: "",
        string: "",
        note: "",
        reset: "",
    };

    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }
}
