use core::fmt;

/// A 1-based line/column position within the source text being tokenized.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Location {
    /// 1-based line number.
    pub line: u64,
    /// 1-based column number.
    pub column: u64,
}

impl Location {
    pub(crate) fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    pub(crate) fn into_error(self, message: impl Into<String>) -> LexerError {
        LexerError {
            message: message.into(),
            line: self.line,
            column: self.column,
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

/// An error raised while tokenizing a textual column spec (RANGE, SET or
/// point literal — spec §4.1's textual half of value coercion).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LexerError {
    /// A human-readable description of what went wrong.
    pub message: String,
    /// The line the error was detected on.
    pub line: u64,
    /// The column the error was detected on.
    pub column: u64,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}, column {}", self.message, self.line, self.column)
    }
}

impl std::error::Error for LexerError {}
