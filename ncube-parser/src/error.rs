use core::fmt;

use ncube_lexer::LexerError;

/// An error raised while parsing a textual column spec into a typed
/// [`ncube_model::Value`] (spec §4.1, §7 `ConversionFailed`).
#[derive(Clone, Debug, PartialEq)]
pub enum ParserError {
    /// The input couldn't even be tokenized.
    TokenizeError(String),
    /// Tokenization succeeded but the token sequence doesn't form a valid
    /// spec for the requested shape (range/set/point).
    ParseError(String),
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParserError::TokenizeError(s) => s,
            ParserError::ParseError(s) => s,
        })
    }
}

impl std::error::Error for ParserError {}

impl From<LexerError> for ParserError {
    fn from(err: LexerError) -> Self {
        Self::TokenizeError(err.to_string())
    }
}

impl From<String> for ParserError {
    fn from(err: String) -> Self {
        Self::ParseError(err)
    }
}

impl From<&str> for ParserError {
    fn from(err: &str) -> Self {
        Self::ParseError(err.into())
    }
}

pub(crate) fn parse_error<R>(message: impl Into<String>) -> Result<R, ParserError> {
    Err(ParserError::ParseError(message.into()))
}
