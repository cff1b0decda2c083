use core::fmt;

/// A single lexical token from a textual column spec.
///
/// The grammar is tiny compared to SQL, so unlike a SQL lexer this one
/// discards whitespace rather than emitting it.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// A numeric literal's raw text, e.g. `"-12.5"` or `"3"` — left unparsed
    /// so the caller can promote it to LONG, BIG_DECIMAL or DOUBLE as the
    /// target axis's value-type dictates (spec §4.1).
    Number(String),
    /// A single- or double-quoted string literal's unquoted content.
    String(String),
    /// A bare word, e.g. `true`, `false`, `null`, or an unquoted discrete
    /// string. The parser, not the lexer, rejects the reserved words.
    Ident(String),
    /// `,`
    Comma,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(s) => write!(f, "{s}"),
            Token::String(s) => write!(f, "\"{s}\""),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Comma => f.write_str(","),
            Token::LeftBracket => f.write_str("["),
            Token::RightBracket => f.write_str("]"),
        }
    }
}
