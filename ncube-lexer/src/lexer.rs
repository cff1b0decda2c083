use core::iter::Peekable;
use core::str::Chars;

use crate::error::{LexerError, Location};
use crate::token::Token;

/// Tokenizer for RANGE (`"lo,hi"` / `"[lo,hi]"`), SET (comma-separated
/// discretes and/or bracketed ranges) and point (`"x,y"` / `"x,y,z"`)
/// textual column specs (spec §4.1).
pub struct Lexer<'a> {
    iter: Peekable<Chars<'a>>,
    location: Location,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            iter: input.chars().peekable(),
            location: Location::default(),
        }
    }

    /// The current scan position, for error reporting by callers that wrap
    /// this lexer's output.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Tokenizes the whole input, discarding whitespace between tokens.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        self.skip_whitespace();
        match self.iter.peek() {
            None => Ok(None),
            Some(&ch) => match ch {
                ',' => {
                    self.next_char();
                    Ok(Some(Token::Comma))
                }
                '[' => {
                    self.next_char();
                    Ok(Some(Token::LeftBracket))
                }
                ']' => {
                    self.next_char();
                    Ok(Some(Token::RightBracket))
                }
                '\'' | '"' => {
                    let quote = ch;
                    self.next_char();
                    self.tokenize_string(quote).map(Some)
                }
                '-' | '+' if self.peek_is_digit_after_sign() => self.tokenize_number().map(Some),
                ch if ch.is_ascii_digit() || ch == '.' => self.tokenize_number().map(Some),
                ch if ch.is_alphabetic() || ch == '_' => Ok(Some(self.tokenize_ident())),
                other => self.tokenize_error(format!("unexpected character '{other}'")),
            },
        }
    }

    fn peek_is_digit_after_sign(&mut self) -> bool {
        let mut lookahead = self.iter.clone();
        lookahead.next();
        matches!(lookahead.peek(), Some(c) if c.is_ascii_digit() || *c == '.')
    }

    fn skip_whitespace(&mut self) {
        while self.iter.next_if(|c| c.is_whitespace()).is_some() {
            self.location.advance(' ');
        }
    }

    fn tokenize_string(&mut self, quote: char) -> Result<Token, LexerError> {
        let mut s = String::new();
        loop {
            match self.next_char() {
                Some(ch) if ch == quote => return Ok(Token::String(s)),
                Some(ch) => s.push(ch),
                None => return self.tokenize_error("unterminated string literal"),
            }
        }
    }

    fn tokenize_number(&mut self) -> Result<Token, LexerError> {
        let mut s = String::new();
        if self.iter.peek() == Some(&'-') || self.iter.peek() == Some(&'+') {
            s.push(self.next_char().expect("peeked"));
        }
        s.push_str(&self.next_while(|c| c.is_ascii_digit()));
        if self.iter.peek() == Some(&'.') {
            s.push(self.next_char().expect("peeked"));
            s.push_str(&self.next_while(|c| c.is_ascii_digit()));
        }
        if matches!(self.iter.peek(), Some('e' | 'E')) {
            let mut lookahead = self.iter.clone();
            lookahead.next();
            let exponent_valid = match lookahead.peek() {
                Some('+' | '-') => {
                    lookahead.next();
                    matches!(lookahead.peek(), Some(c) if c.is_ascii_digit())
                }
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if exponent_valid {
                s.push(self.next_char().expect("peeked"));
                if matches!(self.iter.peek(), Some('+' | '-')) {
                    s.push(self.next_char().expect("peeked"));
                }
                s.push_str(&self.next_while(|c| c.is_ascii_digit()));
            }
        }
        Ok(Token::Number(s))
    }

    fn tokenize_ident(&mut self) -> Token {
        let first = self.next_char().expect("peeked");
        let mut ident = first.to_string();
        ident.push_str(&self.next_while(|c| c.is_alphanumeric() || c == '_'));
        Token::Ident(ident)
    }

    fn tokenize_error<R>(&self, message: impl Into<String>) -> Result<R, LexerError> {
        Err(self.location.into_error(message))
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.iter.next()?;
        self.location.advance(ch);
        Some(ch)
    }

    fn next_while<F: Fn(char) -> bool>(&mut self, predicate: F) -> String {
        let mut value = String::new();
        while let Some(ch) = self.iter.next_if(|&c| predicate(c)) {
            self.location.advance(ch);
            value.push(ch);
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Result<Vec<Token>, LexerError> {
        Lexer::new(input).tokenize()
    }

    #[test]
    fn tokenizes_a_discrete_set() {
        assert_eq!(
            tokenize("1, 2, 3").unwrap(),
            vec![
                Token::Number("1".into()),
                Token::Comma,
                Token::Number("2".into()),
                Token::Comma,
                Token::Number("3".into()),
            ]
        );
    }

    #[test]
    fn tokenizes_a_bracketed_range() {
        assert_eq!(
            tokenize("[1,10]").unwrap(),
            vec![
                Token::LeftBracket,
                Token::Number("1".into()),
                Token::Comma,
                Token::Number("10".into()),
                Token::RightBracket,
            ]
        );
    }

    #[test]
    fn tokenizes_negative_and_decimal_numbers() {
        assert_eq!(
            tokenize("-1.5,2.5e-3").unwrap(),
            vec![
                Token::Number("-1.5".into()),
                Token::Comma,
                Token::Number("2.5e-3".into()),
            ]
        );
    }

    #[test]
    fn tokenizes_quoted_strings() {
        assert_eq!(
            tokenize("'abc', \"def\"").unwrap(),
            vec![Token::String("abc".into()), Token::Comma, Token::String("def".into())]
        );
    }

    #[test]
    fn tokenizes_reserved_words_as_idents() {
        assert_eq!(
            tokenize("null, false").unwrap(),
            vec![
                Token::Ident("null".into()),
                Token::Comma,
                Token::Ident("false".into()),
            ]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize("'abc").unwrap_err();
        assert_eq!(err.message, "unterminated string literal");
    }
}
