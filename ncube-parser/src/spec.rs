use core::iter::Peekable;
use core::str::FromStr;
use std::vec::IntoIter;

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use ncube_lexer::{Lexer, Token};
use ncube_model::{AxisValueType, ComparableValue, Value};

use crate::error::{parse_error, ParserError};

const RESERVED_WORDS: &[&str] = &["null", "true", "false"];

/// Parses the textual column specs RANGE/SET/NEAREST axes accept (spec
/// §4.1): `"lo,hi"` or `"[lo,hi]"` for ranges, comma-separated discretes
/// and/or bracketed ranges for sets, and `"x,y"` / `"x,y,z"` for 2-D/3-D/
/// lat-lon points.
pub struct SpecParser {
    tokens: Peekable<IntoIter<Token>>,
}

impl SpecParser {
    /// Tokenizes `input` and prepares it for parsing.
    pub fn new(input: &str) -> Result<Self, ParserError> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self {
            tokens: tokens.into_iter().peekable(),
        })
    }

    /// Parses a RANGE column spec: `low,high` or `[low,high]`, promoting
    /// both ends to `value_type`. Rejects `low >= high` (spec boundary
    /// case).
    pub fn parse_range(mut self, value_type: AxisValueType) -> Result<Value, ParserError> {
        let bracketed = self.eat(&Token::LeftBracket);
        let low = self.parse_scalar(value_type)?;
        self.expect_comma()?;
        let high = self.parse_scalar(value_type)?;
        if bracketed {
            self.expect(&Token::RightBracket)?;
        }
        self.expect_end()?;
        if !matches!(low.partial_cmp(&high), Some(core::cmp::Ordering::Less)) {
            return parse_error(format!("range low {low} must be strictly less than high {high}"));
        }
        Ok(Value::range(low, high))
    }

    /// Parses a SET column spec: one or more comma-separated discretes
    /// and/or `[low,high]` sub-ranges. Rejects an empty set and any
    /// `null`/`true`/`false` reserved-word token (spec boundary cases).
    pub fn parse_set(mut self, value_type: AxisValueType) -> Result<Value, ParserError> {
        let mut items = Vec::new();
        loop {
            if self.eat(&Token::LeftBracket) {
                let low = self.parse_scalar(value_type)?;
                self.expect_comma()?;
                let high = self.parse_scalar(value_type)?;
                self.expect(&Token::RightBracket)?;
                items.push(Value::range(low, high));
            } else {
                items.push(self.parse_scalar(value_type)?);
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect_end()?;
        if items.is_empty() {
            return parse_error("SET spec must contain at least one item");
        }
        Ok(Value::Set(items))
    }

    /// Parses a 2-D point: `"x,y"`.
    pub fn parse_point2d(mut self) -> Result<Value, ParserError> {
        let x = self.parse_number()?;
        self.expect_comma()?;
        let y = self.parse_number()?;
        self.expect_end()?;
        Ok(Value::Point2D(x, y))
    }

    /// Parses a 3-D point: `"x,y,z"`.
    pub fn parse_point3d(mut self) -> Result<Value, ParserError> {
        let x = self.parse_number()?;
        self.expect_comma()?;
        let y = self.parse_number()?;
        self.expect_comma()?;
        let z = self.parse_number()?;
        self.expect_end()?;
        Ok(Value::Point3D(x, y, z))
    }

    /// Parses a latitude/longitude pair: `"lat,lon"`.
    pub fn parse_lat_lon(mut self) -> Result<Value, ParserError> {
        let lat = self.parse_number()?;
        self.expect_comma()?;
        let lon = self.parse_number()?;
        self.expect_end()?;
        Ok(Value::LatLon(lat, lon))
    }

    fn parse_number(&mut self) -> Result<f64, ParserError> {
        match self.advance() {
            Some(Token::Number(s)) => s
                .parse::<f64>()
                .map_err(|_| ParserError::ParseError(format!("'{s}' is not a valid number"))),
            other => parse_error(format!("expected a number, found {}", describe(&other))),
        }
    }

    /// Parses a single scalar token (DISCRETE/NEAREST column values), taking
    /// and consuming the whole input.
    pub fn parse_discrete(mut self, value_type: AxisValueType) -> Result<Value, ParserError> {
        let value = self.parse_scalar(value_type)?;
        self.expect_end()?;
        Ok(value)
    }

    fn parse_scalar(&mut self, value_type: AxisValueType) -> Result<Value, ParserError> {
        let token = self.advance();
        match (&token, value_type) {
            (Some(Token::Ident(word)), _) if RESERVED_WORDS.contains(&word.to_ascii_lowercase().as_str()) => {
                parse_error(format!("'{word}' is not a valid column value"))
            }
            (Some(Token::Number(s)), AxisValueType::Long) => s
                .parse::<i64>()
                .map(Value::Long)
                .map_err(|_| ParserError::ParseError(format!("'{s}' is not a valid LONG"))),
            (Some(Token::Number(s)), AxisValueType::Double) => s
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|_| ParserError::ParseError(format!("'{s}' is not a valid DOUBLE"))),
            (Some(Token::Number(s)), AxisValueType::BigDecimal) => BigDecimal::from_str(s)
                .map(Value::BigDecimal)
                .map_err(|_| ParserError::ParseError(format!("'{s}' is not a valid BIG_DECIMAL"))),
            (Some(Token::String(s)), AxisValueType::String) | (Some(Token::Ident(s)), AxisValueType::String) => {
                Ok(Value::String(s.clone()))
            }
            (Some(Token::String(s)), AxisValueType::Date) => parse_date(s),
            (Some(Token::String(s)), AxisValueType::Comparable) | (Some(Token::Ident(s)), AxisValueType::Comparable) => {
                Ok(Value::Comparable(ComparableValue::from_label(s.clone())))
            }
            (Some(other), value_type) => parse_error(format!(
                "{other} is not a valid {value_type} column value"
            )),
            (None, _) => parse_error("unexpected end of input"),
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.tokens.peek() == Some(token) {
            self.tokens.next();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), ParserError> {
        if self.eat(token) {
            Ok(())
        } else {
            parse_error(format!("expected '{token}', found {}", describe(&self.tokens.peek().cloned())))
        }
    }

    fn expect_comma(&mut self) -> Result<(), ParserError> {
        self.expect(&Token::Comma)
    }

    fn expect_end(&mut self) -> Result<(), ParserError> {
        match self.tokens.next() {
            None => Ok(()),
            Some(trailing) => parse_error(format!("unexpected trailing token {trailing}")),
        }
    }

    fn advance(&mut self) -> Option<Token> {
        self.tokens.next()
    }
}

fn describe(token: &Option<Token>) -> String {
    match token {
        Some(t) => t.to_string(),
        None => "end of input".to_string(),
    }
}

/// Date-time formats accepted for DATE-typed scalars (spec §4.1 DATE coercion).
const DATE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
/// Date-only formats, parsed at midnight.
const DATE_ONLY_FORMATS: &[&str] = &["%Y-%m-%d", "%b %d %Y", "%d %b %Y"];

fn parse_date(s: &str) -> Result<Value, ParserError> {
    for format in DATE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Value::Date(dt));
        }
    }
    for format in DATE_ONLY_FORMATS {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(s, format) {
            return Ok(Value::Date(date.and_hms_opt(0, 0, 0).expect("midnight is valid")));
        }
    }
    Err(ParserError::ParseError(format!("'{s}' is not a valid DATE")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_plain_range() {
        let value = SpecParser::new("1,10").unwrap().parse_range(AxisValueType::Long).unwrap();
        assert_eq!(value, Value::range(Value::Long(1), Value::Long(10)));
    }

    #[test]
    fn parses_a_bracketed_range() {
        let value = SpecParser::new("[1,10]").unwrap().parse_range(AxisValueType::Long).unwrap();
        assert_eq!(value, Value::range(Value::Long(1), Value::Long(10)));
    }

    #[test]
    fn rejects_inverted_range() {
        let err = SpecParser::new("10,1").unwrap().parse_range(AxisValueType::Long).unwrap_err();
        assert!(matches!(err, ParserError::ParseError(_)));
    }

    #[test]
    fn parses_a_mixed_set() {
        let value = SpecParser::new("1, [5,10], 20")
            .unwrap()
            .parse_set(AxisValueType::Long)
            .unwrap();
        assert_eq!(
            value,
            Value::Set(vec![
                Value::Long(1),
                Value::range(Value::Long(5), Value::Long(10)),
                Value::Long(20),
            ])
        );
    }

    #[test]
    fn rejects_reserved_words_in_a_set() {
        let err = SpecParser::new("1, null").unwrap().parse_set(AxisValueType::Long).unwrap_err();
        assert!(matches!(err, ParserError::ParseError(_)));
    }

    #[test]
    fn rejects_an_empty_set() {
        // A blank input tokenizes to nothing, so parse_scalar hits EOF.
        let err = SpecParser::new("").unwrap().parse_set(AxisValueType::Long).unwrap_err();
        assert!(matches!(err, ParserError::ParseError(_)));
    }

    #[test]
    fn parses_a_point2d() {
        let value = SpecParser::new("3.0,4.0").unwrap().parse_point2d().unwrap();
        assert_eq!(value, Value::Point2D(3.0, 4.0));
    }

    #[test]
    fn parses_a_date() {
        let mut parser = SpecParser::new("'2024-01-15'").unwrap();
        let value = parser.parse_scalar(AxisValueType::Date).unwrap();
        assert_eq!(
            value,
            Value::Date(
                chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
    }
}
