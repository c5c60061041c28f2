//! Dynamic binding values.
//!
//! The compiler itself is generic over the value type; `SqlValue` is the
//! concrete type used by the CLI and by callers that assemble bindings from
//! text or JSON.

use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case},
    character::complete::{char, digit1},
    combinator::{all_consuming, opt, recognize, value},
    multi::many0,
    sequence::{delimited, pair, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};

/// Dynamic value type for query bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl SqlValue {
    /// Parse a literal as typed on a command line.
    ///
    /// `null`, `true`/`false`, integers, floats and `'quoted'` strings are
    /// recognized; anything else is kept as a plain string.
    ///
    /// ```
    /// use sqlbind::SqlValue;
    ///
    /// assert_eq!(SqlValue::parse_literal("42"), SqlValue::Int(42));
    /// assert_eq!(SqlValue::parse_literal("'42'"), SqlValue::String("42".into()));
    /// assert_eq!(SqlValue::parse_literal("alice"), SqlValue::String("alice".into()));
    /// ```
    pub fn parse_literal(input: &str) -> Self {
        let input = input.trim();
        match all_consuming(parse_value)(input) {
            Ok((_, v)) => v,
            Err(_) => SqlValue::String(input.to_string()),
        }
    }
}

/// Parse a value.
fn parse_value(input: &str) -> IResult<&str, SqlValue> {
    alt((
        value(SqlValue::Null, tag_no_case("null")),
        value(SqlValue::Bool(true), tag_no_case("true")),
        value(SqlValue::Bool(false), tag_no_case("false")),
        parse_number,
        parse_quoted_string,
    ))(input)
}

/// Parse a number (integer or float).
fn parse_number(input: &str) -> IResult<&str, SqlValue> {
    let (input, num_str) = recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
    )))(input)?;

    if !num_str.contains('.') {
        if let Ok(n) = num_str.parse::<i64>() {
            return Ok((input, SqlValue::Int(n)));
        }
    }
    // i64 overflow still parses as f64
    Ok((input, SqlValue::Float(num_str.parse().unwrap_or(f64::NAN))))
}

/// Parse a quoted string; `''` inside stands for one quote.
fn parse_quoted_string(input: &str) -> IResult<&str, SqlValue> {
    let (input, parts) = delimited(
        char('\''),
        many0(alt((is_not("'"), value("'", tag("''"))))),
        char('\''),
    )(input)?;

    Ok((input, SqlValue::String(parts.concat())))
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Int(n) => write!(f, "{}", n),
            SqlValue::Float(x) => write!(f, "{}", x),
            SqlValue::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::String(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_sql_value_from() {
        assert_eq!(SqlValue::from(true), SqlValue::Bool(true));
        assert_eq!(SqlValue::from(42i32), SqlValue::Int(42));
        assert_eq!(SqlValue::from("hello"), SqlValue::String("hello".into()));
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(3i64)), SqlValue::Int(3));
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(SqlValue::parse_literal("NULL"), SqlValue::Null);
        assert_eq!(SqlValue::parse_literal("true"), SqlValue::Bool(true));
        assert_eq!(SqlValue::parse_literal("false"), SqlValue::Bool(false));
        assert_eq!(SqlValue::parse_literal("-7"), SqlValue::Int(-7));
        assert_eq!(SqlValue::parse_literal("2.5"), SqlValue::Float(2.5));
        assert_eq!(
            SqlValue::parse_literal("'hello world'"),
            SqlValue::String("hello world".into())
        );
    }

    #[test]
    fn test_parse_literal_falls_back_to_string() {
        assert_eq!(SqlValue::parse_literal("12abc"), SqlValue::String("12abc".into()));
        assert_eq!(SqlValue::parse_literal("trueish"), SqlValue::String("trueish".into()));
        assert_eq!(SqlValue::parse_literal("'open"), SqlValue::String("'open".into()));
    }

    #[test]
    fn test_parse_literal_case_and_whitespace() {
        assert_eq!(SqlValue::parse_literal("TRUE"), SqlValue::Bool(true));
        assert_eq!(SqlValue::parse_literal("False"), SqlValue::Bool(false));
        assert_eq!(SqlValue::parse_literal("  bob "), SqlValue::String("bob".into()));
    }

    #[test]
    fn test_parse_literal_doubled_quotes() {
        assert_eq!(SqlValue::parse_literal("'O''Neil'"), SqlValue::String("O'Neil".into()));
        assert_eq!(SqlValue::parse_literal("''"), SqlValue::String(String::new()));

        let original = SqlValue::from("it's");
        assert_eq!(SqlValue::parse_literal(&original.to_string()), original);
    }

    #[test]
    fn test_parse_literal_overflow_is_float() {
        assert_eq!(
            SqlValue::parse_literal("99999999999999999999"),
            SqlValue::Float(99999999999999999999.0)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(SqlValue::Null.to_string(), "NULL");
        assert_eq!(SqlValue::from("O'Neil").to_string(), "'O''Neil'");
        assert_eq!(SqlValue::Int(5).to_string(), "5");
    }

    #[test]
    fn test_json_map() {
        let map: HashMap<String, SqlValue> =
            serde_json::from_str(r#"{"id": 5, "name": "Bob", "ratio": 0.5, "gone": null, "ok": true}"#)
                .unwrap();
        assert_eq!(map["id"], SqlValue::Int(5));
        assert_eq!(map["name"], SqlValue::String("Bob".into()));
        assert_eq!(map["ratio"], SqlValue::Float(0.5));
        assert_eq!(map["gone"], SqlValue::Null);
        assert_eq!(map["ok"], SqlValue::Bool(true));

        assert_eq!(serde_json::to_string(&SqlValue::Int(1)).unwrap(), "1");
    }
}
