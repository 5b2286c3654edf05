/*!
Wire tokens: the positional arguments of a RediSearch command.

RediSearch commands are always delivered as a list of strings, but building
them from a configuration model involves a mix of keywords, user strings,
counts and numbers. [`Token`] is the tagged representation of one argument;
it's rendered to its string form only when it's written to the wire (see the
[`Serialize`][ser::Serialize] and [`Display`][fmt::Display] implementations).
*/

use std::{
    borrow::Cow,
    fmt::{self, Write as _},
};

use arrayvec::ArrayString;
use serde::ser;

/**
A single positional argument in a command.

Borrowed strings are used wherever possible, so encoding a command from a
configuration object doesn't copy any of the configuration's strings.

# Example

```
use seredisearch::token::Token;

let tokens = [
    Token::from("LIMIT"),
    Token::from(0i64),
    Token::Float(2.5),
    Token::Byte(b','),
];

let rendered: Vec<String> = tokens.iter().map(ToString::to_string).collect();
assert_eq!(rendered, ["LIMIT", "0", "2.5", ","]);
```
*/
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// A keyword or string argument, sent verbatim.
    Str(Cow<'a, str>),

    /// An integer argument, sent in base 10.
    Int(i64),

    /// A floating point argument. Infinities are sent as `+inf` and `-inf`,
    /// following the RediSearch range syntax.
    Float(f64),

    /// A single character argument, such as a tag separator.
    Byte(u8),
}

impl Token<'_> {
    /// Create an integer token from a collection length, as used by the
    /// counted blocks (`PREFIX <count> ...`, `RETURN <count> ...`).
    #[inline]
    #[must_use]
    pub fn count(len: usize) -> Self {
        Token::Int(i64::try_from(len).unwrap_or(i64::MAX))
    }

    /// Detach this token from whatever it was borrowing.
    #[must_use]
    pub fn into_owned(self) -> Token<'static> {
        match self {
            Token::Str(s) => Token::Str(Cow::Owned(s.into_owned())),
            Token::Int(v) => Token::Int(v),
            Token::Float(v) => Token::Float(v),
            Token::Byte(v) => Token::Byte(v),
        }
    }
}

impl<'a> From<&'a str> for Token<'a> {
    #[inline]
    fn from(value: &'a str) -> Self {
        Token::Str(Cow::Borrowed(value))
    }
}

impl From<String> for Token<'_> {
    #[inline]
    fn from(value: String) -> Self {
        Token::Str(Cow::Owned(value))
    }
}

impl From<i64> for Token<'_> {
    #[inline]
    fn from(value: i64) -> Self {
        Token::Int(value)
    }
}

impl From<u32> for Token<'_> {
    #[inline]
    fn from(value: u32) -> Self {
        Token::Int(value.into())
    }
}

impl From<u64> for Token<'_> {
    /// Values beyond `i64::MAX` saturate; RESP integers are signed 64 bit.
    #[inline]
    fn from(value: u64) -> Self {
        Token::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Token<'_> {
    #[inline]
    fn from(value: f64) -> Self {
        Token::Float(value)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Token::Str(ref s) => f.write_str(s),
            Token::Int(v) => write!(f, "{v}"),
            Token::Float(v) if v == f64::INFINITY => f.write_str("+inf"),
            Token::Float(v) if v == f64::NEG_INFINITY => f.write_str("-inf"),
            Token::Float(v) => write!(f, "{v}"),
            Token::Byte(v) => f.write_char(char::from(v)),
        }
    }
}

// The longest non-exponent rendering of an f64 (the smallest subnormal) is a
// bit over 320 characters.
const FORMAT_CAPACITY: usize = 384;

impl ser::Serialize for Token<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            Token::Str(s) => serializer.serialize_str(s),
            token => {
                let mut buffer: ArrayString<FORMAT_CAPACITY> = ArrayString::new();

                write!(&mut buffer, "{token}")
                    .map_err(|_| ser::Error::custom("numeric token was too long to format"))?;

                serializer.serialize_str(&buffer)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_test::{assert_ser_tokens, Token as SerdeToken};

    #[test]
    fn test_display() {
        assert_eq!(Token::from("SORTBY").to_string(), "SORTBY");
        assert_eq!(Token::Int(-12).to_string(), "-12");
        assert_eq!(Token::Float(12.5).to_string(), "12.5");
        assert_eq!(Token::Float(3.0).to_string(), "3");
        assert_eq!(Token::Float(f64::INFINITY).to_string(), "+inf");
        assert_eq!(Token::Float(f64::NEG_INFINITY).to_string(), "-inf");
        assert_eq!(Token::Byte(b';').to_string(), ";");
    }

    #[test]
    fn test_count() {
        assert_eq!(Token::count(3), Token::Int(3));
    }

    #[test]
    fn test_serialize_as_strings() {
        assert_ser_tokens(&Token::from("FT.INFO"), &[SerdeToken::Str("FT.INFO")]);
        assert_ser_tokens(&Token::Int(10), &[SerdeToken::Str("10")]);
        assert_ser_tokens(&Token::Float(-0.25), &[SerdeToken::Str("-0.25")]);
        assert_ser_tokens(&Token::Byte(b','), &[SerdeToken::Str(",")]);
    }

    #[test]
    fn test_serialize_tiny_float() {
        // Must fit in the formatting buffer
        let token = Token::Float(f64::MIN_POSITIVE / 4.0);
        let rendered = token.to_string();
        assert!(rendered.len() < FORMAT_CAPACITY);
    }

    #[test]
    fn test_into_owned() {
        let name = String::from("idx");
        let token = Token::from(name.as_str()).into_owned();
        drop(name);
        assert_eq!(token, Token::Str(Cow::Owned("idx".to_owned())));
    }
}
