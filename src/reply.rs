/*!
A dynamically typed server reply.

[`Reply`] is the common currency between a [`Transport`][crate::transport::Transport]
and the [result decoder][crate::results]. It covers the RESP data model as
it's used by RediSearch replies: null, integers, binary-safe strings, and
arrays. Simple strings (such as `+OK`) are folded into [`Reply::String`].
*/

use std::{fmt, str};

use serde::de;

/// A single value in a server reply.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Reply {
    /// A null bulk string or null array.
    #[default]
    Nil,

    /// A RESP integer.
    Integer(i64),

    /// A bulk or simple string. The payload isn't required to be UTF-8.
    String(Vec<u8>),

    /// An array of nested replies.
    Array(Vec<Reply>),
}

impl Reply {
    /// If this is a UTF-8 string, get it.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Reply::String(bytes) => str::from_utf8(bytes).ok(),
            _ => None,
        }
    }

    /// If this is an integer, get it.
    #[inline]
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Reply::Integer(value) => Some(value),
            _ => None,
        }
    }

    /// If this is an array, get its elements.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&[Reply]> {
        match self {
            Reply::Array(items) => Some(items),
            _ => None,
        }
    }

    /// True if this is [`Reply::Nil`].
    #[inline]
    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }
}

impl From<i64> for Reply {
    #[inline]
    fn from(value: i64) -> Self {
        Reply::Integer(value)
    }
}

impl From<&str> for Reply {
    #[inline]
    fn from(value: &str) -> Self {
        Reply::String(value.as_bytes().to_owned())
    }
}

impl From<String> for Reply {
    #[inline]
    fn from(value: String) -> Self {
        Reply::String(value.into_bytes())
    }
}

impl From<Vec<Reply>> for Reply {
    #[inline]
    fn from(items: Vec<Reply>) -> Self {
        Reply::Array(items)
    }
}

impl<T: Into<Reply>, const N: usize> From<[T; N]> for Reply {
    fn from(items: [T; N]) -> Self {
        Reply::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<'de> de::Deserialize<'de> for Reply {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = Reply;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a string, integer, null, or array")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Reply::String(v.to_owned()))
            }

            fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Reply::String(v))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(v.into())
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(v.into())
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Reply::Integer(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                i64::try_from(v)
                    .map(Reply::Integer)
                    .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Reply::Nil)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Reply::Nil)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                <Reply as de::Deserialize>::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));

                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }

                Ok(Reply::Array(items))
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize as _;
    use serde_test::{assert_de_tokens, Token};

    use super::*;

    #[test]
    fn test_accessors() {
        let reply = Reply::from(["abc"]);
        assert_eq!(reply.as_array(), Some(&[Reply::from("abc")][..]));
        assert_eq!(reply.as_str(), None);
        assert_eq!(Reply::from("abc").as_str(), Some("abc"));
        assert_eq!(Reply::String(vec![0xff, 0xfe]).as_str(), None);
        assert_eq!(Reply::from(5i64).as_integer(), Some(5));
        assert!(Reply::Nil.is_nil());
    }

    #[test]
    fn test_deserialize_nested() {
        assert_de_tokens(
            &Reply::Array(vec![
                Reply::Integer(1),
                Reply::from("doc:1"),
                Reply::Array(vec![Reply::from("title"), Reply::Nil]),
            ]),
            &[
                Token::Seq { len: Some(3) },
                Token::I64(1),
                Token::BorrowedBytes(b"doc:1"),
                Token::Seq { len: Some(2) },
                Token::Str("title"),
                Token::Unit,
                Token::SeqEnd,
                Token::SeqEnd,
            ],
        );
    }

    #[test]
    fn test_deserialize_from_json() {
        let reply = Reply::deserialize(serde_json::json!([2, "a", null])).unwrap();
        assert_eq!(
            reply,
            Reply::Array(vec![Reply::Integer(2), Reply::from("a"), Reply::Nil])
        );
    }

    #[test]
    fn test_deserialize_rejects_huge_unsigned() {
        let result = Reply::deserialize(serde_json::json!(u64::MAX));
        assert!(result.is_err());
    }
}
