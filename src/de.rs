/*!
A serde deserializer for RESP replies.

The [`Deserializer`] reads a single value from the front of a byte buffer,
advancing the buffer past it, so that several pipelined replies can be read
back to back. Strings are delivered as borrowed bytes, integers as `i64`,
null bulk strings and arrays as unit (or `None`), and arrays as sequences.
Error replies become [`Error::Server`].

# Example

```
use serde::Deserialize;
use seredisearch::{de::Deserializer, reply::Reply};

let mut input: &[u8] = b"*3\r\n:1\r\n$5\r\ndoc:1\r\n$-1\r\n+OK\r\n";

let reply = Reply::deserialize(Deserializer::new(&mut input)).unwrap();
assert_eq!(reply, Reply::Array(vec![
    Reply::Integer(1),
    Reply::from("doc:1"),
    Reply::Nil,
]));

let status: &str = Deserialize::deserialize(Deserializer::new(&mut input)).unwrap();
assert_eq!(status, "OK");
assert!(input.is_empty());
```

If the buffer ends partway through a value, the result is
[`parse::Error::UnexpectedEof`], wrapped in [`Error::Parse`], and the buffer
is left where the incomplete value started.
*/

pub mod parse;

use std::fmt::Display;

use serde::{de, de::Deserialize as _, forward_to_deserialize_any};
use thiserror::Error;

use self::parse::Header;

/// Errors that can occur while reading a reply.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum Error {
    /// The data wasn't valid RESP, or was incomplete.
    #[error("protocol error")]
    Parse(#[from] parse::Error),

    /// The server replied with an error.
    #[error("{0}")]
    Server(String),

    /// A bulk string was longer than RESP allows.
    #[error("bulk string length is out of bounds")]
    Length,

    /// The target type stopped reading an array before its end.
    #[error("a sequence deserializer didn't consume every element in the array")]
    UnfinishedArray,

    /// Error from the type being deserialized.
    #[error("error from Deserialize type: {0}")]
    Custom(String),
}

impl de::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Self::Custom(msg.to_string())
    }
}

impl Error {
    /// If this error was caused by the buffer ending early, get the minimum
    /// number of additional bytes needed.
    #[inline]
    #[must_use]
    pub fn needed(&self) -> Option<usize> {
        match *self {
            Error::Parse(parse::Error::UnexpectedEof(count)) => Some(count),
            _ => None,
        }
    }
}

/// Bulk strings can be up to 512 MB
const MAX_BULK_LENGTH: usize = 512 * 1024 * 1024;

/// A RESP deserializer. See the [module docs][self] for details.
#[derive(Debug)]
pub struct Deserializer<'a, 'de> {
    input: &'a mut &'de [u8],
}

impl<'a, 'de> Deserializer<'a, 'de> {
    /// Create a deserializer that reads from the front of `input`, advancing
    /// it past whatever is read.
    #[inline]
    #[must_use]
    pub fn new(input: &'a mut &'de [u8]) -> Self {
        Self { input }
    }
}

impl<'de> de::Deserializer<'de> for Deserializer<'_, 'de> {
    type Error = Error;

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        enum identifier ignored_any
    }

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let (header, tail) = parse::read_header(*self.input)?;

        match header {
            Header::SimpleString(payload) => {
                *self.input = tail;
                visitor.visit_borrowed_bytes(payload)
            }
            Header::Error(message) => {
                *self.input = tail;
                Err(Error::Server(String::from_utf8_lossy(message).into_owned()))
            }
            Header::Integer(value) => {
                *self.input = tail;
                visitor.visit_i64(value)
            }
            Header::Null => {
                *self.input = tail;
                visitor.visit_unit()
            }
            Header::BulkString(length) if length > MAX_BULK_LENGTH => Err(Error::Length),
            Header::BulkString(length) => {
                let (payload, tail) = parse::read_bulk(length, tail)?;
                *self.input = tail;
                visitor.visit_borrowed_bytes(payload)
            }
            Header::Array(length) => {
                let start = *self.input;
                *self.input = tail;

                let mut seq = SeqAccess {
                    remaining: length,
                    input: self.input,
                };

                let result = match visitor.visit_seq(&mut seq) {
                    Ok(..) if seq.remaining > 0 => Err(Error::UnfinishedArray),
                    Ok(value) => Ok(value),

                    // `remaining` still counts the element that ran out; every
                    // element after it is at least 3 bytes
                    Err(Error::Parse(parse::Error::UnexpectedEof(count))) => {
                        let rest = seq.remaining.saturating_sub(1).saturating_mul(3);
                        Err(Error::Parse(parse::Error::UnexpectedEof(
                            count.saturating_add(rest),
                        )))
                    }

                    // Skip the rest of the array, so that the whole reply is
                    // consumed
                    Err(Error::Server(message)) => (1..seq.remaining)
                        .try_for_each(|_| skip(seq.input))
                        .and(Err(Error::Server(message))),

                    Err(err) => Err(err),
                };

                if matches!(result, Err(Error::Parse(parse::Error::UnexpectedEof(_)))) {
                    *seq.input = start;
                }

                result
            }
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match parse::read_header(*self.input)? {
            (Header::Null, tail) => {
                *self.input = tail;
                visitor.visit_none()
            }
            _ => visitor.visit_some(self),
        }
    }

    #[inline]
    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }
}

/// Read and discard a single value. Error replies are discarded too.
fn skip(input: &mut &[u8]) -> Result<(), Error> {
    match de::IgnoredAny::deserialize(Deserializer::new(input)) {
        Ok(de::IgnoredAny) | Err(Error::Server(_)) => Ok(()),
        Err(err) => Err(err),
    }
}

struct SeqAccess<'a, 'de> {
    remaining: usize,
    input: &'a mut &'de [u8],
}

impl<'de> de::SeqAccess<'de> for SeqAccess<'_, 'de> {
    type Error = Error;

    #[inline]
    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        self.remaining
            .checked_sub(1)
            .map(|remaining| -> Result<T::Value, Error> {
                let value = seed.deserialize(Deserializer::new(self.input))?;
                self.remaining = remaining;
                Ok(value)
            })
            .transpose()
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

#[cfg(test)]
mod tests {
    use cool_asserts::assert_matches;
    use serde::Deserialize;

    use super::*;
    use crate::reply::Reply;

    fn read<'de, T: Deserialize<'de>>(input: &mut &'de [u8]) -> Result<T, Error> {
        T::deserialize(Deserializer::new(input))
    }

    #[test]
    fn test_search_reply() {
        let mut input: &[u8] = b"*3\r\n:1\r\n$5\r\ndoc:1\r\n*4\r\n$5\r\ntitle\r\n$5\r\nhello\r\n$4\r\nbody\r\n$0\r\n\r\n";

        let reply: Reply = read(&mut input).unwrap();
        assert_eq!(
            reply,
            Reply::Array(vec![
                Reply::Integer(1),
                Reply::from("doc:1"),
                Reply::from(["title", "hello", "body", ""]),
            ])
        );
        assert!(input.is_empty());
    }

    #[test]
    fn test_server_error() {
        let mut input: &[u8] = b"-Unknown Index name\r\n+OK\r\n";

        assert_matches!(
            read::<Reply>(&mut input),
            Err(Error::Server(message)) => assert_eq!(message, "Unknown Index name")
        );

        // The error reply is consumed
        assert_eq!(input, b"+OK\r\n");
        assert_eq!(read::<&str>(&mut input).unwrap(), "OK");
    }

    #[test]
    fn test_nested_server_error() {
        let mut input: &[u8] = b"*3\r\n:1\r\n-ERR inner\r\n*2\r\n-ERR again\r\n:3\r\n+OK\r\n";

        assert_matches!(
            read::<Reply>(&mut input),
            Err(Error::Server(message)) => assert_eq!(message, "ERR inner")
        );

        // The rest of the array is consumed along with the error
        assert_eq!(input, b"+OK\r\n");
    }

    #[test]
    fn test_nested_server_error_incomplete() {
        let full: &[u8] = b"*3\r\n:1\r\n-ERR inner\r\n:3";
        let mut input = full;

        assert_matches!(read::<Reply>(&mut input), Err(Error::Parse(parse::Error::UnexpectedEof(2))));
        assert_eq!(input, full);
    }

    #[test]
    fn test_nulls() {
        let mut input: &[u8] = b"$-1\r\n*-1\r\n:4\r\n";

        assert_eq!(read::<Option<i64>>(&mut input).unwrap(), None);
        assert_eq!(read::<Reply>(&mut input).unwrap(), Reply::Nil);
        assert_eq!(read::<Option<i64>>(&mut input).unwrap(), Some(4));
    }

    #[test]
    fn test_typed_targets() {
        let mut input: &[u8] = b"*2\r\n$3\r\nabc\r\n$3\r\ndef\r\n";
        let items: Vec<String> = read(&mut input).unwrap();
        assert_eq!(items, ["abc", "def"]);

        let mut input: &[u8] = b":-12\r\n";
        assert_eq!(read::<i32>(&mut input).unwrap(), -12);
    }

    #[test]
    fn test_incomplete_leaves_input() {
        let full: &[u8] = b"*2\r\n$5\r\nhello\r\n$5\r\nworld\r\n";

        for split in 0..full.len() {
            let mut input = &full[..split];
            let err = read::<Reply>(&mut input).unwrap_err();
            assert!(err.needed().is_some(), "split at {split}: {err:?}");
            assert_eq!(input.len(), split, "split at {split}");
        }
    }

    #[test]
    fn test_incomplete_array_estimate() {
        let mut input: &[u8] = b"*3\r\n:1\r\n";

        // The element that hit the end, plus 1 more element
        assert_matches!(
            read::<Reply>(&mut input),
            Err(Error::Parse(parse::Error::UnexpectedEof(6)))
        );
    }

    #[test]
    fn test_incomplete_estimate_is_lower_bound() {
        let full: &[u8] = b"*3\r\n:1\r\n$6\r\ncity:1\r\n*4\r\n$4\r\nname\r\n$5\r\nParis\r\n$3\r\npop\r\n$7\r\n2161000\r\n";

        for split in 0..full.len() {
            let mut input = &full[..split];
            let needed = read::<Reply>(&mut input).unwrap_err().needed().unwrap();

            assert!(needed > 0, "split at {split}");
            assert!(
                needed <= full.len() - split,
                "split at {split}: asked for {needed}, only {} remain",
                full.len() - split
            );
        }
    }

    #[test]
    fn test_unfinished_array() {
        let mut input: &[u8] = b"*2\r\n:1\r\n:2\r\n";
        assert_matches!(read::<(i64,)>(&mut input), Err(Error::UnfinishedArray));
    }

    #[test]
    fn test_bulk_too_long() {
        let mut input: &[u8] = b"$600000000\r\n";
        assert_matches!(read::<Reply>(&mut input), Err(Error::Length));
    }
}
