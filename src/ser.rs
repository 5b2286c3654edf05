/*!
A serde serializer for outgoing RESP commands.

A command on the wire is an array of bulk strings. The [`Serializer`] accepts
any sequence of known length, and writes each element as a bulk string:
strings and bytes are written verbatim, numbers and `bool`s are written in
decimal (`bool` as `1` or `0`), and unit variants are written as their names.
Anything else (nested sequences, maps, nulls) is an error.

# Example

```
use seredisearch::{encode, ser};

let command = encode::drop_index("cities", true);
let bytes = ser::to_vec(&command).unwrap();

assert_eq!(bytes, b"*3\r\n$12\r\nFT.DROPINDEX\r\n$6\r\ncities\r\n$2\r\nDD\r\n");
```
*/

use std::{
    fmt::{Display, Write as _},
    io,
};

use arrayvec::ArrayString;
use paste::paste;
use serde::ser;
use thiserror::Error;

/// Errors that can occur while serializing a command.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// There was an i/o error while writing the command.
    #[error("i/o error during serialization")]
    Io(#[from] io::Error),

    /// The command was a sequence without a known length. RESP arrays are
    /// length prefixed.
    #[error("can't serialize a command of unknown length")]
    UnknownLength,

    /// The command had more or fewer arguments than it reported.
    #[error("command had a different number of arguments than its reported length")]
    BadLength,

    /// A command or argument was a kind of value that has no RESP command
    /// encoding.
    #[error("can't serialize {0} as part of a command")]
    Unsupported(&'static str),

    /// A command argument was itself a sequence, map, or struct.
    #[error("command arguments must be strings or numbers, not collections")]
    Nested,

    /// Error from the type being serialized.
    #[error("error from Serialize type: {0}")]
    Custom(String),
}

impl ser::Error for Error {
    #[inline]
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Self::Custom(msg.to_string())
    }
}

/// Serialize a command to a new byte vector.
pub fn to_vec<T>(command: &T) -> Result<Vec<u8>, Error>
where
    T: ser::Serialize + ?Sized,
{
    let mut buffer = Vec::new();
    command.serialize(Serializer::new(&mut buffer))?;
    Ok(buffer)
}

fn write_bulk(writer: &mut impl io::Write, payload: &[u8]) -> Result<(), Error> {
    write!(writer, "${}\r\n", payload.len())?;
    writer.write_all(payload)?;
    writer.write_all(b"\r\n")?;
    Ok(())
}

/// Serializer for a whole command, which must be a sequence.
#[derive(Debug)]
pub struct Serializer<'a, W> {
    writer: &'a mut W,
}

impl<'a, W: io::Write> Serializer<'a, W> {
    /// Create a serializer that writes a command to `writer`.
    #[inline]
    #[must_use]
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }

    fn start(self, length: usize) -> Result<SerializeCommand<'a, W>, Error> {
        write!(self.writer, "*{length}\r\n")?;

        Ok(SerializeCommand {
            writer: self.writer,
            remaining: length,
        })
    }
}

macro_rules! unsupported {
    ($($kind:ident($($type:ty),*) as $description:literal;)*) => {$(
        paste! {
            #[inline]
            fn [<serialize_ $kind>](self, $(_: $type),*) -> Result<Self::Ok, Self::Error> {
                Err(Error::Unsupported($description))
            }
        }
    )*};
}

impl<'a, W: io::Write> ser::Serializer for Serializer<'a, W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = SerializeCommand<'a, W>;
    type SerializeTuple = SerializeCommand<'a, W>;
    type SerializeTupleStruct = SerializeCommand<'a, W>;

    type SerializeTupleVariant = ser::Impossible<(), Error>;
    type SerializeMap = ser::Impossible<(), Error>;
    type SerializeStruct = ser::Impossible<(), Error>;
    type SerializeStructVariant = ser::Impossible<(), Error>;

    unsupported! {
        bool(bool) as "a bool";
        i8(i8) as "an integer";
        i16(i16) as "an integer";
        i32(i32) as "an integer";
        i64(i64) as "an integer";
        u8(u8) as "an integer";
        u16(u16) as "an integer";
        u32(u32) as "an integer";
        u64(u64) as "an integer";
        f32(f32) as "a float";
        f64(f64) as "a float";
        char(char) as "a char";
        str(&str) as "a string";
        bytes(&[u8]) as "bytes";
        none() as "null";
        unit() as "null";
        unit_struct(&'static str) as "null";
        unit_variant(&'static str, u32, &'static str) as "an enum";
    }

    #[inline]
    fn serialize_some<T>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + ser::Serialize,
    {
        value.serialize(self)
    }

    #[inline]
    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + ser::Serialize,
    {
        value.serialize(self)
    }

    #[inline]
    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + ser::Serialize,
    {
        Err(Error::Unsupported("an enum"))
    }

    #[inline]
    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        self.start(len.ok_or(Error::UnknownLength)?)
    }

    #[inline]
    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        self.start(len)
    }

    #[inline]
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.start(len)
    }

    #[inline]
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(Error::Unsupported("an enum"))
    }

    #[inline]
    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(Error::Unsupported("a map"))
    }

    #[inline]
    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Err(Error::Unsupported("a struct"))
    }

    #[inline]
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(Error::Unsupported("an enum"))
    }
}

/// Serializer for the arguments of a command, each of which is written as a
/// bulk string.
#[derive(Debug)]
pub struct SerializeCommand<'a, W> {
    writer: &'a mut W,
    remaining: usize,
}

impl<W: io::Write> SerializeCommand<'_, W> {
    fn argument<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: ?Sized + ser::Serialize,
    {
        self.remaining = self.remaining.checked_sub(1).ok_or(Error::BadLength)?;
        value.serialize(ArgumentSerializer {
            writer: &mut *self.writer,
        })
    }

    fn finish(self) -> Result<(), Error> {
        match self.remaining {
            0 => Ok(()),
            _ => Err(Error::BadLength),
        }
    }
}

impl<W: io::Write> ser::SerializeSeq for SerializeCommand<'_, W> {
    type Ok = ();
    type Error = Error;

    #[inline]
    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: ?Sized + ser::Serialize,
    {
        self.argument(value)
    }

    #[inline]
    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

impl<W: io::Write> ser::SerializeTuple for SerializeCommand<'_, W> {
    type Ok = ();
    type Error = Error;

    #[inline]
    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: ?Sized + ser::Serialize,
    {
        self.argument(value)
    }

    #[inline]
    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

impl<W: io::Write> ser::SerializeTupleStruct for SerializeCommand<'_, W> {
    type Ok = ();
    type Error = Error;

    #[inline]
    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: ?Sized + ser::Serialize,
    {
        self.argument(value)
    }

    #[inline]
    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

struct ArgumentSerializer<'a, W> {
    writer: &'a mut W,
}

impl<W: io::Write> ArgumentSerializer<'_, W> {
    fn display(self, value: impl Display) -> Result<(), Error> {
        let mut buffer: ArrayString<384> = ArrayString::new();
        write!(buffer, "{value}").map_err(|_| Error::Unsupported("an oversized number"))?;
        write_bulk(self.writer, buffer.as_bytes())
    }
}

macro_rules! decimal {
    ($($type:ident)*) => {$(
        paste! {
            #[inline]
            fn [<serialize_ $type>](self, v: $type) -> Result<Self::Ok, Self::Error> {
                self.display(v)
            }
        }
    )*};
}

macro_rules! nested {
    ($($kind:ident($($type:ty),*) -> $output:ident;)*) => {$(
        paste! {
            #[inline]
            fn [<serialize_ $kind>](self, $(_: $type),*) -> Result<Self::$output, Self::Error> {
                Err(Error::Nested)
            }
        }
    )*};
}

impl<W: io::Write> ser::Serializer for ArgumentSerializer<'_, W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = ser::Impossible<(), Error>;
    type SerializeTuple = ser::Impossible<(), Error>;
    type SerializeTupleStruct = ser::Impossible<(), Error>;
    type SerializeTupleVariant = ser::Impossible<(), Error>;
    type SerializeMap = ser::Impossible<(), Error>;
    type SerializeStruct = ser::Impossible<(), Error>;
    type SerializeStructVariant = ser::Impossible<(), Error>;

    decimal! {i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64}

    nested! {
        seq(Option<usize>) -> SerializeSeq;
        tuple(usize) -> SerializeTuple;
        tuple_struct(&'static str, usize) -> SerializeTupleStruct;
        tuple_variant(&'static str, u32, &'static str, usize) -> SerializeTupleVariant;
        map(Option<usize>) -> SerializeMap;
        struct(&'static str, usize) -> SerializeStruct;
        struct_variant(&'static str, u32, &'static str, usize) -> SerializeStructVariant;
    }

    #[inline]
    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        write_bulk(self.writer, if v { b"1" } else { b"0" })
    }

    #[inline]
    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        write_bulk(self.writer, v.encode_utf8(&mut [0; 4]).as_bytes())
    }

    #[inline]
    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        write_bulk(self.writer, v.as_bytes())
    }

    #[inline]
    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        write_bulk(self.writer, v)
    }

    #[inline]
    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Err(Error::Unsupported("null"))
    }

    #[inline]
    fn serialize_some<T>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + ser::Serialize,
    {
        value.serialize(self)
    }

    #[inline]
    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Err(Error::Unsupported("null"))
    }

    #[inline]
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        Err(Error::Unsupported("null"))
    }

    #[inline]
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        write_bulk(self.writer, variant.as_bytes())
    }

    #[inline]
    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + ser::Serialize,
    {
        value.serialize(self)
    }

    #[inline]
    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + ser::Serialize,
    {
        Err(Error::Unsupported("an enum"))
    }
}

#[cfg(test)]
mod tests {
    use cool_asserts::assert_matches;
    use serde::{Serialize, Serializer as _};

    use super::*;
    use crate::{encode, token::Token};

    #[test]
    fn test_tokens() {
        let command = [
            Token::from("HSET"),
            Token::from("city:1"),
            Token::from("population"),
            Token::Int(-12),
            Token::Float(1.5),
        ];

        assert_eq!(
            to_vec(&command[..]).unwrap(),
            b"*5\r\n$4\r\nHSET\r\n$6\r\ncity:1\r\n$10\r\npopulation\r\n$3\r\n-12\r\n$3\r\n1.5\r\n"
        );
    }

    #[test]
    fn test_search_command() {
        let command = encode::index_info("cities");
        assert_eq!(
            to_vec(&command).unwrap(),
            b"*2\r\n$7\r\nFT.INFO\r\n$6\r\ncities\r\n"
        );
    }

    #[test]
    fn test_binary_safe() {
        let command = ("SET", "key", "line\r\nbreak");
        assert_eq!(
            to_vec(&command).unwrap(),
            b"*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$11\r\nline\r\nbreak\r\n"
        );
    }

    #[test]
    fn test_plain_values() {
        #[derive(Serialize)]
        enum Order {
            Asc,
        }

        let command = ("CMD", true, 'x', 42u64, Order::Asc, Some("opt"));
        assert_eq!(
            to_vec(&command).unwrap(),
            b"*6\r\n$3\r\nCMD\r\n$1\r\n1\r\n$1\r\nx\r\n$2\r\n42\r\n$3\r\nAsc\r\n$3\r\nopt\r\n"
        );
    }

    #[test]
    fn test_nested() {
        let command = ("CMD", ["a", "b"]);
        assert_matches!(to_vec(&command), Err(Error::Nested));
    }

    #[test]
    fn test_not_a_command() {
        assert_matches!(to_vec("PING"), Err(Error::Unsupported("a string")));
        assert_matches!(to_vec(&5), Err(Error::Unsupported("an integer")));
    }

    #[test]
    fn test_null_argument() {
        let command: (&str, Option<&str>) = ("CMD", None);
        assert_matches!(to_vec(&command), Err(Error::Unsupported("null")));
    }

    #[test]
    fn test_unknown_length() {
        struct Unsized;

        impl Serialize for Unsized {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                use serde::ser::SerializeSeq as _;

                let mut seq = serializer.serialize_seq(None)?;
                seq.serialize_element("PING")?;
                seq.end()
            }
        }

        assert_matches!(to_vec(&Unsized), Err(Error::UnknownLength));
    }

    #[test]
    fn test_bad_length() {
        use serde::ser::SerializeSeq as _;

        let mut buffer = Vec::new();
        let mut seq = Serializer::new(&mut buffer).serialize_seq(Some(2)).unwrap();
        seq.serialize_element("PING").unwrap();
        assert_matches!(seq.end(), Err(Error::BadLength));
    }
}
