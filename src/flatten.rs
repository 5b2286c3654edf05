/*!
Flattening of records into hash fields, for [upserts][crate::client::Client::upsert].

A record is any struct or map that implements [`Serialize`]. Each of its
top-level members becomes one hash field, named by its serde name, as long as
the member is a primitive:

- Strings and chars are stored verbatim.
- Integers and floats are stored in base 10.
- Booleans are stored as `1` or `0`.
- Unit enum variants are stored as the variant name.
- `Option`s and newtypes are unwrapped; `None` members are skipped.

Members of any other type (sequences, maps, nested structs, bytes, data-carrying
enum variants) are skipped.

# Example

```
use serde::Serialize;
use seredisearch::{flatten::to_fields, token::Token};

#[derive(Serialize)]
struct City {
    name: &'static str,
    population: u32,
    capital: bool,
    districts: Vec<String>,
}

let fields = to_fields(&City {
    name: "Popayan",
    population: 320_000,
    capital: true,
    districts: vec!["Centro".to_owned()],
}).unwrap();

assert_eq!(fields, [
    ("name".to_owned(), Token::from("Popayan")),
    ("population".to_owned(), Token::Int(320_000)),
    ("capital".to_owned(), Token::Int(1)),
]);
```
*/

use std::fmt::Display;

use paste::paste;
use serde::{ser, Serialize};
use thiserror::Error;

use crate::token::Token;

/// A flattened record: hash field names paired with their values.
pub type Fields = Vec<(String, Token<'static>)>;

/// Errors from flattening a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The record was `None` or `()`.
    #[error("can't store a null value as a record")]
    NilValue,

    /// The record wasn't a struct or a map.
    #[error("can't store {0} as a record; only structs and maps can be flattened")]
    NotARecord(&'static str),

    /// A map record had a key that wasn't a primitive.
    #[error("record field names must be strings or primitives")]
    UnsupportedKey,

    /// An error from the record's `Serialize` implementation.
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

/// Flatten a record into a list of hash fields. Fields appear in the order
/// they're serialized.
pub fn to_fields<V>(value: &V) -> Result<Fields, Error>
where
    V: Serialize + ?Sized,
{
    value.serialize(FieldsSerializer)
}

/// Generate `serialize_*` methods that reject a non-record value.
macro_rules! not_a_record {
    ($($type:ident: $description:literal,)*) => {$(
        paste! {
            #[inline]
            fn [<serialize_ $type>](self, _v: $type) -> Result<Self::Ok, Self::Error> {
                Err(Error::NotARecord($description))
            }
        }
    )*};
}

/// Top level serializer; accepts only structs and maps.
struct FieldsSerializer;

impl ser::Serializer for FieldsSerializer {
    type Ok = Fields;
    type Error = Error;

    type SerializeSeq = ser::Impossible<Fields, Error>;
    type SerializeTuple = ser::Impossible<Fields, Error>;
    type SerializeTupleStruct = ser::Impossible<Fields, Error>;
    type SerializeTupleVariant = ser::Impossible<Fields, Error>;
    type SerializeMap = FieldsCollector;
    type SerializeStruct = FieldsCollector;
    type SerializeStructVariant = ser::Impossible<Fields, Error>;

    not_a_record! {
        bool: "a boolean",
        i8: "an integer",
        i16: "an integer",
        i32: "an integer",
        i64: "an integer",
        i128: "an integer",
        u8: "an integer",
        u16: "an integer",
        u32: "an integer",
        u64: "an integer",
        u128: "an integer",
        f32: "a float",
        f64: "a float",
        char: "a char",
    }

    #[inline]
    fn serialize_str(self, _v: &str) -> Result<Self::Ok, Self::Error> {
        Err(Error::NotARecord("a string"))
    }

    #[inline]
    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Err(Error::NotARecord("bytes"))
    }

    #[inline]
    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Err(Error::NilValue)
    }

    #[inline]
    fn serialize_some<T>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    #[inline]
    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Err(Error::NilValue)
    }

    #[inline]
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        Err(Error::NotARecord("a unit struct"))
    }

    #[inline]
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        Err(Error::NotARecord("an enum"))
    }

    #[inline]
    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
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
        T: Serialize + ?Sized,
    {
        Err(Error::NotARecord("an enum"))
    }

    #[inline]
    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(Error::NotARecord("a sequence"))
    }

    #[inline]
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(Error::NotARecord("a tuple"))
    }

    #[inline]
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(Error::NotARecord("a tuple struct"))
    }

    #[inline]
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(Error::NotARecord("an enum"))
    }

    #[inline]
    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(FieldsCollector::new(len.unwrap_or(0)))
    }

    #[inline]
    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(FieldsCollector::new(len))
    }

    #[inline]
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(Error::NotARecord("an enum"))
    }
}

/// Collects the primitive members of a struct or map.
struct FieldsCollector {
    fields: Fields,
    key: Option<String>,
}

impl FieldsCollector {
    #[inline]
    #[must_use]
    fn new(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
            key: None,
        }
    }

    fn push<T>(&mut self, name: &str, value: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        match value.serialize(PrimitiveSerializer)? {
            Some(token) => self.fields.push((name.to_owned(), token)),
            None => tracing::debug!(field = name, "skipping non-primitive record field"),
        }

        Ok(())
    }
}

impl ser::SerializeStruct for FieldsCollector {
    type Ok = Fields;
    type Error = Error;

    #[inline]
    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.push(key, value)
    }

    #[inline]
    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(self.fields)
    }
}

impl ser::SerializeMap for FieldsCollector {
    type Ok = Fields;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        let key = key
            .serialize(PrimitiveSerializer)?
            .ok_or(Error::UnsupportedKey)?;

        self.key = Some(key.to_string());
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        let key = self
            .key
            .take()
            .ok_or_else(|| Error::Custom("serialize_value called before serialize_key".to_owned()))?;

        self.push(&key, value)
    }

    #[inline]
    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(self.fields)
    }
}

/// Generate `serialize_*` methods that store a value as an integer, falling
/// back to a decimal string if it doesn't fit in a signed 64 bit integer.
macro_rules! integers {
    ($($type:ident)*) => {$(
        paste! {
            #[inline]
            fn [<serialize_ $type>](self, v: $type) -> Result<Self::Ok, Self::Error> {
                Ok(Some(match i64::try_from(v) {
                    Ok(v) => Token::Int(v),
                    Err(_) => Token::from(v.to_string()),
                }))
            }
        }
    )*};
}

/// Serializer for a single member of a record. Primitives become a
/// [`Token`]; everything else becomes `None`.
struct PrimitiveSerializer;

impl ser::Serializer for PrimitiveSerializer {
    type Ok = Option<Token<'static>>;
    type Error = Error;

    type SerializeSeq = Discard;
    type SerializeTuple = Discard;
    type SerializeTupleStruct = Discard;
    type SerializeTupleVariant = Discard;
    type SerializeMap = Discard;
    type SerializeStruct = Discard;
    type SerializeStructVariant = Discard;

    integers! { i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 }

    #[inline]
    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Token::Int(v.into())))
    }

    #[inline]
    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
        // Formatted as an f32, so that 12.8 isn't sent as 12.800000190734863
        Ok(Some(Token::from(v.to_string())))
    }

    #[inline]
    fn serialize_f64(self, v: f64) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Token::Float(v)))
    }

    #[inline]
    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Token::from(v.to_string())))
    }

    #[inline]
    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Token::from(v.to_owned())))
    }

    #[inline]
    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Ok(None)
    }

    #[inline]
    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Ok(None)
    }

    #[inline]
    fn serialize_some<T>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    #[inline]
    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Ok(None)
    }

    #[inline]
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        Ok(None)
    }

    #[inline]
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Token::from(variant)))
    }

    #[inline]
    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
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
        T: Serialize + ?Sized,
    {
        Ok(None)
    }

    #[inline]
    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(Discard)
    }

    #[inline]
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Ok(Discard)
    }

    #[inline]
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Ok(Discard)
    }

    #[inline]
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Ok(Discard)
    }

    #[inline]
    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(Discard)
    }

    #[inline]
    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(Discard)
    }

    #[inline]
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Ok(Discard)
    }
}

/// Sink for compound members, which aren't stored. The contents aren't
/// serialized at all.
struct Discard;

/// Implement a compound serializer trait for [`Discard`], given the trait's
/// element method and its extra leading parameters.
macro_rules! discard {
    ($($trait:ident :: $method:ident ($($param:ident: $type:ty),*);)*) => {$(
        impl ser::$trait for Discard {
            type Ok = Option<Token<'static>>;
            type Error = Error;

            #[inline]
            fn $method<T>(&mut self, $($param: $type,)* _value: &T) -> Result<(), Self::Error>
            where
                T: Serialize + ?Sized,
            {
                $(let _ = $param;)*
                Ok(())
            }

            #[inline]
            fn end(self) -> Result<Self::Ok, Self::Error> {
                Ok(None)
            }
        }
    )*};
}

discard! {
    SerializeSeq::serialize_element();
    SerializeTuple::serialize_element();
    SerializeTupleStruct::serialize_field();
    SerializeTupleVariant::serialize_field();
    SerializeStruct::serialize_field(key: &'static str);
    SerializeStructVariant::serialize_field(key: &'static str);
}

impl ser::SerializeMap for Discard {
    type Ok = Option<Token<'static>>;
    type Error = Error;

    #[inline]
    fn serialize_key<T>(&mut self, _key: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        Ok(())
    }

    #[inline]
    fn serialize_value<T>(&mut self, _value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        Ok(())
    }

    #[inline]
    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(None)
    }
}
