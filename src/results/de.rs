/*!
Serde deserializers that present a list of search hits to an arbitrary
[`Deserialize`][serde::Deserialize] type.

The layering mirrors the shape of the data:

- [`DocumentsDeserializer`] presents the hits as a sequence.
- `RecordDeserializer` presents a single hit as a struct or as a map.
- `FieldValueDeserializer` presents a single wire value as whatever primitive
  the struct member asks for, parsing leniently.
- `ZeroDeserializer` produces the zero value of whatever is asked for; it's
  used for absent fields and for member types that can't be parsed from a
  string.
*/

use std::{collections::hash_map, slice};

use lazy_format::make_lazy_format;
use paste::paste;
use serde::{
    de::{self, value::BorrowedStrDeserializer},
    forward_to_deserialize_any,
};

use super::{Document, Error, Record};

/// Describe the type a visitor expects, for error messages.
fn expecting<'de>(visitor: &impl de::Visitor<'de>) -> String {
    make_lazy_format!(|f| visitor.expecting(f)).to_string()
}

/// Generate `deserialize_*` methods (for methods that take only a visitor)
/// that fail with the given error variant.
macro_rules! reject {
    ($variant:ident: $($kind:ident)*) => {$(
        paste! {
            #[inline]
            fn [<deserialize_ $kind>]<V>(self, visitor: V) -> Result<V::Value, Self::Error>
            where
                V: de::Visitor<'de>,
            {
                Err(Error::$variant(expecting(&visitor)))
            }
        }
    )*};
}

/**
Deserializer for a list of search hits, presented as a sequence of records.

Only growable sequences (and wrappers around them, such as `Option` or
newtypes) can be deserialized from this. Fixed-length sequences fail with
[`Error::TargetNotResizable`], and anything else with
[`Error::TargetNotSequence`].
*/
#[derive(Debug, Clone, Copy)]
pub struct DocumentsDeserializer<'de> {
    documents: &'de [Document],
}

impl<'de> DocumentsDeserializer<'de> {
    /// Create a deserializer over some hits.
    #[inline]
    #[must_use]
    pub fn new(documents: &'de [Document]) -> Self {
        Self { documents }
    }
}

macro_rules! not_a_sequence {
    ($($kind:ident)*) => {$(
        paste! {
            #[inline]
            fn [<deserialize_ $kind>]<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
            where
                V: de::Visitor<'de>,
            {
                Err(Error::TargetNotSequence)
            }
        }
    )*};
}

impl<'de> de::Deserializer<'de> for DocumentsDeserializer<'de> {
    type Error = Error;

    forward_to_deserialize_any! { seq }

    not_a_sequence! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit map identifier
    }

    #[inline]
    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(Documents {
            documents: self.documents.iter(),
        })
    }

    #[inline]
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
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

    #[inline]
    fn deserialize_tuple<V>(self, _len: usize, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::TargetNotResizable)
    }

    #[inline]
    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::TargetNotResizable)
    }

    #[inline]
    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::TargetNotSequence)
    }

    #[inline]
    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::TargetNotSequence)
    }

    #[inline]
    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::TargetNotSequence)
    }

    #[inline]
    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

struct Documents<'de> {
    documents: slice::Iter<'de, Document>,
}

impl<'de> de::SeqAccess<'de> for Documents<'de> {
    type Error = Error;

    #[inline]
    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        self.documents
            .next()
            .map(|document| {
                seed.deserialize(RecordDeserializer {
                    record: &document.fields,
                })
            })
            .transpose()
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.documents.len())
    }
}

/// Deserializer for a single hit, as a struct or a string-keyed map.
struct RecordDeserializer<'de> {
    record: &'de Record,
}

impl<'de> de::Deserializer<'de> for RecordDeserializer<'de> {
    type Error = Error;

    forward_to_deserialize_any! { map }

    reject! {
        UnsupportedElement:
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit seq identifier
    }

    #[inline]
    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(RecordEntries {
            entries: self.record.iter(),
            value: None,
        })
    }

    #[inline]
    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(StructFields {
            fields: fields.iter(),
            record: Some(self.record),
            field: "",
        })
    }

    #[inline]
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
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

    #[inline]
    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::UnsupportedElement(expecting(&visitor)))
    }

    #[inline]
    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::UnsupportedElement(expecting(&visitor)))
    }

    #[inline]
    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::UnsupportedElement(expecting(&visitor)))
    }

    #[inline]
    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::UnsupportedElement(expecting(&visitor)))
    }

    #[inline]
    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

/// Map access over every field in a hit, for map records.
struct RecordEntries<'de> {
    entries: hash_map::Iter<'de, String, String>,
    value: Option<&'de str>,
}

impl<'de> de::MapAccess<'de> for RecordEntries<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: de::DeserializeSeed<'de>,
    {
        self.entries
            .next()
            .map(|(name, value)| {
                self.value = Some(value.as_str());
                seed.deserialize(MapKeyDeserializer { key: name.as_str() })
            })
            .transpose()
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        let value = self
            .value
            .take()
            .ok_or_else(|| Error::Custom("called next_value_seed before next_key_seed".to_owned()))?;

        seed.deserialize(MapValueDeserializer { value })
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

/// Deserializer for the key of a map record; only string types are allowed.
struct MapKeyDeserializer<'de> {
    key: &'de str,
}

impl<'de> de::Deserializer<'de> for MapKeyDeserializer<'de> {
    type Error = Error;

    forward_to_deserialize_any! { str string identifier }

    reject! {
        UnsupportedMapKey:
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char
        bytes byte_buf option unit seq map
    }

    #[inline]
    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.key)
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

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::UnsupportedMapKey(expecting(&visitor)))
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::UnsupportedMapKey(expecting(&visitor)))
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::UnsupportedMapKey(expecting(&visitor)))
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::UnsupportedMapKey(expecting(&visitor)))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::UnsupportedMapKey(expecting(&visitor)))
    }

    #[inline]
    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

/// Deserializer for the value of a map record; only strings and fully
/// dynamic types (which will receive a string) are allowed.
struct MapValueDeserializer<'de> {
    value: &'de str,
}

impl<'de> de::Deserializer<'de> for MapValueDeserializer<'de> {
    type Error = Error;

    forward_to_deserialize_any! { str string }

    reject! {
        UnsupportedMapValue:
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char
        bytes byte_buf unit seq map identifier
    }

    #[inline]
    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.value)
    }

    #[inline]
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
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

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::UnsupportedMapValue(expecting(&visitor)))
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::UnsupportedMapValue(expecting(&visitor)))
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::UnsupportedMapValue(expecting(&visitor)))
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::UnsupportedMapValue(expecting(&visitor)))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::UnsupportedMapValue(expecting(&visitor)))
    }

    #[inline]
    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

/// Map access over the declared fields of a struct. Fields present in the
/// hit get their wire value; the rest are zeroed. With no record at all,
/// every field is zeroed.
struct StructFields<'de> {
    fields: slice::Iter<'static, &'static str>,
    record: Option<&'de Record>,
    field: &'static str,
}

impl<'de> de::MapAccess<'de> for StructFields<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: de::DeserializeSeed<'de>,
    {
        self.fields
            .next()
            .map(|&field| {
                self.field = field;
                seed.deserialize(BorrowedStrDeserializer::new(field))
            })
            .transpose()
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        let field = self.field;

        match self
            .record
            .and_then(|record| record.get(field))
            .map(String::as_str)
        {
            Some(value) => seed.deserialize(FieldValueDeserializer { field, value }),
            None => seed.deserialize(ZeroDeserializer { field }),
        }
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.fields.len())
    }
}

/// Generate `deserialize_*` methods that parse the wire value as that
/// primitive, using its zero value if it doesn't parse.
macro_rules! parse_primitives {
    ($($type:ident)*) => {$(
        paste! {
            #[inline]
            fn [<deserialize_ $type>]<V>(self, visitor: V) -> Result<V::Value, Self::Error>
            where
                V: de::Visitor<'de>,
            {
                visitor.[<visit_ $type>](self.value.parse::<$type>().unwrap_or_default())
            }
        }
    )*};
}

/// Generate `deserialize_*` methods (for methods that take only a visitor)
/// that log the unsupported member and produce a zero value instead.
macro_rules! zero_unsupported {
    ($($kind:ident)*) => {$(
        paste! {
            fn [<deserialize_ $kind>]<V>(self, visitor: V) -> Result<V::Value, Self::Error>
            where
                V: de::Visitor<'de>,
            {
                self.unsupported(stringify!($kind));
                de::Deserializer::[<deserialize_ $kind>](ZeroDeserializer { field: self.field }, visitor)
            }
        }
    )*};
}

/// Deserializer for a single wire value of a struct member.
struct FieldValueDeserializer<'de> {
    field: &'static str,
    value: &'de str,
}

impl FieldValueDeserializer<'_> {
    fn unsupported(&self, kind: &str) {
        tracing::warn!(
            field = self.field,
            kind,
            "unsupported record member type; leaving it at its zero value"
        );
    }
}

/// Booleans are true if they start with `t` or `1`.
#[inline]
#[must_use]
fn parse_bool(value: &str) -> bool {
    matches!(value.as_bytes().first(), Some(b't' | b'1'))
}

impl<'de> de::Deserializer<'de> for FieldValueDeserializer<'de> {
    type Error = Error;

    forward_to_deserialize_any! { str string identifier }

    parse_primitives! {
        i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64
    }

    zero_unsupported! {
        char bytes byte_buf seq map
    }

    #[inline]
    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.value)
    }

    #[inline]
    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_bool(parse_bool(self.value))
    }

    #[inline]
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    #[inline]
    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    #[inline]
    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
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

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.unsupported("tuple");
        let zero = ZeroDeserializer { field: self.field };
        de::Deserializer::deserialize_tuple(zero, len, visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.unsupported("tuple struct");
        let zero = ZeroDeserializer { field: self.field };
        de::Deserializer::deserialize_tuple_struct(zero, name, len, visitor)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.unsupported("struct");
        let zero = ZeroDeserializer { field: self.field };
        de::Deserializer::deserialize_struct(zero, name, fields, visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        if variants.iter().any(|&variant| variant == self.value) {
            visitor.visit_enum(BorrowedStrDeserializer::new(self.value))
        } else {
            tracing::warn!(
                field = self.field,
                value = self.value,
                "unknown enum variant; using the first variant"
            );
            let zero = ZeroDeserializer { field: self.field };
            de::Deserializer::deserialize_enum(zero, name, variants, visitor)
        }
    }

    #[inline]
    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

/// Generate `deserialize_*` methods that produce the zero value of that
/// primitive.
macro_rules! zero_primitives {
    ($($type:ident)*) => {$(
        paste! {
            #[inline]
            fn [<deserialize_ $type>]<V>(self, visitor: V) -> Result<V::Value, Self::Error>
            where
                V: de::Visitor<'de>,
            {
                visitor.[<visit_ $type>]($type::default())
            }
        }
    )*};
}

const NO_FIELDS: &[&str] = &[];

/// Deserializer that produces the zero value of whatever type requests it:
/// `0`, `false`, `""`, `None`, empty collections, zeroed tuples and structs,
/// and the first variant of enums.
#[derive(Debug, Clone, Copy)]
struct ZeroDeserializer {
    field: &'static str,
}

impl<'de> de::Deserializer<'de> for ZeroDeserializer {
    type Error = Error;

    forward_to_deserialize_any! { unit ignored_any }

    zero_primitives! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char
    }

    #[inline]
    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    #[inline]
    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_str("")
    }

    #[inline]
    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(String::new())
    }

    #[inline]
    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_str("")
    }

    #[inline]
    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_bytes(b"")
    }

    #[inline]
    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_byte_buf(Vec::new())
    }

    #[inline]
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_none()
    }

    #[inline]
    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
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

    #[inline]
    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_tuple(self, 0, visitor)
    }

    #[inline]
    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(ZeroSeq {
            remaining: len,
            field: self.field,
        })
    }

    #[inline]
    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_tuple(self, len, visitor)
    }

    #[inline]
    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(StructFields {
            fields: NO_FIELDS.iter(),
            record: None,
            field: self.field,
        })
    }

    #[inline]
    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(StructFields {
            fields: fields.iter(),
            record: None,
            field: self.field,
        })
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match variants.first() {
            Some(&variant) => visitor.visit_enum(ZeroVariant {
                variant,
                field: self.field,
            }),
            None => Err(de::Error::missing_field(self.field)),
        }
    }
}

/// A sequence of `remaining` zero values.
struct ZeroSeq {
    remaining: usize,
    field: &'static str,
}

impl<'de> de::SeqAccess<'de> for ZeroSeq {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        self.remaining
            .checked_sub(1)
            .map(|remaining| {
                self.remaining = remaining;
                seed.deserialize(ZeroDeserializer { field: self.field })
            })
            .transpose()
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

/// An enum variant with zero-valued content.
struct ZeroVariant {
    variant: &'static str,
    field: &'static str,
}

impl<'de> de::EnumAccess<'de> for ZeroVariant {
    type Error = Error;
    type Variant = ZeroDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        seed.deserialize(BorrowedStrDeserializer::<Error>::new(self.variant))
            .map(|value| (value, ZeroDeserializer { field: self.field }))
    }
}

impl<'de> de::VariantAccess<'de> for ZeroDeserializer {
    type Error = Error;

    #[inline]
    fn unit_variant(self) -> Result<(), Self::Error> {
        Ok(())
    }

    #[inline]
    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(self)
    }

    #[inline]
    fn tuple_variant<V>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_tuple(self, len, visitor)
    }

    #[inline]
    fn struct_variant<V>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_struct(self, "", fields, visitor)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use cool_asserts::assert_matches;
    use serde::Deserialize;

    use super::*;

    fn documents(records: &[&[(&str, &str)]]) -> Vec<Document> {
        records
            .iter()
            .enumerate()
            .map(|(idx, pairs)| Document {
                key: format!("doc:{idx}"),
                fields: pairs
                    .iter()
                    .map(|&(name, value)| (name.to_owned(), value.to_owned()))
                    .collect(),
            })
            .collect()
    }

    fn deserialize<'de, T: Deserialize<'de>>(documents: &'de [Document]) -> Result<T, Error> {
        T::deserialize(DocumentsDeserializer::new(documents))
    }

    #[test]
    fn test_lenient_numbers() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Numbers {
            small: u8,
            signed: i16,
            big: i64,
            float: f64,
            garbage: i32,
            spaced: u32,
        }

        let docs = documents(&[&[
            ("small", "300"),
            ("signed", "-12"),
            ("big", "9000000000"),
            ("float", "1e3"),
            ("garbage", "twelve"),
            ("spaced", " 5"),
        ]]);

        let numbers: Vec<Numbers> = deserialize(&docs).unwrap();
        assert_eq!(
            numbers,
            [Numbers {
                small: 0,
                signed: -12,
                big: 9_000_000_000,
                float: 1000.0,
                garbage: 0,
                spaced: 0,
            }]
        );
    }

    #[test]
    fn test_bools() {
        #[derive(Deserialize)]
        struct Flag {
            flag: bool,
        }

        let cases = [
            ("true", true),
            ("t", true),
            ("1", true),
            ("10", true),
            ("false", false),
            ("True", false),
            ("0", false),
            ("", false),
            ("yes", false),
        ];

        for (value, expected) in cases {
            let docs = documents(&[&[("flag", value)]]);
            let flags: Vec<Flag> = deserialize(&docs).unwrap();
            assert_eq!(flags[0].flag, expected, "value: {value:?}");
        }
    }

    #[test]
    fn test_options_and_newtypes() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Year(u16);

        #[derive(Deserialize, Debug, PartialEq)]
        struct Movie {
            title: Option<String>,
            year: Option<Year>,
            rating: Option<f32>,
        }

        let docs = documents(&[&[("title", "Heat"), ("year", "1995")]]);
        let movies: Vec<Movie> = deserialize(&docs).unwrap();

        assert_eq!(
            movies,
            [Movie {
                title: Some("Heat".to_owned()),
                year: Some(Year(1995)),
                rating: None,
            }]
        );
    }

    #[test]
    fn test_borrowed_strings() {
        #[derive(Deserialize)]
        struct Borrowed<'a> {
            title: &'a str,
            missing: &'a str,
        }

        let docs = documents(&[&[("title", "Heat")]]);
        let borrowed: Vec<Borrowed<'_>> = deserialize(&docs).unwrap();

        assert_eq!(borrowed[0].title, "Heat");
        assert_eq!(borrowed[0].missing, "");
    }

    #[test]
    fn test_unit_enums() {
        #[derive(Deserialize, Debug, PartialEq)]
        enum Genre {
            Drama,
            Comedy,
        }

        #[derive(Deserialize, Debug, PartialEq)]
        struct Movie {
            genre: Genre,
            other: Genre,
            missing: Genre,
        }

        let docs = documents(&[&[("genre", "Comedy"), ("other", "Horror")]]);
        let movies: Vec<Movie> = deserialize(&docs).unwrap();

        assert_eq!(
            movies,
            [Movie {
                genre: Genre::Comedy,
                other: Genre::Drama,
                missing: Genre::Drama,
            }]
        );
    }

    #[test]
    fn test_unsupported_members_are_zeroed() {
        #[derive(Deserialize, Debug, PartialEq, Default)]
        struct Inner {
            a: i32,
            b: String,
        }

        #[derive(Deserialize, Debug, PartialEq)]
        struct Movie {
            title: String,
            tags: Vec<String>,
            pair: (i32, bool),
            inner: Inner,
            extra: HashMap<String, String>,
            initial: char,
        }

        let docs = documents(&[&[
            ("title", "Heat"),
            ("tags", "crime,drama"),
            ("pair", "1,true"),
            ("inner", "{}"),
            ("extra", "x"),
            ("initial", "H"),
        ]]);

        let movies: Vec<Movie> = deserialize(&docs).unwrap();
        assert_eq!(
            movies,
            [Movie {
                title: "Heat".to_owned(),
                tags: Vec::new(),
                pair: (0, false),
                inner: Inner::default(),
                extra: HashMap::new(),
                initial: '\0',
            }]
        );
    }

    #[test]
    fn test_absent_members_are_zeroed() {
        #[derive(Deserialize, Debug, PartialEq, Default)]
        struct Inner {
            a: i32,
        }

        #[derive(Deserialize, Debug, PartialEq)]
        struct Movie {
            title: String,
            year: i32,
            active: bool,
            score: f32,
            tags: Vec<String>,
            inner: Inner,
        }

        let docs = documents(&[&[]]);
        let movies: Vec<Movie> = deserialize(&docs).unwrap();

        assert_eq!(
            movies,
            [Movie {
                title: String::new(),
                year: 0,
                active: false,
                score: 0.0,
                tags: Vec::new(),
                inner: Inner::default(),
            }]
        );
    }

    #[test]
    fn test_many_documents() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Hit {
            n: usize,
        }

        let docs = documents(&[&[("n", "1")], &[("n", "2")], &[("n", "3")]]);
        let hits: Vec<Hit> = deserialize(&docs).unwrap();

        assert_eq!(hits, [Hit { n: 1 }, Hit { n: 2 }, Hit { n: 3 }]);
    }

    #[test]
    fn test_wrapped_sequences() {
        #[derive(Deserialize)]
        struct Hits(Vec<HashMap<String, String>>);

        let docs = documents(&[&[("n", "1")]]);

        let hits: Option<Vec<HashMap<String, String>>> = deserialize(&docs).unwrap();
        assert_eq!(hits.unwrap()[0]["n"], "1");

        let hits: Hits = deserialize(&docs).unwrap();
        assert_eq!(hits.0[0]["n"], "1");
    }

    #[test]
    fn test_unsupported_element_message() {
        let docs = documents(&[&[("n", "1")]]);

        assert_matches!(
            deserialize::<Vec<i32>>(&docs),
            Err(Error::UnsupportedElement(message)) => assert!(message.contains("i32"))
        );
    }
}
