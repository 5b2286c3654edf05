/*!
Decoding of `FT.SEARCH` replies.

A search reply is a flat, positional array: the total number of matches,
followed by alternating document keys and field lists, where each field list
is itself a flat array of alternating field names and values:

```text
1) (integer) 2
2) "doc:1"
3) 1) "title"
   2) "Test Title"
   3) "year"
   4) "2021"
4) "doc:2"
5) 1) "title"
   2) "Other"
```

Decoding happens in two steps. [`parse_reply`] validates the shape of the
reply and builds a [`SearchResult`], with each hit's fields gathered into a
dynamic [`Record`]. [`decode`] then converts the hits into any
[`Deserialize`](serde::Deserialize) target that looks like a sequence of
records: a `Vec` of structs, of string-keyed maps, or of dynamic values.

# Typed records

Struct fields are matched to wire fields by their serde name, so
`#[serde(rename = "...")]` picks the wire name and `#[serde(skip)]` excludes a
field. Wire fields with no matching struct field are ignored. Values are
converted leniently:

- Strings are used verbatim.
- Integers and floats are parsed in base 10. If the value doesn't parse, or
  doesn't fit, the field gets `0`.
- Booleans are true if the value starts with `t` or `1`, and false otherwise.
- Options are `Some` if the wire field is present and `None` otherwise.
- Unit-only enums are matched by variant name.
- Any other member type (sequences, maps, nested structs) is left at its zero
  value, and a warning is logged.

Struct fields that are absent from a hit are given their zero value.

Note that serde's `alias` attribute doesn't mix well with this scheme: every
name of an aliased field is offered to the struct, which makes it report a
duplicate field. Use `rename` instead.

# Example

```
use serde::Deserialize;
use seredisearch::{reply::Reply, results};

#[derive(Deserialize, Debug, PartialEq)]
struct Movie {
    title: String,
    #[serde(rename = "year")]
    released: i32,
    active: bool,
}

let reply = Reply::from(vec![
    Reply::Integer(1),
    Reply::from("doc:id"),
    Reply::from(["title", "Test Title", "year", "2021", "active", "true"]),
]);

let result = results::parse_reply(&reply).unwrap();
assert_eq!(result.total, 1);

let movies: Vec<Movie> = results::decode(result.documents).unwrap();
assert_eq!(movies, [Movie {
    title: "Test Title".to_owned(),
    released: 2021,
    active: true,
}]);
```
*/

pub mod de;

use std::{any::Any, collections::HashMap, fmt::Display, mem};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::reply::Reply;

/// A single search hit as a flat mapping of field names to values.
pub type Record = HashMap<String, String>;

/// A single search hit: its key and its fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// The document's key.
    pub key: String,

    /// The document's fields, as returned by the server.
    pub fields: Record,
}

/// A decoded search reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// The total number of matches. This is usually more than the number of
    /// documents, which are limited by the request's pagination window.
    pub total: i64,

    /// The returned documents, in reply order.
    pub documents: Vec<Document>,
}

/// Errors from decoding a search reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The reply as a whole wasn't an array.
    #[error("search reply was not an array")]
    ReplyNotArray,

    /// The first element of the reply wasn't an integer.
    #[error("search reply total was not an integer")]
    TotalNotInteger,

    /// A document key wasn't a UTF-8 string.
    #[error("a document key in the search reply was not a string")]
    DocumentKeyNotString,

    /// A document's field list wasn't an array.
    #[error("the field list of document {key:?} was not an array")]
    FieldsNotArray {
        /// The document's key.
        key: String,
    },

    /// A field name or value wasn't a UTF-8 string.
    #[error("a field name or value in document {key:?} was not a string")]
    FieldNotString {
        /// The document's key.
        key: String,
    },

    /// The reply ended with a document key that had no field list.
    #[error("the search reply ended with a document key and no field list")]
    UnpairedDocument,

    /// A document's field list ended with a field name that had no value.
    #[error("the field list of document {key:?} ended with a name and no value")]
    UnpairedField {
        /// The document's key.
        key: String,
    },

    /// The output target isn't a sequence of records.
    #[error("the output target is not a growable sequence")]
    TargetNotSequence,

    /// The output target is a fixed-length sequence, like a tuple or array.
    #[error("the output target is a fixed-length sequence and can't be resized")]
    TargetNotResizable,

    /// The elements of the output target aren't structs or maps.
    #[error("unsupported record type: expected a struct or map, but the target expects {0}")]
    UnsupportedElement(String),

    /// A map record has a non-string key type.
    #[error("map records must have string keys, but the target expects {0}")]
    UnsupportedMapKey(String),

    /// A map record has a value type that isn't a string or dynamic value.
    #[error("map records must have string or dynamic values, but the target expects {0}")]
    UnsupportedMapValue(String),

    /// An error from the target's `Deserialize` implementation.
    #[error("error from Deserialize type: {0}")]
    Custom(String),
}

impl serde::de::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Self::Custom(msg.to_string())
    }
}

fn parse_fields(key: &str, fields: &Reply) -> Result<Record, Error> {
    let fields = fields.as_array().ok_or_else(|| Error::FieldsNotArray {
        key: key.to_owned(),
    })?;

    let not_string = || Error::FieldNotString {
        key: key.to_owned(),
    };

    fields
        .chunks(2)
        .map(|pair| match pair {
            [name, value] => Ok((
                name.as_str().ok_or_else(not_string)?.to_owned(),
                value.as_str().ok_or_else(not_string)?.to_owned(),
            )),
            _ => Err(Error::UnpairedField {
                key: key.to_owned(),
            }),
        })
        .collect()
}

/**
Validate a search reply and gather its hits into dynamic records.

A reply with fewer than 3 elements has no hits, and is decoded as an empty
result with a total of 0.

# Example

```
use seredisearch::{reply::Reply, results::parse_reply};

let reply = Reply::from(vec![
    Reply::Integer(1),
    Reply::from("doc:1"),
    Reply::from(["title", "Hello"]),
]);

let result = parse_reply(&reply).unwrap();
assert_eq!(result.total, 1);
assert_eq!(result.documents[0].key, "doc:1");
assert_eq!(result.documents[0].fields["title"], "Hello");
```
*/
pub fn parse_reply(reply: &Reply) -> Result<SearchResult, Error> {
    let items = reply.as_array().ok_or(Error::ReplyNotArray)?;

    let (total, hits) = match items {
        [total, hits @ ..] if hits.len() >= 2 => (total, hits),
        _ => return Ok(SearchResult::default()),
    };

    let total = total.as_integer().ok_or(Error::TotalNotInteger)?;

    let documents = hits
        .chunks(2)
        .map(|pair| match pair {
            [key, fields] => {
                let key = key.as_str().ok_or(Error::DocumentKeyNotString)?;
                Ok(Document {
                    fields: parse_fields(key, fields)?,
                    key: key.to_owned(),
                })
            }
            _ => Err(Error::UnpairedDocument),
        })
        .collect::<Result<_, _>>()?;

    Ok(SearchResult { total, documents })
}

/**
Convert a list of hits into an output type.

The output must deserialize from a sequence; usually it's a `Vec` of structs
or maps. A `Vec<Record>` is built directly from the hits, without going
through serde at all. See the [module docs][self] for how struct fields are
populated.
*/
pub fn decode<O>(documents: Vec<Document>) -> Result<O, Error>
where
    O: DeserializeOwned + 'static,
{
    let mut documents = documents;
    let mut slot: Option<O> = None;

    if let Some(records) = (&mut slot as &mut dyn Any).downcast_mut::<Option<Vec<Record>>>() {
        *records = Some(
            mem::take(&mut documents)
                .into_iter()
                .map(|document| document.fields)
                .collect(),
        );
    }

    match slot {
        Some(records) => Ok(records),
        None => O::deserialize(de::DocumentsDeserializer::new(&documents)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use cool_asserts::assert_matches;
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::flatten;

    fn example_reply() -> Reply {
        Reply::from(vec![
            Reply::Integer(1),
            Reply::from("doc:id"),
            Reply::from([
                "title",
                "Test Title",
                "year",
                "2021",
                "active",
                "true",
                "score",
                "12.8",
                "unsupported",
                "0",
                "notinmodel",
                "0",
            ]),
        ])
    }

    #[derive(Deserialize, Debug, PartialEq, Default)]
    struct Movie {
        title: String,
        year: i32,
        active: bool,
        score: f32,
        unsupported: Vec<i32>,
    }

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|&(name, value)| (name.to_owned(), value.to_owned()))
            .collect()
    }

    #[test]
    fn test_parse_reply() {
        let result = parse_reply(&example_reply()).unwrap();

        assert_eq!(result.total, 1);
        assert_eq!(
            result.documents,
            [Document {
                key: "doc:id".to_owned(),
                fields: record(&[
                    ("title", "Test Title"),
                    ("year", "2021"),
                    ("active", "true"),
                    ("score", "12.8"),
                    ("unsupported", "0"),
                    ("notinmodel", "0"),
                ]),
            }]
        );
    }

    #[test]
    fn test_parse_short_reply() {
        assert_eq!(
            parse_reply(&Reply::Array(vec![])).unwrap(),
            SearchResult::default()
        );

        // Even a total that claims matches is ignored if there are no hits
        assert_eq!(
            parse_reply(&Reply::from([5i64])).unwrap(),
            SearchResult::default()
        );

        assert_eq!(
            parse_reply(&Reply::from(vec![Reply::Integer(3), Reply::from("doc:1")])).unwrap(),
            SearchResult::default()
        );
    }

    #[test]
    fn test_parse_not_array() {
        assert_matches!(
            parse_reply(&Reply::from("OK")),
            Err(Error::ReplyNotArray)
        );
        assert_matches!(parse_reply(&Reply::Nil), Err(Error::ReplyNotArray));
    }

    #[test]
    fn test_parse_bad_total() {
        let reply = Reply::from(vec![
            Reply::from("1"),
            Reply::from("doc:1"),
            Reply::from(["title", "x"]),
        ]);

        assert_matches!(parse_reply(&reply), Err(Error::TotalNotInteger));
    }

    #[test]
    fn test_parse_bad_document_shapes() {
        let reply = Reply::from(vec![
            Reply::Integer(1),
            Reply::Integer(10),
            Reply::from(["title", "x"]),
        ]);
        assert_matches!(parse_reply(&reply), Err(Error::DocumentKeyNotString));

        let reply = Reply::from(vec![
            Reply::Integer(1),
            Reply::from("doc:1"),
            Reply::from("title"),
        ]);
        assert_matches!(
            parse_reply(&reply),
            Err(Error::FieldsNotArray { key }) => assert_eq!(key, "doc:1")
        );

        let reply = Reply::from(vec![
            Reply::Integer(1),
            Reply::from("doc:1"),
            Reply::from(vec![Reply::from("year"), Reply::Integer(2021)]),
        ]);
        assert_matches!(
            parse_reply(&reply),
            Err(Error::FieldNotString { key }) => assert_eq!(key, "doc:1")
        );

        let reply = Reply::from(vec![
            Reply::Integer(1),
            Reply::from("doc:1"),
            Reply::from(["title", "x", "year"]),
        ]);
        assert_matches!(
            parse_reply(&reply),
            Err(Error::UnpairedField { key }) => assert_eq!(key, "doc:1")
        );

        let reply = Reply::from(vec![
            Reply::Integer(2),
            Reply::from("doc:1"),
            Reply::from(["title", "x"]),
            Reply::from("doc:2"),
        ]);
        assert_matches!(parse_reply(&reply), Err(Error::UnpairedDocument));
    }

    #[test]
    fn test_decode_typed() {
        let result = parse_reply(&example_reply()).unwrap();
        let movies: Vec<Movie> = decode(result.documents).unwrap();

        assert_eq!(
            movies,
            [Movie {
                title: "Test Title".to_owned(),
                year: 2021,
                active: true,
                score: 12.8,
                unsupported: Vec::new(),
            }]
        );
    }

    #[test]
    fn test_decode_renamed_and_skipped() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Renamed {
            #[serde(rename = "title")]
            name: String,

            #[serde(skip)]
            year: i32,

            missing: u64,
        }

        let result = parse_reply(&example_reply()).unwrap();
        let renamed: Vec<Renamed> = decode(result.documents).unwrap();

        assert_eq!(
            renamed,
            [Renamed {
                name: "Test Title".to_owned(),
                year: 0,
                missing: 0,
            }]
        );
    }

    #[test]
    fn test_decode_dynamic_fast_path() {
        let result = parse_reply(&example_reply()).unwrap();
        let expected: Vec<Record> = result
            .documents
            .iter()
            .map(|document| document.fields.clone())
            .collect();

        let records: Vec<Record> = decode(result.documents).unwrap();
        assert_eq!(records, expected);
    }

    #[test]
    fn test_decode_dynamic_and_typed_agree() {
        let result = parse_reply(&example_reply()).unwrap();

        let records: Vec<Record> = decode(result.documents.clone()).unwrap();
        let movies: Vec<Movie> = decode(result.documents).unwrap();

        assert_eq!(records.len(), movies.len());
        for (record, movie) in records.iter().zip(&movies) {
            assert_eq!(record["title"], movie.title);
            assert_eq!(record["year"].parse::<i32>().unwrap(), movie.year);
            assert_eq!(record["active"] == "true", movie.active);
            assert_eq!(record["score"].parse::<f32>().unwrap(), movie.score);
        }
    }

    #[test]
    fn test_decode_other_maps() {
        let result = parse_reply(&example_reply()).unwrap();

        let sorted: Vec<BTreeMap<String, String>> = decode(result.documents.clone()).unwrap();
        assert_eq!(sorted[0]["year"], "2021");
        assert_eq!(sorted[0].len(), 6);

        let dynamic: Vec<HashMap<String, serde_json::Value>> =
            decode(result.documents.clone()).unwrap();
        assert_eq!(dynamic[0]["score"], serde_json::json!("12.8"));

        let json: serde_json::Value = decode(result.documents).unwrap();
        assert_eq!(json[0]["title"], serde_json::json!("Test Title"));
    }

    #[test]
    fn test_decode_bad_map_types() {
        let result = parse_reply(&example_reply()).unwrap();

        assert_matches!(
            decode::<Vec<HashMap<String, i64>>>(result.documents.clone()),
            Err(Error::UnsupportedMapValue(_))
        );

        assert_matches!(
            decode::<Vec<HashMap<i64, String>>>(result.documents),
            Err(Error::UnsupportedMapKey(_))
        );
    }

    #[test]
    fn test_decode_bad_targets() {
        let result = parse_reply(&example_reply()).unwrap();

        assert_matches!(
            decode::<Movie>(result.documents.clone()),
            Err(Error::TargetNotSequence)
        );
        assert_matches!(
            decode::<String>(result.documents.clone()),
            Err(Error::TargetNotSequence)
        );
        assert_matches!(
            decode::<(Record,)>(result.documents.clone()),
            Err(Error::TargetNotResizable)
        );
        assert_matches!(
            decode::<[Record; 1]>(result.documents.clone()),
            Err(Error::TargetNotResizable)
        );
        assert_matches!(
            decode::<Vec<String>>(result.documents),
            Err(Error::UnsupportedElement(_))
        );
    }

    #[test]
    fn test_decode_empty() {
        let movies: Vec<Movie> = decode(Vec::new()).unwrap();
        assert!(movies.is_empty());

        let records: Vec<Record> = decode(Vec::new()).unwrap();
        assert!(records.is_empty());
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Everything {
        text: String,
        on: bool,
        off: bool,
        tiny: i8,
        small: i16,
        medium: i32,
        large: i64,
        utiny: u8,
        usmall: u16,
        umedium: u32,
        ularge: u64,
        single: f32,
        double: f64,
    }

    #[test]
    fn test_flatten_then_decode() {
        let original = Everything {
            text: "Popayán, Cauca".to_owned(),
            on: true,
            off: false,
            tiny: i8::MIN,
            small: -1234,
            medium: 320_000,
            large: i64::MIN,
            utiny: u8::MAX,
            usmall: 65_000,
            umedium: u32::MAX,
            ularge: u64::MAX,
            single: 12.8,
            double: -0.1,
        };

        let fields = flatten::to_fields(&original).unwrap();
        let wire: Vec<Reply> = fields
            .iter()
            .flat_map(|(name, value)| [Reply::from(name.as_str()), Reply::from(value.to_string())])
            .collect();

        let reply = Reply::from(vec![Reply::Integer(1), Reply::from("doc:1"), Reply::Array(wire)]);
        let result = parse_reply(&reply).unwrap();
        let decoded: Vec<Everything> = decode(result.documents).unwrap();

        assert_eq!(decoded, [original]);
    }
}
