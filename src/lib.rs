/*!
`seredisearch` is a client library for
[RediSearch](https://redis.io/docs/interact/search-and-query/), the full-text
search module for Redis. It's built on the [serde] data model: documents are
stored by flattening any [`Serialize`][serde::Serialize] value into hash
fields, and search hits are decoded into any
[`Deserialize`][serde::Deserialize] type.

The crate is split into layers, each usable on its own:

- [`schema`] and [`query`] describe indexes and searches as plain data.
- [`encode`] turns those descriptions into command [tokens][token::Token],
  following the RediSearch command grammar.
- [`results`] parses search replies into dynamic records, and decodes them
  into typed values. [`flatten`] goes the other way, for upserts.
- [`client`] ties it together on top of a [`transport`], which is anything
  that can send a command and return a [`Reply`][reply::Reply].
- With the `resp` feature (enabled by default), [`connection`] provides a
  transport over any blocking stream, using the RESP [serializer][ser] and
  [deserializer][de].

# Example

```
use seredisearch::{
    encode,
    query::{SearchRequest, SortOrder},
    schema::{FieldSchema, IndexConfiguration},
};

let config = IndexConfiguration::new("cities")
    .prefix("city:")
    .field("name", FieldSchema::text());

let command: Vec<String> = encode::create_index(&config)
    .iter()
    .map(ToString::to_string)
    .collect();

assert_eq!(
    command,
    ["FT.CREATE", "cities", "ON", "HASH", "PREFIX", "1", "city:", "SCHEMA", "name", "TEXT"],
);

let request = SearchRequest::new("cities", "@name:Paris")
    .sort_by("population", SortOrder::Descending)
    .limit(0, 5);

let command: Vec<String> = encode::search(&request)
    .iter()
    .map(ToString::to_string)
    .collect();

assert_eq!(
    command,
    [
        "FT.SEARCH", "cities", "@name:Paris",
        "SORTBY", "population", "DESC",
        "LIMIT", "0", "5",
    ],
);
```

See [`client::Client`] for an end-to-end example with a transport.
*/

#![deny(missing_docs)]

pub mod client;
pub mod encode;
pub mod flatten;
pub mod query;
pub mod reply;
pub mod results;
pub mod schema;
pub mod token;
pub mod transport;

#[cfg(feature = "resp")]
pub mod connection;
#[cfg(feature = "resp")]
pub mod de;
#[cfg(feature = "resp")]
pub mod ser;
