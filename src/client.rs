/*!
The client facade: index management, search, and document upserts on top of
a [`Transport`].

Each operation validates its inputs, encodes its command with [`encode`],
makes one round trip through the transport (two for
[`create_index`][Client::create_index] and
[`upsert`][Client::upsert]), and decodes the reply. The client holds no
state besides the transport, so it can be shared freely between threads if
the transport can.
*/

use std::error::Error as StdError;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::{
    encode, flatten,
    query::SearchRequest,
    reply::Reply,
    results::{self, SearchResult},
    schema::IndexConfiguration,
    token::Token,
    transport::Transport,
};

/// Errors from client operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error<E>
where
    E: StdError + 'static,
{
    /// The index configuration didn't have a name.
    #[error("an index name is required")]
    MissingIndexName,

    /// The search request didn't have a query.
    #[error("a search query is required")]
    MissingQuery,

    /// [`create_index`][Client::create_index] found an existing index and
    /// wasn't allowed to drop it.
    #[error("index {name:?} already exists")]
    IndexExists {
        /// The index name.
        name: String,
    },

    /// An upsert was attempted with an empty key.
    #[error("a document key is required")]
    EmptyKey,

    /// An upserted value had no primitive members to store.
    #[error("document {key:?} has no fields to store")]
    NoFields {
        /// The document key.
        key: String,
    },

    /// An upserted value couldn't be flattened into hash fields.
    #[error("failed to flatten the document")]
    Flatten(#[from] flatten::Error),

    /// The search reply couldn't be decoded into the requested output.
    #[error("failed to decode the search reply")]
    Decode(#[from] results::Error),

    /// The transport failed, or the server replied with an error.
    #[error(transparent)]
    Transport(E),
}

/**
A RediSearch client.

# Example

```
use std::convert::Infallible;

use serde::Deserialize;
use seredisearch::{
    client::Client, query::SearchRequest, reply::Reply, token::Token, transport::Transport,
};

/// A transport that always replies with the same search results
struct Canned;

impl Transport for Canned {
    type Context = ();
    type Error = Infallible;

    fn execute(&self, _ctx: &(), _command: &[Token<'_>]) -> Result<Reply, Infallible> {
        Ok(Reply::from(vec![
            Reply::Integer(1),
            Reply::from("city:1"),
            Reply::from(["name", "Popayan", "population", "320000"]),
        ]))
    }
}

#[derive(Deserialize, Debug, PartialEq)]
struct City {
    name: String,
    population: u32,
}

let client = Client::new(Canned);
let mut cities: Vec<City> = Vec::new();
let total = client.search(&(), &SearchRequest::new("cities", "Popayan"), &mut cities).unwrap();

assert_eq!(total, 1);
assert_eq!(cities, [City { name: "Popayan".to_owned(), population: 320_000 }]);
```
*/
#[derive(Debug, Clone, Default)]
pub struct Client<T> {
    transport: T,
}

impl<T: Transport> Client<T> {
    /// Create a client on top of a transport.
    #[inline]
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Get a reference to the underlying transport.
    #[inline]
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Take the underlying transport out of the client.
    #[inline]
    #[must_use]
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn execute(&self, ctx: &T::Context, command: &[Token<'_>]) -> Result<Reply, Error<T::Error>> {
        tracing::debug!(
            command = %CommandDisplay(command),
            "executing RediSearch command"
        );

        self.transport.execute(ctx, command).map_err(Error::Transport)
    }

    /**
    Create an index.

    If an index with the same name already exists, it's dropped first if
    `drop_if_exists` is true (the documents it indexed are kept); otherwise
    this fails with [`Error::IndexExists`].
    */
    pub fn create_index(
        &self,
        ctx: &T::Context,
        config: &IndexConfiguration,
        drop_if_exists: bool,
    ) -> Result<(), Error<T::Error>> {
        if config.name.is_empty() {
            return Err(Error::MissingIndexName);
        }

        if self.index_exists(ctx, &config.name)? {
            if !drop_if_exists {
                return Err(Error::IndexExists {
                    name: config.name.clone(),
                });
            }

            self.drop_index(ctx, &config.name, false)?;
        }

        self.execute(ctx, &encode::create_index(config)).map(drop)
    }

    /**
    Run a search, and decode the hits into `out`.

    `out` is only assigned if the whole operation succeeds; its previous
    contents are replaced, not appended to. See [`results`] for what output
    types are supported and how they're populated. Returns the total number
    of matches, which may be more than the number of decoded hits.
    */
    pub fn search<O>(
        &self,
        ctx: &T::Context,
        request: &SearchRequest,
        out: &mut O,
    ) -> Result<i64, Error<T::Error>>
    where
        O: DeserializeOwned + 'static,
    {
        let result = self.search_records(ctx, request)?;
        *out = results::decode(result.documents)?;
        Ok(result.total)
    }

    /// Run a search, and return the hits as dynamic records, along with their
    /// keys.
    pub fn search_records(
        &self,
        ctx: &T::Context,
        request: &SearchRequest,
    ) -> Result<SearchResult, Error<T::Error>> {
        if request.index.is_empty() {
            return Err(Error::MissingIndexName);
        }

        if request.query.is_empty() {
            return Err(Error::MissingQuery);
        }

        let reply = self.execute(ctx, &encode::search(request))?;
        let result = results::parse_reply(&reply)?;

        tracing::debug!(
            index = request.index.as_str(),
            total = result.total,
            returned = result.documents.len(),
            "search complete"
        );

        Ok(result)
    }

    /**
    Drop an index.

    If `purge` is true, **every document in the index is deleted as well**.
    This can't be undone.
    */
    pub fn drop_index(
        &self,
        ctx: &T::Context,
        name: &str,
        purge: bool,
    ) -> Result<(), Error<T::Error>> {
        self.execute(ctx, &encode::drop_index(name, purge)).map(drop)
    }

    /// Check if an index exists. A transport error mentioning an unknown
    /// index means it doesn't; any other transport error is returned.
    pub fn index_exists(&self, ctx: &T::Context, name: &str) -> Result<bool, Error<T::Error>> {
        match self.execute(ctx, &encode::index_info(name)) {
            Ok(_) => Ok(true),
            Err(Error::Transport(err))
                if err.to_string().to_lowercase().contains("unknown index") =>
            {
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /**
    Store a document as a hash.

    The value's primitive members are flattened into hash fields (see
    [`flatten`]). If `replace` is true, the key is deleted first, so that
    fields absent from `value` don't survive; otherwise the fields are merged
    into any existing hash.

    A value with no primitive members is rejected before anything is sent.
    The delete and the write are separate commands, so if the write fails
    after a successful delete, the document is left deleted.
    */
    pub fn upsert<V>(
        &self,
        ctx: &T::Context,
        key: &str,
        value: &V,
        replace: bool,
    ) -> Result<(), Error<T::Error>>
    where
        V: Serialize + ?Sized,
    {
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }

        let fields = flatten::to_fields(value)?;

        if fields.is_empty() {
            return Err(Error::NoFields {
                key: key.to_owned(),
            });
        }

        if replace {
            tracing::debug!(key, "deleting document before upsert");
            self.transport.delete(ctx, key).map_err(Error::Transport)?;
        }

        tracing::debug!(key, fields = fields.len(), "setting document fields");
        self.transport
            .set_fields(ctx, key, &fields)
            .map_err(Error::Transport)
    }
}

/// Displays a command as space-separated tokens, for logging.
struct CommandDisplay<'a, 'b>(&'a [Token<'b>]);

impl std::fmt::Display for CommandDisplay<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tokens = self.0.iter();

        if let Some(first) = tokens.next() {
            write!(f, "{first}")?;
            tokens.try_for_each(|token| write!(f, " {token}"))?;
        }

        Ok(())
    }
}
