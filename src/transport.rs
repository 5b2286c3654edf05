/*!
The contract between the [client][crate::client::Client] and whatever
actually talks to the server.

The client never opens connections itself. It hands fully encoded commands to
a [`Transport`], which is responsible for delivering them and returning the
server's reply. Connection pooling, retries, TLS, and authentication all
belong to the transport. A minimal transport over a single stream is
available as [`Connection`][crate::connection::Connection] (with the `resp`
feature).
*/

use std::error::Error as StdError;

use crate::{encode, reply::Reply, token::Token};

/**
Something that can send commands to a RediSearch server.

Only [`execute`][Transport::execute] is required. [`delete`][Transport::delete]
and [`set_fields`][Transport::set_fields] are implemented in terms of it, with
`DEL` and `HSET`, but can be overridden (for instance, by a transport that
pipelines them).

Every method receives a [`Context`][Transport::Context], which the client
passes through unmodified from its caller. This is the place for per-call
deadlines or cancellation handles; transports that don't need it can use `()`.

# Example

```
use std::{cell::RefCell, convert::Infallible};

use seredisearch::{reply::Reply, token::Token, transport::Transport};

/// A transport that records commands and replies with `OK`
#[derive(Default)]
struct Recorder {
    commands: RefCell<Vec<String>>,
}

impl Transport for Recorder {
    type Context = ();
    type Error = Infallible;

    fn execute(&self, _ctx: &(), command: &[Token<'_>]) -> Result<Reply, Infallible> {
        let command: Vec<String> = command.iter().map(ToString::to_string).collect();
        self.commands.borrow_mut().push(command.join(" "));
        Ok(Reply::from("OK"))
    }
}

let recorder = Recorder::default();
recorder.delete(&(), "city:1").unwrap();
assert_eq!(recorder.commands.borrow().as_slice(), ["DEL city:1"]);
```
*/
pub trait Transport {
    /// Per-call context, passed through unmodified on every operation.
    type Context: ?Sized;

    /// The error type of this transport. Errors are surfaced to the client's
    /// caller verbatim; their `Display` text is also how a missing index is
    /// recognized (it contains `unknown index`).
    type Error: StdError + 'static;

    /// Send a command and wait for its reply. Error replies from the server
    /// must be returned as errors.
    fn execute(&self, ctx: &Self::Context, command: &[Token<'_>]) -> Result<Reply, Self::Error>;

    /// Delete a key.
    fn delete(&self, ctx: &Self::Context, key: &str) -> Result<(), Self::Error> {
        self.execute(ctx, &encode::delete(key)).map(drop)
    }

    /// Set some fields of a hash, creating it if necessary.
    fn set_fields(
        &self,
        ctx: &Self::Context,
        key: &str,
        fields: &[(String, Token<'_>)],
    ) -> Result<(), Self::Error> {
        self.execute(ctx, &encode::set_fields(key, fields)).map(drop)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    type Context = T::Context;
    type Error = T::Error;

    #[inline]
    fn execute(&self, ctx: &Self::Context, command: &[Token<'_>]) -> Result<Reply, Self::Error> {
        T::execute(self, ctx, command)
    }

    #[inline]
    fn delete(&self, ctx: &Self::Context, key: &str) -> Result<(), Self::Error> {
        T::delete(self, ctx, key)
    }

    #[inline]
    fn set_fields(
        &self,
        ctx: &Self::Context,
        key: &str,
        fields: &[(String, Token<'_>)],
    ) -> Result<(), Self::Error> {
        T::set_fields(self, ctx, key, fields)
    }
}
