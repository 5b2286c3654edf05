/*!
A [`Transport`] over a single blocking stream.

[`Connection`] writes each command with the [RESP serializer][crate::ser]
and reads the reply with the [RESP deserializer][crate::de]. It reads
incrementally: whenever the buffered data ends partway through a reply, it
reads whatever the stream has next, and tries again.
Bytes beyond the end of a reply are kept for the next one.

Commands are serialized through a mutex, so a `Connection` can be shared
between threads, but only one command is in flight at a time. There's no
reconnection or pooling; wrap a pool in your own [`Transport`] for that.

# Example

```no_run
use std::net::TcpStream;

use seredisearch::{client::Client, connection::Connection};

let stream = TcpStream::connect("127.0.0.1:6379")?;
let client = Client::new(Connection::new(stream));

if !client.index_exists(&(), "cities")? {
    println!("no index yet");
}
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use std::{
    io::{self, Read, Write},
    sync::{Mutex, PoisonError},
};

use serde::Deserialize as _;
use thiserror::Error;

use crate::{de, reply::Reply, ser, token::Token, transport::Transport};

/// Errors from a [`Connection`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectionError {
    /// The server replied with an error. This displays as the server's
    /// message, verbatim.
    #[error("{0}")]
    Server(String),

    /// Reading from or writing to the stream failed.
    #[error("i/o error on connection")]
    Io(#[from] io::Error),

    /// The server sent something that wasn't valid RESP. The connection
    /// shouldn't be used after this.
    #[error("malformed reply from server")]
    Protocol(#[source] de::Error),

    /// The command couldn't be serialized.
    #[error("failed to serialize command")]
    Serialize(#[from] ser::Error),

    /// The stream ended before a complete reply was read.
    #[error("connection closed by server")]
    Closed,

    /// Another thread panicked while using this connection.
    #[error("connection is unusable after a panic in another thread")]
    Poisoned,
}

const READ_CHUNK: usize = 4096;

#[derive(Debug)]
struct Inner<S> {
    stream: S,
    buffer: Vec<u8>,
}

impl<S: Read + Write> Inner<S> {
    fn send(&mut self, command: &[Token<'_>]) -> Result<(), ConnectionError> {
        let payload = ser::to_vec(command)?;
        self.stream.write_all(&payload)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Read whatever the stream has next. `needed` is a lower bound on the
    /// missing part of the reply, and only sizes the read; the caller parses
    /// again after every read.
    fn fill(&mut self, needed: usize) -> Result<(), ConnectionError> {
        loop {
            let start = self.buffer.len();
            self.buffer.resize(start + needed.max(READ_CHUNK), 0);

            let result = self.stream.read(&mut self.buffer[start..]);
            let count = result.as_ref().map_or(0, |&count| count);
            self.buffer.truncate(start + count);

            match result {
                Ok(0) => return Err(ConnectionError::Closed),
                Ok(_) => return Ok(()),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn receive(&mut self) -> Result<Reply, ConnectionError> {
        loop {
            let mut input = self.buffer.as_slice();
            let result = Reply::deserialize(de::Deserializer::new(&mut input));
            let consumed = self.buffer.len() - input.len();

            match result {
                Ok(reply) => {
                    self.buffer.drain(..consumed);
                    return Ok(reply);
                }
                Err(de::Error::Server(message)) => {
                    self.buffer.drain(..consumed);
                    return Err(ConnectionError::Server(message));
                }
                Err(err) => match err.needed() {
                    Some(needed) => {
                        tracing::trace!(needed, buffered = self.buffer.len(), "reading more");
                        self.fill(needed)?;
                    }
                    None => {
                        self.buffer.clear();
                        return Err(ConnectionError::Protocol(err));
                    }
                },
            }
        }
    }
}

/// A [`Transport`] over a blocking stream. See the [module docs][self].
#[derive(Debug)]
pub struct Connection<S> {
    inner: Mutex<Inner<S>>,
}

impl<S: Read + Write> Connection<S> {
    /// Wrap a connected stream.
    #[must_use]
    pub fn new(stream: S) -> Self {
        Self {
            inner: Mutex::new(Inner {
                stream,
                buffer: Vec::new(),
            }),
        }
    }

    /// Get the underlying stream back. Any buffered, unread reply data is
    /// lost.
    pub fn into_inner(self) -> S {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .stream
    }
}

impl<S: Read + Write> Transport for Connection<S> {
    type Context = ();
    type Error = ConnectionError;

    fn execute(&self, _ctx: &(), command: &[Token<'_>]) -> Result<Reply, ConnectionError> {
        let mut inner = self.inner.lock().map_err(|_| ConnectionError::Poisoned)?;

        inner.send(command)?;
        let reply = inner.receive();

        if let Err(ConnectionError::Server(ref message)) = reply {
            tracing::debug!(message = message.as_str(), "server replied with an error");
        }

        reply
    }
}
