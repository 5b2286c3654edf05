//! Low level RESP framing parsers.
//!
//! Each parser takes the input buffer and returns the parsed value along with
//! the unparsed tail. When the input ends early, they fail with
//! [`Error::UnexpectedEof`], which says how many more bytes are needed at
//! minimum; a reader can fetch that many and retry from the start.

use memchr::memchr2;
use thiserror::Error;

/// Framing errors in RESP data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The input ended before the value did. The value is the minimum number
    /// of additional bytes required for the parse to make progress.
    #[error("unexpected end of input; read at least {0} more bytes and try again")]
    UnexpectedEof(usize),

    /// A line wasn't terminated with `\r\n`.
    #[error("malformed line ending (RESP lines end with \\r\\n)")]
    MalformedNewline,

    /// The first byte of a value wasn't a known RESP type byte.
    #[error("unrecognized type byte {0:#x}")]
    BadTag(u8),

    /// A length or integer wasn't a valid decimal number.
    #[error("malformed decimal integer")]
    Number,
}

/// The header line of a RESP value: its type byte and the rest of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header<'a> {
    /// `+`: a line of text, such as `OK`.
    SimpleString(&'a [u8]),

    /// `-`: an error message from the server.
    Error(&'a [u8]),

    /// `:`: an integer.
    Integer(i64),

    /// `$`: the length of the binary-safe string that follows.
    BulkString(usize),

    /// `*`: the number of values that follow.
    Array(usize),

    /// `$-1` or `*-1`: the absence of a value.
    Null,
}

/// The parsed value and the unparsed tail of the input.
pub type ParseResult<'a, O> = Result<(O, &'a [u8]), Error>;

#[inline]
fn split_at_checked(input: &[u8], idx: usize) -> Option<(&[u8], &[u8])> {
    Some((input.get(..idx)?, input.get(idx..)?))
}

fn read_endline(input: &[u8]) -> ParseResult<'_, ()> {
    match input {
        [b'\r', b'\n', tail @ ..] => Ok(((), tail)),
        [] => Err(Error::UnexpectedEof(2)),
        [b'\r'] => Err(Error::UnexpectedEof(1)),
        _ => Err(Error::MalformedNewline),
    }
}

/// Parse an optionally signed decimal integer, with overflow checking.
pub fn parse_number(payload: &[u8]) -> Result<i64, Error> {
    let (negative, digits) = match payload {
        [b'-', digits @ ..] => (true, digits),
        [b'+', digits @ ..] => (false, digits),
        digits => (false, digits),
    };

    if digits.is_empty() {
        return Err(Error::Number);
    }

    digits
        .iter()
        .try_fold(0i64, |total, &byte| {
            let digit = match byte {
                b'0'..=b'9' => i64::from(byte - b'0'),
                _ => return None,
            };

            let total = total.checked_mul(10)?;
            match negative {
                true => total.checked_sub(digit),
                false => total.checked_add(digit),
            }
        })
        .ok_or(Error::Number)
}

/// Parse a length, where `-1` means null.
fn parse_length(payload: &[u8]) -> Result<Option<usize>, Error> {
    match parse_number(payload)? {
        -1 => Ok(None),
        length => usize::try_from(length)
            .map(Some)
            .map_err(|_| Error::Number),
    }
}

/**
Read the header line of a RESP value.

# Example

```
use seredisearch::de::parse::{read_header, Header};

let (header, tail) = read_header(b"*2\r\n$5\r\nhello\r\n:3\r\n").unwrap();
assert_eq!(header, Header::Array(2));
assert_eq!(tail, b"$5\r\nhello\r\n:3\r\n");
```
*/
pub fn read_header(input: &[u8]) -> ParseResult<'_, Header<'_>> {
    let (&tag, rest) = input.split_first().ok_or(Error::UnexpectedEof(3))?;

    // The line must end before we know anything else
    let end = memchr2(b'\r', b'\n', rest).ok_or(Error::UnexpectedEof(2))?;
    let (line, rest) = rest.split_at(end);
    let ((), tail) = read_endline(rest)?;

    let header = match tag {
        b'+' => Header::SimpleString(line),
        b'-' => Header::Error(line),
        b':' => Header::Integer(parse_number(line)?),
        b'$' => parse_length(line)?.map_or(Header::Null, Header::BulkString),
        b'*' => parse_length(line)?.map_or(Header::Null, Header::Array),
        tag => return Err(Error::BadTag(tag)),
    };

    Ok((header, tail))
}

/**
Read the `length` byte body of a bulk string, and its terminating `\r\n`.

# Example

```
use seredisearch::de::parse::read_bulk;

assert_eq!(read_bulk(5, b"hello\r\n:3\r\n").unwrap(), (&b"hello"[..], &b":3\r\n"[..]));
```
*/
pub fn read_bulk(length: usize, input: &[u8]) -> ParseResult<'_, &[u8]> {
    let (body, rest) = split_at_checked(input, length).ok_or_else(|| {
        Error::UnexpectedEof((length - input.len()).saturating_add(2))
    })?;

    let ((), tail) = read_endline(rest)?;
    Ok((body, tail))
}

#[cfg(test)]
mod tests {
    use cool_asserts::assert_matches;

    use super::*;

    #[test]
    fn test_headers() {
        assert_matches!(
            read_header(b"+OK\r\nrest"),
            Ok((Header::SimpleString(b"OK"), b"rest"))
        );
        assert_matches!(
            read_header(b"-Unknown Index name\r\n"),
            Ok((Header::Error(b"Unknown Index name"), b""))
        );
        assert_matches!(read_header(b":-42\r\n"), Ok((Header::Integer(-42), b"")));
        assert_matches!(read_header(b"$12\r\n"), Ok((Header::BulkString(12), b"")));
        assert_matches!(read_header(b"*3\r\n"), Ok((Header::Array(3), b"")));
        assert_matches!(read_header(b"$-1\r\n"), Ok((Header::Null, b"")));
        assert_matches!(read_header(b"*-1\r\n"), Ok((Header::Null, b"")));
    }

    #[test]
    fn test_header_errors() {
        assert_matches!(read_header(b"!3\r\n"), Err(Error::BadTag(b'!')));
        assert_matches!(read_header(b"+OK\n"), Err(Error::MalformedNewline));
        assert_matches!(read_header(b":abc\r\n"), Err(Error::Number));
        assert_matches!(read_header(b"*-2\r\n"), Err(Error::Number));
        assert_matches!(read_header(b":\r\n"), Err(Error::Number));
    }

    #[test]
    fn test_header_incomplete() {
        assert_matches!(read_header(b""), Err(Error::UnexpectedEof(3)));
        assert_matches!(read_header(b":12"), Err(Error::UnexpectedEof(2)));
        assert_matches!(read_header(b":12\r"), Err(Error::UnexpectedEof(1)));
    }

    #[test]
    fn test_bulk() {
        assert_matches!(read_bulk(0, b"\r\n"), Ok((b"", b"")));
        assert_matches!(read_bulk(3, b"a\r\n\r\nx"), Ok((b"a\r\n", b"x")));
        assert_matches!(read_bulk(10, b"abc"), Err(Error::UnexpectedEof(9)));
        assert_matches!(read_bulk(3, b"abc"), Err(Error::UnexpectedEof(2)));
        assert_matches!(read_bulk(3, b"abcd\r\n"), Err(Error::MalformedNewline));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse_number(b"0"), Ok(0));
        assert_eq!(parse_number(b"+17"), Ok(17));
        assert_eq!(parse_number(b"-9223372036854775808"), Ok(i64::MIN));
        assert_eq!(parse_number(b"9223372036854775808"), Err(Error::Number));
        assert_eq!(parse_number(b"-"), Err(Error::Number));
        assert_eq!(parse_number(b"1 "), Err(Error::Number));
    }
}
