//! Message body framing shared by the server and the client

mod body_reader;
mod body_writer;

use std::str;

use http::header::{HeaderMap, CONTENT_LENGTH, TRANSFER_ENCODING};

use crate::error::HttpError;

pub use self::body_reader::BodyReader;
pub use self::body_writer::BodyWriter;

/// How the body of a message is delimited on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// `Transfer-Encoding: chunked`
    Chunked,
    /// `Content-Length: n`
    Sized(usize),
    /// no framing header at all
    Unframed,
}

/// inspect the headers and decide how the body is framed
///
/// chunked transfer coding takes precedence over content-length
pub fn framing(headers: &HeaderMap) -> Result<Framing, HttpError> {
    if let Some(te) = headers.get(TRANSFER_ENCODING) {
        if is_chunked(te.as_bytes()) {
            return Ok(Framing::Chunked);
        }
    }

    match headers.get(CONTENT_LENGTH) {
        Some(v) => parse_content_length(v.as_bytes()).map(Framing::Sized),
        None => Ok(Framing::Unframed),
    }
}

fn parse_content_length(value: &[u8]) -> Result<usize, HttpError> {
    str::from_utf8(value)
        .ok()
        .map(str::trim)
        .and_then(|s| s.parse().ok())
        .ok_or(HttpError::InvalidContentLength)
}

// chunked must be the final coding applied
fn is_chunked(value: &[u8]) -> bool {
    value
        .rsplit(|&b| b == b',')
        .next()
        .map(|last| trim_ascii(last).eq_ignore_ascii_case(b"chunked"))
        .unwrap_or(false)
}

fn trim_ascii(mut s: &[u8]) -> &[u8] {
    while let Some((first, rest)) = s.split_first() {
        if !first.is_ascii_whitespace() {
            break;
        }
        s = rest;
    }
    while let Some((last, rest)) = s.split_last() {
        if !last.is_ascii_whitespace() {
            break;
        }
        s = rest;
    }
    s
}
