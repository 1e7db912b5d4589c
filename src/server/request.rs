use std::cell::RefCell;
use std::fmt;
use std::io::{self, Read};
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use bytes::{Buf, BytesMut};
use http::header::CONNECTION;
use http::{self, Version};

use crate::body::{self, BodyReader, Framing};
use crate::error::HttpError;

/// try to decode one request head from the front of `buf`
///
/// returns `Ok(None)` when more data is needed, the decoded head is removed
/// from `buf` and the body is left in place
pub(crate) fn decode(buf: &mut BytesMut) -> Result<Option<Request>, HttpError> {
    let (req, amt) = {
        let mut headers = [httparse::EMPTY_HEADER; 64];
        let mut r = httparse::Request::new(&mut headers);
        let amt = match r.parse(&buf[..])? {
            httparse::Status::Complete(amt) => amt,
            httparse::Status::Partial => return Ok(None),
        };

        let version = match r.version {
            Some(0) => Version::HTTP_10,
            _ => Version::HTTP_11,
        };
        let method = r.method.ok_or(HttpError::MissingField("method"))?;
        let path = r.path.ok_or(HttpError::MissingField("path"))?;

        let mut req_builder = http::Request::builder()
            .method(method)
            .uri(path)
            .version(version);

        for header in r.headers.iter() {
            req_builder = req_builder.header(header.name, header.value);
        }

        (req_builder.body(BodyReader::EmptyReader)?, amt)
    };

    buf.advance(amt);
    Ok(Some(Request(req)))
}

/// http server request
///
/// a thin wrapper to http::Request, impl Read for reading the request body
pub struct Request(http::Request<BodyReader>);

impl Request {
    // set the body reader according to the request framing
    // this function would be called by the server before handing the
    // request to the service
    pub(crate) fn set_reader(&mut self, reader: Rc<RefCell<dyn Read>>) -> Result<(), HttpError> {
        let body_reader = match body::framing(self.headers())? {
            Framing::Chunked => BodyReader::ChunkReader(reader, None),
            Framing::Sized(0) => BodyReader::EmptyReader,
            Framing::Sized(n) => BodyReader::SizedReader(reader, n),
            // a request without framing headers has no body
            Framing::Unframed => BodyReader::EmptyReader,
        };

        *self.body_mut() = body_reader;
        Ok(())
    }

    /// whether the connection may serve another request after this one
    pub fn is_keep_alive(&self) -> bool {
        let conn = self.headers().get(CONNECTION).map(|v| v.as_bytes());
        match self.version() {
            Version::HTTP_10 => conn.map_or(false, |v| v.eq_ignore_ascii_case(b"keep-alive")),
            _ => conn.map_or(true, |v| !v.eq_ignore_ascii_case(b"close")),
        }
    }
}

impl Deref for Request {
    type Target = http::Request<BodyReader>;

    /// deref to the http::Request
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Request {
    /// deref_mut to the http::Request
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Read for Request {
    #[inline]
    fn read(&mut self, msg: &mut [u8]) -> io::Result<usize> {
        self.body_mut().read(msg)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<HTTP Request {} {}>", self.method(), self.uri())
    }
}
