use std::cell::RefCell;
use std::fmt;
use std::io::{self, Read};
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use bytes::{Buf, BytesMut};
use http::{self, StatusCode, Version};

use crate::body::{self, BodyReader, Framing};
use crate::error::HttpError;

pub(crate) fn decode(buf: &mut BytesMut) -> Result<Option<Response>, HttpError> {
    let (rsp, amt) = {
        let mut headers = [httparse::EMPTY_HEADER; 64];
        let mut r = httparse::Response::new(&mut headers);
        let amt = match r.parse(&buf[..])? {
            httparse::Status::Complete(amt) => amt,
            httparse::Status::Partial => return Ok(None),
        };

        let version = match r.version {
            Some(0) => Version::HTTP_10,
            _ => Version::HTTP_11,
        };
        let code = r.code.ok_or(HttpError::MissingField("status code"))?;

        let mut rsp_builder = http::Response::builder().status(code).version(version);
        for header in r.headers.iter() {
            rsp_builder = rsp_builder.header(header.name, header.value);
        }

        (rsp_builder.body(BodyReader::EmptyReader)?, amt)
    };

    buf.advance(amt);
    Ok(Some(Response(rsp)))
}

/// http client Response
///
/// a thin wrapper to http::Response, impl Read for reading the response body
pub struct Response(http::Response<BodyReader>);

impl Response {
    // set the body reader
    // this function would be called by the client to
    // set a proper `BodyReader` according to the Response
    pub(crate) fn set_reader(&mut self, reader: Rc<RefCell<dyn Read>>) -> Result<(), HttpError> {
        let status = self.status();
        let body_reader = if status.is_informational()
            || status == StatusCode::NO_CONTENT
            || status == StatusCode::NOT_MODIFIED
        {
            BodyReader::EmptyReader
        } else {
            match body::framing(self.headers())? {
                Framing::Chunked => BodyReader::ChunkReader(reader, None),
                Framing::Sized(n) => BodyReader::SizedReader(reader, n),
                Framing::Unframed => BodyReader::EofReader(reader),
            }
        };

        *self.body_mut() = body_reader;
        Ok(())
    }
}

impl Deref for Response {
    type Target = http::Response<BodyReader>;

    /// deref to the http::Response
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Response {
    /// deref_mut to the http::Response
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Read for Response {
    #[inline]
    fn read(&mut self, msg: &mut [u8]) -> io::Result<usize> {
        self.body_mut().read(msg)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<HTTP Response {} {:?}>", self.status(), self.version())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_decode_and_read_body() {
        let mut buf = BytesMut::from(
            &b"HTTP/1.1 200 OK\r\nContent-type: text/plain\r\nContent-Length: 5\r\n\r\n"[..],
        );
        let mut rsp = decode(&mut buf).unwrap().unwrap();
        assert_eq!(rsp.status(), StatusCode::OK);
        assert_eq!(rsp.headers()["content-type"], "text/plain");
        assert!(buf.is_empty());

        rsp.set_reader(Rc::new(RefCell::new(Cursor::new(b"alice".to_vec()))))
            .unwrap();
        let mut body = String::new();
        rsp.read_to_string(&mut body).unwrap();
        assert_eq!(body, "alice");
    }

    #[test]
    fn test_decode_partial() {
        let mut buf = BytesMut::from(&b"HTTP/1.1 200"[..]);
        assert!(decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_no_content_has_empty_body() {
        let mut buf = BytesMut::from(&b"HTTP/1.1 204 No Content\r\n\r\n"[..]);
        let mut rsp = decode(&mut buf).unwrap().unwrap();
        rsp.set_reader(Rc::new(RefCell::new(Cursor::new(b"next".to_vec()))))
            .unwrap();
        let mut body = Vec::new();
        rsp.read_to_end(&mut body).unwrap();
        assert!(body.is_empty());
    }
}
