//! Client Requests
//!
//! These are requests written by an `HttpClient` onto its connection.
use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use http::{self, Method};

use crate::body::BodyWriter;

/// The outgoing half of a client connection, created by a `HttpClient`.
///
/// There is a `Drop` implementation for `Request` that will automatically
/// write the head and flush the body, if the caller has not already done so,
/// so that the client doesn't accidentally leave dangling requests.
///
/// it's a thin wrapper to http::Request, impl Write for writing the body
pub struct Request {
    // the Raw http request
    raw_req: http::Request<BodyWriter>,
    // the underline write stream
    writer: Rc<RefCell<dyn Write>>,
    // the cached Request size
    body_size: Option<usize>,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<HTTP Request {} {}>", self.method(), self.uri())
    }
}

impl Request {
    /// Creates a new Request that can be used to write to a network stream.
    #[inline]
    pub fn new(stream: Rc<RefCell<dyn Write>>) -> Request {
        Request {
            raw_req: http::Request::new(BodyWriter::InvalidWriter),
            writer: stream,
            body_size: None,
        }
    }

    fn has_body(&self) -> bool {
        match *self.method() {
            Method::GET | Method::HEAD | Method::DELETE | Method::OPTIONS | Method::TRACE => {
                self.body_size.map_or(false, |n| n > 0)
            }
            _ => true,
        }
    }

    // actual write head to stream
    fn write_head_impl(&mut self, has_body: bool) -> io::Result<()> {
        let mut writer = self.writer.borrow_mut();

        write!(
            writer,
            "{} {} {:?}\r\n",
            self.method(),
            self.uri(),
            self.version()
        )?;
        write!(writer, "User-Agent: first_writer\r\nAccept: */*\r\n")?;

        for (key, value) in self.headers().iter() {
            writer.write_all(key.as_str().as_bytes())?;
            writer.write_all(b": ")?;
            writer.write_all(value.as_bytes())?;
            writer.write_all(b"\r\n")?;
        }

        if has_body {
            match self.body_size {
                Some(len) => write!(writer, "Content-Length: {}\r\n", len)?,
                None => writer.write_all(b"Transfer-Encoding: chunked\r\n")?,
            }
        }

        writer.write_all(b"\r\n")?;
        Ok(())
    }

    // write head to stream
    fn write_head(&mut self) -> io::Result<BodyWriter> {
        let has_body = self.has_body();
        self.write_head_impl(has_body)?;
        let body = if !has_body {
            BodyWriter::EmptyWriter(self.writer.clone())
        } else {
            match self.body_size {
                Some(size) => BodyWriter::SizedWriter(self.writer.clone(), size),
                None => BodyWriter::ChunkWriter(self.writer.clone()),
            }
        };
        Ok(body)
    }

    /// Writes the body and ends the Request.
    ///
    /// This is a shortcut method for when you have a Request with a fixed
    /// size, and would only need a single `write` call normally.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use first_writer::client::Request;
    /// fn prepare(req: &mut Request) {
    ///     req.send(b"Hello World!").unwrap();
    /// }
    /// ```
    #[inline]
    pub fn send(&mut self, body: &[u8]) -> io::Result<()> {
        self.body_size = Some(body.len());
        self.write_all(body)
    }

    /// set the content-length
    ///
    /// if you don't call `send()`, should call this before write the Request,
    /// otherwise the body is sent chunked
    #[inline]
    pub fn set_content_length(&mut self, len: usize) {
        self.body_size = Some(len);
    }

    /// get the connection
    pub(super) fn conn(&self) -> &Rc<RefCell<dyn Write>> {
        &self.writer
    }
}

impl Deref for Request {
    type Target = http::Request<BodyWriter>;

    /// deref to the http::Request
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.raw_req
    }
}

impl DerefMut for Request {
    /// deref_mut to the http::Request
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.raw_req
    }
}

impl Write for Request {
    #[inline]
    fn write(&mut self, msg: &[u8]) -> io::Result<usize> {
        if let BodyWriter::InvalidWriter = *self.body() {
            *self.body_mut() = self.write_head()?;
        }
        self.body_mut().write(msg)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.body_mut().flush()
    }
}

impl Drop for Request {
    fn drop(&mut self) {
        use std::thread;

        if thread::panicking() {
            // just let it panic
            return;
        }

        // make sure we write every thing
        if let BodyWriter::InvalidWriter = *self.body() {
            *self.body_mut() = self
                .write_head()
                .unwrap_or_else(|_| BodyWriter::EmptyWriter(self.writer.clone()));
        }
    }
}
