//! Server Responses
//!
//! These are responses sent by an `HttpServer` to clients, after
//! receiving a request.
use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

use http::{HeaderMap, StatusCode, Version};

use crate::body::BodyWriter;

const SERVER_NAME: &str = "first_writer";

/// response internal state
#[derive(Debug, PartialEq)]
enum ResponseState {
    // the fresh state
    Init,
    // head write done, need to write body
    WriteHeadDone,
}

/// The outgoing half for a Tcp connection, created by a `Server` and given to a `Handler`.
///
/// The default `StatusCode` for a `Response` is `200 OK`.
///
/// There is a `Drop` implementation for `Response` that will automatically
/// write the head and flush the body, if the handler has not already done so,
/// so that the server doesn't accidentally leave dangling requests.
pub struct Response {
    /// The HTTP version of this response.
    pub version: Version,
    // Stream the Response is writing to
    body: BodyWriter,
    // The status code for the request.
    status: StatusCode,
    // The outgoing headers on this response.
    headers: HeaderMap,
    // the underline write stream
    writer: Rc<RefCell<dyn Write>>,
    // the response current state
    state: ResponseState,
    // the cached response size
    body_size: Option<usize>,
    // whether the connection stays open after this response
    keep_alive: bool,
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<HTTP Response {}>", self.status)
    }
}

impl Response {
    /// Creates a new Response that can be used to write to a network stream.
    #[inline]
    pub fn new(stream: Rc<RefCell<dyn Write>>) -> Response {
        Response {
            status: StatusCode::OK,
            version: Version::HTTP_11,
            headers: HeaderMap::with_capacity(16),
            body: BodyWriter::InvalidWriter,
            writer: stream,
            state: ResponseState::Init,
            body_size: None,
            keep_alive: true,
        }
    }

    /// write head to stream
    fn write_head(&mut self) -> io::Result<BodyWriter> {
        {
            let mut writer = self.writer.borrow_mut();
            write!(writer, "{:?} {}\r\n", self.version, self.status)?;
            write!(
                writer,
                "Server: {}\r\nDate: {}\r\n",
                SERVER_NAME,
                super::date::now()
            )?;

            for (key, value) in self.headers.iter() {
                writer.write_all(key.as_str().as_bytes())?;
                writer.write_all(b": ")?;
                writer.write_all(value.as_bytes())?;
                writer.write_all(b"\r\n")?;
            }

            match self.body_size {
                Some(len) => write!(writer, "Content-Length: {}\r\n", len)?,
                None => writer.write_all(b"Transfer-Encoding: chunked\r\n")?,
            }

            if !self.keep_alive {
                writer.write_all(b"Connection: close\r\n")?;
            }

            writer.write_all(b"\r\n")?;
        }

        let body = match self.status {
            StatusCode::NO_CONTENT | StatusCode::NOT_MODIFIED => {
                BodyWriter::EmptyWriter(self.writer.clone())
            }
            c if c.is_informational() => BodyWriter::EmptyWriter(self.writer.clone()),
            _ => match self.body_size {
                Some(size) => BodyWriter::SizedWriter(self.writer.clone(), size),
                None => BodyWriter::ChunkWriter(self.writer.clone()),
            },
        };
        Ok(body)
    }

    #[inline]
    fn ensure_head(&mut self) -> io::Result<()> {
        if self.state == ResponseState::Init {
            self.body = self.write_head()?;
            self.state = ResponseState::WriteHeadDone;
        }
        Ok(())
    }

    /// Writes the body and ends the response.
    ///
    /// This is a shortcut method for when you have a response with a fixed
    /// size, and would only need a single `write` call normally.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use first_writer::server::Response;
    /// fn handler(res: &mut Response) {
    ///     res.send(b"Hello World!").unwrap();
    /// }
    /// ```
    ///
    /// The above is the same, but shorter, than the longer:
    ///
    /// ```no_run
    /// # use first_writer::server::Response;
    /// use std::io::Write;
    /// fn handler(res: &mut Response) {
    ///     let body = b"Hello World!";
    ///     res.set_content_length(body.len());
    ///     res.write_all(body).unwrap();
    /// }
    /// ```
    pub fn send(&mut self, body: &[u8]) -> io::Result<()> {
        self.body_size = Some(body.len());
        self.ensure_head()?;
        self.write_all(body)?;
        self.body.flush()
    }

    /// set the content-length
    ///
    /// if you don't call `send()`, should call this before write the response,
    /// otherwise the body is sent chunked
    pub fn set_content_length(&mut self, len: usize) {
        self.body_size = Some(len);
    }

    /// whether the server keeps the connection after this response
    #[inline]
    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// ask the server to close (or keep) the connection after this response
    ///
    /// only has an effect before the head is written
    pub fn set_keep_alive(&mut self, keep_alive: bool) {
        self.keep_alive = keep_alive;
    }

    /// The status of this response.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The headers of this response.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a mutable reference to the status.
    #[inline]
    pub fn status_mut(&mut self) -> &mut StatusCode {
        &mut self.status
    }

    /// Get a mutable reference to the Headers.
    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

impl Write for Response {
    #[inline]
    fn write(&mut self, msg: &[u8]) -> io::Result<usize> {
        self.ensure_head()?;
        self.body.write(msg)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.body.flush()
    }
}

impl Drop for Response {
    fn drop(&mut self) {
        use std::thread;
        if thread::panicking() && self.state == ResponseState::Init {
            self.status = StatusCode::INTERNAL_SERVER_ERROR;
            self.body_size = Some(0);
            self.keep_alive = false;
        }
        // make sure we write every thing
        if let Err(e) = self.ensure_head() {
            debug!("failed to write response head: {}", e);
        }
    }
}
