use std::cell::RefCell;
use std::io::{self, Read, Write};
use std::net::ToSocketAddrs;
use std::rc::Rc;
use std::time::Duration;

use http::header::{HeaderValue, HOST};
use http::{Method, Uri};
use may::net::TcpStream;

use crate::buffer::BufferIo;
use crate::client::{Request, Response};

/// this is just a simple client connector
#[derive(Debug)]
pub struct HttpClient {
    conn: Rc<RefCell<BufferIo<TcpStream>>>,
    host: Option<HeaderValue>,
}

impl HttpClient {
    /// create HttpClient connect to the given address
    pub fn connect<A: ToSocketAddrs>(remote: A) -> io::Result<Self> {
        let stream = TcpStream::connect(remote)?;
        let host = stream
            .peer_addr()
            .ok()
            .and_then(|addr| HeaderValue::from_str(&addr.to_string()).ok());
        let stream = BufferIo::new(stream);
        Ok(HttpClient {
            conn: Rc::new(RefCell::new(stream)),
            host,
        })
    }

    /// set both read/write timeout for the connection
    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> io::Result<&mut Self> {
        {
            let mut s = self.conn.borrow_mut();
            let s = s.inner_mut();
            s.set_read_timeout(timeout)?;
            s.set_write_timeout(timeout)?;
        }
        Ok(self)
    }

    /// create a GET request to the specified uri and return the response
    pub fn get(&mut self, uri: Uri) -> io::Result<Response> {
        let mut req = self.raw_request();
        *req.uri_mut() = uri;
        self.send_request(req)
    }

    /// create a post request with the uri, return the response
    pub fn post(&mut self, uri: Uri, data: &[u8]) -> io::Result<Response> {
        let mut req = self.raw_request();
        *req.method_mut() = Method::POST;
        *req.uri_mut() = uri;
        req.send(data)?;
        self.send_request(req)
    }

    /// create a raw empty request with default values
    ///
    /// the request is written out when it is handed to `send_request`
    pub fn raw_request(&self) -> Request {
        let writer: Rc<RefCell<dyn Write>> = self.conn.clone();
        let mut req = Request::new(writer);
        if let Some(ref host) = self.host {
            req.headers_mut().insert(HOST, host.clone());
        }
        req
    }

    /// finish the request and wait for its response
    ///
    /// the request must come from `raw_request` of this client, and the body
    /// of the previous response must be consumed or dropped first
    pub fn send_request(&mut self, req: Request) -> io::Result<Response> {
        let conn = Rc::as_ptr(&self.conn) as *const u8;
        if conn != Rc::as_ptr(req.conn()) as *const u8 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "request was created by another client",
            ));
        }
        // the request is sent out on drop
        drop(req);
        self.get_rsp()
    }

    // get response from the connection
    fn get_rsp(&mut self) -> io::Result<Response> {
        let mut stream = self.conn.borrow_mut();
        loop {
            match super::response::decode(stream.get_reader_buf())? {
                None => {
                    // need more data
                    if stream.bump_read()? == 0 {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "connection closed before the response",
                        ));
                    }
                }
                Some(mut rsp) => {
                    let reader: Rc<RefCell<dyn Read>> = self.conn.clone();
                    rsp.set_reader(reader)?;
                    return Ok(rsp);
                }
            }
        }
    }
}
