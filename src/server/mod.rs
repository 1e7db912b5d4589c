//! http server on top of `may` coroutines

mod date;
mod request;
mod response;
mod server_impl;

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

pub use self::request::Request;
pub use self::response::Response;
pub use self::server_impl::{HttpServer, ServerHandle};

/// the http service trait
///
/// user code supplies a type that impl the `handle` method for the http server,
/// one instance is shared by every connection
pub trait HttpService {
    /// Receives a `Request`/`Response` pair, and should perform some action on them.
    ///
    /// This could be reading from the request, and writing to the response.
    /// Whatever is left of the request body is drained once the request is
    /// dropped, the response is finished when the server drops it.
    fn handle(&self, request: Request, response: &mut Response);
}

// when client has expect header, we need to write CONTINUE rsp first
// return true if need to close the connection
fn handle_expect(req: &Request, raw_rsp: &Rc<RefCell<dyn Write>>) -> io::Result<bool> {
    use http::header::EXPECT;
    use http::{StatusCode, Version};

    let expect = match req.headers().get(EXPECT) {
        Some(v) => v.as_bytes(),
        None => return Ok(false),
    };
    if req.version() == Version::HTTP_11 && expect.eq_ignore_ascii_case(b"100-continue") {
        let mut raw_rsp = raw_rsp.borrow_mut();
        write!(
            raw_rsp,
            "{:?} {}\r\n\r\n",
            Version::HTTP_11,
            StatusCode::CONTINUE
        )?;
        raw_rsp.flush()?;
        return Ok(false);
    }

    // don't support other expectations, close the connection
    Ok(true)
}
