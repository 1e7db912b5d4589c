//! Blocking http client, one keep-alive connection per `HttpClient`

mod client_impl;
mod request;
mod response;

use std::io::{self, Read};
use std::net::ToSocketAddrs;

use http::Uri;

pub use self::client_impl::HttpClient;
pub use self::request::Request;
pub use self::response::Response;

/// post `identity` to the register at `addr` and return the winner's identity
///
/// # Example
///
/// ```no_run
/// let winner = first_writer::client::post_identity("127.0.0.1:8000", b"node-3").unwrap();
/// println!("leader is {}", String::from_utf8_lossy(&winner));
/// ```
pub fn post_identity<A: ToSocketAddrs>(addr: A, identity: &[u8]) -> io::Result<Vec<u8>> {
    let mut client = HttpClient::connect(addr)?;
    let mut rsp = client.post(Uri::from_static("/"), identity)?;
    if !rsp.status().is_success() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("register answered {}", rsp.status()),
        ));
    }
    let mut winner = Vec::new();
    rsp.read_to_end(&mut winner)?;
    Ok(winner)
}
