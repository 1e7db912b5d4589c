//! Helpers shared by the integration tests
#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::SocketAddr;
use std::time::Duration;

use first_writer::client::HttpClient;
use first_writer::{FirstWriterRegister, HttpServer, ServerHandle};
use may::net::TcpStream;

pub const TIMEOUT: Duration = Duration::from_secs(10);

/// start a fresh register on an ephemeral port
pub fn start_register() -> (ServerHandle, FirstWriterRegister) {
    let _ = env_logger::builder().is_test(true).try_init();
    let register = FirstWriterRegister::new();
    let server = HttpServer(register.clone())
        .start("127.0.0.1:0")
        .expect("failed to start server");
    (server, register)
}

pub fn connect(addr: SocketAddr) -> HttpClient {
    let mut client = HttpClient::connect(addr).expect("failed to connect");
    client.set_timeout(Some(TIMEOUT)).expect("failed to set timeout");
    client
}

/// post `body` on `client` and return (status, content-type, body)
pub fn post(client: &mut HttpClient, body: &[u8]) -> (u16, String, Vec<u8>) {
    let mut rsp = client
        .post("/".parse().unwrap(), body)
        .expect("post failed");
    let content_type = rsp
        .headers()
        .get("content-type")
        .map(|v| v.to_str().unwrap().to_owned())
        .unwrap_or_default();
    let mut out = Vec::new();
    rsp.read_to_end(&mut out).expect("failed to read body");
    (rsp.status().as_u16(), content_type, out)
}

/// write raw bytes on a new connection and read until the server closes it
pub fn raw_exchange(addr: SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).expect("failed to connect");
    stream.set_read_timeout(Some(TIMEOUT)).unwrap();
    stream.write_all(raw).unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).unwrap();
    String::from_utf8_lossy(&out).into_owned()
}
