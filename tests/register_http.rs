mod common;

use std::io::{Read, Write};

use first_writer::client;
use may::net::TcpStream;

use crate::common::{connect, post, raw_exchange, start_register, TIMEOUT};

#[test]
fn alice_bob_and_empty() {
    let (server, register) = start_register();
    let mut client = connect(server.local_addr());

    let (status, content_type, body) = post(&mut client, b"alice");
    assert_eq!(status, 200);
    assert_eq!(content_type, "text/plain");
    assert_eq!(body, b"alice");

    let (status, content_type, body) = post(&mut client, b"bob");
    assert_eq!(status, 200);
    assert_eq!(content_type, "text/plain");
    assert_eq!(body, b"alice");

    let (status, content_type, body) = post(&mut client, b"");
    assert_eq!(status, 200);
    assert_eq!(content_type, "text/plain");
    assert_eq!(body, b"alice");

    assert_eq!(register.cell().get().unwrap(), "alice");
    server.shutdown();
}

#[test]
fn first_write_wins_across_connections() {
    let (server, _register) = start_register();
    let addr = server.local_addr();

    let bodies: Vec<String> = (0..8).map(|i| format!("node-{}", i)).collect();
    for body in &bodies {
        let winner = client::post_identity(addr, body.as_bytes()).unwrap();
        assert_eq!(winner, b"node-0");
    }
    server.shutdown();
}

#[test]
fn no_mutation_after_first_write() {
    let (server, register) = start_register();
    let mut client = connect(server.local_addr());
    assert_eq!(post(&mut client, b"first").2, b"first");

    let mut sent = 0;
    for &checkpoint in &[2, 10, 100] {
        while sent < checkpoint {
            let body = format!("later-{}", sent);
            let (status, content_type, echoed) = post(&mut client, body.as_bytes());
            assert_eq!(status, 200);
            assert_eq!(content_type, "text/plain");
            assert_eq!(echoed, b"first");
            sent += 1;
        }
        assert_eq!(register.cell().get().unwrap(), "first", "after {} posts", sent);
    }
    server.shutdown();
}

#[test]
fn empty_first_body_wins() {
    let (server, register) = start_register();
    let mut client = connect(server.local_addr());
    assert_eq!(post(&mut client, b"").2, b"");
    assert_eq!(post(&mut client, b"too late").2, b"");
    assert!(register.cell().is_set());
    server.shutdown();
}

#[test]
fn path_is_ignored() {
    let (server, _register) = start_register();
    let mut client = connect(server.local_addr());
    let mut rsp = client
        .post("/some/where?x=1".parse().unwrap(), b"carol")
        .unwrap();
    let mut body = Vec::new();
    rsp.read_to_end(&mut body).unwrap();
    assert_eq!(body, b"carol");
    assert_eq!(post(&mut client, b"dave").2, b"carol");
    server.shutdown();
}

#[test]
fn get_is_not_implemented() {
    let (server, register) = start_register();
    let mut client = connect(server.local_addr());

    let mut rsp = client.get("/".parse().unwrap()).unwrap();
    assert_eq!(rsp.status().as_u16(), 501);
    assert_eq!(rsp.headers()["content-type"], "text/plain");
    let mut body = Vec::new();
    rsp.read_to_end(&mut body).unwrap();
    assert!(body.is_empty());
    assert!(!register.cell().is_set());

    // the connection is still usable
    assert_eq!(post(&mut client, b"erin").2, b"erin");
    server.shutdown();
}

#[test]
fn chunked_body_is_stored() {
    let (server, register) = start_register();
    let mut client = connect(server.local_addr());

    let mut req = client.raw_request();
    *req.method_mut() = http::Method::POST;
    req.write_all(b"chunked-").unwrap();
    req.write_all(b"frank").unwrap();
    let mut rsp = client.send_request(req).unwrap();
    let mut body = Vec::new();
    rsp.read_to_end(&mut body).unwrap();
    drop(rsp);

    assert_eq!(body, b"chunked-frank");
    assert_eq!(register.cell().get().unwrap(), "chunked-frank");
    assert_eq!(post(&mut client, b"grace").2, b"chunked-frank");
    server.shutdown();
}

#[test]
fn invalid_content_length_is_rejected() {
    let (server, register) = start_register();
    let rsp = raw_exchange(
        server.local_addr(),
        b"POST / HTTP/1.1\r\nContent-Length: lots\r\n\r\nheidi",
    );
    assert!(rsp.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{}", rsp);
    assert!(rsp.contains("\r\nConnection: close\r\n"), "{}", rsp);
    assert!(!register.cell().is_set());
    server.shutdown();
}

#[test]
fn broken_chunked_body_is_rejected() {
    let (server, register) = start_register();
    let rsp = raw_exchange(
        server.local_addr(),
        b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\n",
    );
    assert!(rsp.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{}", rsp);
    assert!(rsp.contains("\r\nConnection: close\r\n"), "{}", rsp);
    assert!(!register.cell().is_set());
    server.shutdown();
}

#[test]
fn unframed_post_is_an_empty_write() {
    let (server, register) = start_register();
    let rsp = raw_exchange(
        server.local_addr(),
        b"POST / HTTP/1.1\r\nConnection: close\r\n\r\n",
    );
    assert!(rsp.starts_with("HTTP/1.1 200 OK\r\n"), "{}", rsp);
    assert!(rsp.contains("\r\nContent-Length: 0\r\n"), "{}", rsp);
    assert!(rsp.ends_with("\r\n\r\n"), "{}", rsp);
    assert_eq!(register.cell().get().unwrap(), "");

    let mut client = connect(server.local_addr());
    assert_eq!(post(&mut client, b"kim").2, b"");
    server.shutdown();
}

#[test]
fn garbage_is_rejected() {
    let (server, register) = start_register();
    let rsp = raw_exchange(server.local_addr(), b"\x00\x01\x02 what\r\n\r\n");
    assert!(rsp.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{}", rsp);
    assert!(!register.cell().is_set());
    server.shutdown();
}

#[test]
fn connection_close_is_honored() {
    let (server, _register) = start_register();
    let rsp = raw_exchange(
        server.local_addr(),
        b"POST / HTTP/1.1\r\nContent-Length: 4\r\nConnection: close\r\n\r\nivan",
    );
    assert!(rsp.starts_with("HTTP/1.1 200 OK\r\n"), "{}", rsp);
    assert!(rsp.contains("\r\ncontent-type: text/plain\r\n"), "{}", rsp);
    assert!(rsp.contains("\r\nConnection: close\r\n"), "{}", rsp);
    assert!(rsp.ends_with("\r\n\r\nivan"), "{}", rsp);
    server.shutdown();
}

#[test]
fn http10_gets_one_response() {
    let (server, _register) = start_register();
    let rsp = raw_exchange(
        server.local_addr(),
        b"POST / HTTP/1.0\r\nContent-Length: 4\r\n\r\njudy",
    );
    assert!(rsp.ends_with("\r\n\r\njudy"), "{}", rsp);
    server.shutdown();
}

#[test]
fn expect_continue() {
    let (server, _register) = start_register();
    let mut stream = TcpStream::connect(server.local_addr()).unwrap();
    stream.set_read_timeout(Some(TIMEOUT)).unwrap();
    stream
        .write_all(
            b"POST / HTTP/1.1\r\nContent-Length: 5\r\nExpect: 100-continue\r\nConnection: close\r\n\r\n",
        )
        .unwrap();

    let interim = b"HTTP/1.1 100 Continue\r\n\r\n";
    let mut head = vec![0u8; interim.len()];
    stream.read_exact(&mut head).unwrap();
    assert_eq!(&head[..], &interim[..]);

    stream.write_all(b"mallo").unwrap();
    let mut rest = String::new();
    stream.read_to_string(&mut rest).unwrap();
    assert!(rest.starts_with("HTTP/1.1 200 OK\r\n"), "{}", rest);
    assert!(rest.ends_with("\r\n\r\nmallo"), "{}", rest);
    server.shutdown();
}

#[test]
fn servers_do_not_share_state() {
    let (a, _) = start_register();
    let (b, _) = start_register();
    assert_eq!(client::post_identity(a.local_addr(), b"on-a").unwrap(), b"on-a");
    assert_eq!(client::post_identity(b.local_addr(), b"on-b").unwrap(), b"on-b");
    assert_eq!(client::post_identity(a.local_addr(), b"again").unwrap(), b"on-a");
    a.shutdown();
    b.shutdown();
}

#[test]
fn shutdown_releases_listener() {
    let (server, _register) = start_register();
    let addr = server.local_addr();
    assert_eq!(client::post_identity(addr, b"oscar").unwrap(), b"oscar");
    server.shutdown();
    assert!(TcpStream::connect(addr).is_err());
}
