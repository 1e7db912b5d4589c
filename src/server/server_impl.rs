//! http server implementation on top of `MAY`

use std::cell::RefCell;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, ToSocketAddrs};
use std::rc::Rc;
use std::sync::Arc;

use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use may::coroutine;
use may::net::{TcpListener, TcpStream};

use crate::buffer::BufferIo;
use crate::server::{handle_expect, request, HttpService, Response};

macro_rules! t {
    ($e: expr) => {
        match $e {
            Ok(val) => val,
            Err(ref err)
                if err.kind() == io::ErrorKind::ConnectionReset
                    || err.kind() == io::ErrorKind::UnexpectedEof =>
            {
                trace!("http server: connection closed");
                return;
            }
            Err(err) => {
                error!("call = {:?}\nerr = {:?}", stringify!($e), err);
                return;
            }
        }
    };
}

macro_rules! t_c {
    ($e: expr) => {
        match $e {
            Ok(val) => val,
            Err(err) => {
                error!("call = {:?}\nerr = {:?}", stringify!($e), err);
                continue;
            }
        }
    };
}

/// this is the generic type http server
/// with a type parameter that impl `HttpService` trait
pub struct HttpServer<T>(pub T);

impl<T: HttpService + Send + Sync + 'static> HttpServer<T> {
    /// Spawns the http service, binding to the given address
    ///
    /// returns a handle to the accepting coroutine, cancel it through
    /// `ServerHandle::shutdown` to stop the service
    pub fn start<L: ToSocketAddrs>(self, addr: L) -> io::Result<ServerHandle> {
        let listener = TcpListener::bind(addr)?;
        let addr = listener.local_addr()?;
        let service = Arc::new(self.0);
        let handle = go!(
            coroutine::Builder::new().name("TcpServer".to_owned()),
            move || {
                for stream in listener.incoming() {
                    let stream = t_c!(stream);
                    let service = service.clone();
                    go!(move || serve_connection(&*service, stream));
                }
            }
        )?;
        debug!("http server listening on {}", addr);
        Ok(ServerHandle { addr, handle })
    }
}

/// a running `HttpServer`
pub struct ServerHandle {
    addr: SocketAddr,
    handle: coroutine::JoinHandle<()>,
}

impl ServerHandle {
    /// the address the server actually bound, useful when binding port 0
    #[inline]
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// stop accepting connections and release the listening socket
    ///
    /// connections already accepted are served until their clients leave
    pub fn shutdown(self) {
        unsafe { self.handle.coroutine().cancel() };
        if self.handle.join().is_err() {
            debug!("http server on {} cancelled", self.addr);
        }
    }
}

// serve all the requests of one connection
fn serve_connection<T: HttpService>(service: &T, stream: TcpStream) {
    if let Ok(peer) = stream.peer_addr() {
        trace!("accepted connection from {}", peer);
    }
    let io = Rc::new(RefCell::new(BufferIo::new(stream)));
    let reader: Rc<RefCell<dyn Read>> = io.clone();
    let writer: Rc<RefCell<dyn Write>> = io.clone();

    loop {
        let decoded = request::decode(io.borrow_mut().get_reader_buf());
        let mut req = match decoded {
            Ok(Some(req)) => req,
            Ok(None) => {
                // need more data
                let n = t!(io.borrow_mut().bump_read());
                if n == 0 {
                    // break the connection
                    return;
                }
                continue;
            }
            Err(e) => {
                debug!("bad request: {}", e);
                reject(&writer, StatusCode::BAD_REQUEST);
                return;
            }
        };

        if let Err(e) = req.set_reader(reader.clone()) {
            debug!("bad request framing {:?}: {}", req, e);
            reject(&writer, StatusCode::BAD_REQUEST);
            return;
        }
        if t!(handle_expect(&req, &writer)) {
            reject(&writer, StatusCode::EXPECTATION_FAILED);
            return;
        }

        let mut rsp = Response::new(writer.clone());
        rsp.set_keep_alive(req.is_keep_alive());
        service.handle(req, &mut rsp);
        let keep_alive = rsp.keep_alive();
        drop(rsp);

        t!(io.borrow_mut().flush());
        if !keep_alive {
            return;
        }
    }
}

// answer with an empty error response, the connection is closed afterwards
fn reject(writer: &Rc<RefCell<dyn Write>>, status: StatusCode) {
    let mut rsp = Response::new(writer.clone());
    *rsp.status_mut() = status;
    rsp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    rsp.set_keep_alive(false);
    if let Err(e) = rsp.send(b"") {
        debug!("failed to send {}: {}", status, e);
    }
}
