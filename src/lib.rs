//! A first-writer-wins register served over http.
//!
//! The first POST body received by a server becomes its permanent value, and
//! every POST, from any client, gets that value echoed back. Test harnesses
//! use it to let racing clients agree on a winner: everybody posts its own
//! identity and everybody reads back the identity of whoever came first.
//!
//! The http layer is coroutine based, every connection is served by its own
//! `may` coroutine.
extern crate bytes;
pub extern crate http;
extern crate httparse;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
#[macro_use]
extern crate may;
extern crate thiserror;
extern crate time;

pub mod body;
mod buffer;
pub mod client;
pub mod config;
pub mod error;
pub mod register;
pub mod server;

pub use crate::config::Config;
pub use crate::error::{ConfigError, Error, HttpError};
pub use crate::register::{Claim, FirstWriterRegister, ValueCell};
pub use crate::server::{HttpServer, HttpService, ServerHandle};
