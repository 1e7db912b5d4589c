use std::cell::RefCell;
use std::cmp;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

use self::BodyWriter::*;

/// Writes a message body onto a shared connection
///
/// Dropping the writer finishes the body (pads a short sized body, writes the
/// last chunk) and flushes the connection.
pub enum BodyWriter {
    SizedWriter(Rc<RefCell<dyn Write>>, usize),
    ChunkWriter(Rc<RefCell<dyn Write>>),
    // no body, only flushes the head on drop
    EmptyWriter(Rc<RefCell<dyn Write>>),
    // place holder until the head is written
    InvalidWriter,
}

impl fmt::Debug for BodyWriter {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let name = match *self {
            SizedWriter(..) => "SizedWriter",
            ChunkWriter(_) => "ChunkWriter",
            EmptyWriter(_) => "EmptyWriter",
            InvalidWriter => "Invalid",
        };
        write!(f, "BodyWriter {}", name)
    }
}

impl BodyWriter {
    fn conn(&self) -> Option<&Rc<RefCell<dyn Write>>> {
        match *self {
            SizedWriter(ref w, _) | ChunkWriter(ref w) | EmptyWriter(ref w) => Some(w),
            InvalidWriter => None,
        }
    }
}

impl Write for BodyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match *self {
            SizedWriter(ref w, ref mut remain) => {
                if *remain == 0 && !buf.is_empty() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "body is longer than the declared content-length",
                    ));
                }
                let len = cmp::min(*remain, buf.len());
                let n = w.borrow_mut().write(&buf[0..len])?;
                *remain -= n;
                Ok(n)
            }
            ChunkWriter(ref w) => {
                // an empty chunk would end the body
                if buf.is_empty() {
                    return Ok(0);
                }
                let mut w = w.borrow_mut();
                write!(w, "{:X}\r\n", buf.len())?;
                w.write_all(buf)?;
                w.write_all(b"\r\n")?;
                Ok(buf.len())
            }
            EmptyWriter(_) => Ok(0),
            InvalidWriter => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "message head is not written yet",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.conn() {
            Some(w) => w.borrow_mut().flush(),
            None => Ok(()),
        }
    }
}

impl Drop for BodyWriter {
    fn drop(&mut self) {
        match *self {
            SizedWriter(ref w, remain) => {
                let mut w = w.borrow_mut();
                if remain > 0 {
                    warn!("body is {} bytes short, padding with zeros", remain);
                    let buf = vec![0u8; remain];
                    w.write_all(&buf).ok();
                }
                w.flush().ok();
            }
            ChunkWriter(ref w) => {
                let mut w = w.borrow_mut();
                w.write_all(b"0\r\n\r\n").ok();
                w.flush().ok();
            }
            EmptyWriter(ref w) => {
                w.borrow_mut().flush().ok();
            }
            InvalidWriter => {}
        }
    }
}
