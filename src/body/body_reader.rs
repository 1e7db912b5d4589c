use std::cell::RefCell;
use std::cmp;
use std::fmt;
use std::io::{self, Read};
use std::rc::Rc;

use self::BodyReader::*;

/// Reads a message body off a shared connection
///
/// Whatever is left unread is drained when the reader is dropped, so the
/// next message on a keep-alive connection starts at the right place.
pub enum BodyReader {
    SizedReader(Rc<RefCell<dyn Read>>, usize),
    ChunkReader(Rc<RefCell<dyn Read>>, Option<usize>),
    // read until the peer closes the connection
    EofReader(Rc<RefCell<dyn Read>>),
    EmptyReader,
}

impl fmt::Debug for BodyReader {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let name = match *self {
            SizedReader(..) => "SizedReader",
            ChunkReader(..) => "ChunkReader",
            EofReader(..) => "EofReader",
            EmptyReader => "EmptyReader",
        };
        write!(f, "BodyReader {}", name)
    }
}

impl Read for BodyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match *self {
            SizedReader(ref r, ref mut remain) => {
                let len = cmp::min(*remain, buf.len());
                if len == 0 {
                    return Ok(0);
                }
                let n = r.borrow_mut().read(&mut buf[0..len])?;
                if n == 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed before the body was complete",
                    ));
                }
                *remain -= n;
                Ok(n)
            }
            ChunkReader(ref r, ref mut opt_remaining) => {
                let mut r = r.borrow_mut();
                let mut rem = match *opt_remaining {
                    Some(rem) => rem,
                    // None means we don't know the size of the next chunk
                    None => read_chunk_size(&mut *r)?,
                };
                trace!("chunked read, remaining={}", rem);

                if rem == 0 {
                    if opt_remaining.is_none() {
                        eat(&mut *r, b"\r\n")?;
                    }

                    // a chunk of size 0 ends the stream
                    *opt_remaining = Some(0);
                    trace!("end of chunked");
                    return Ok(0);
                }

                let to_read = cmp::min(rem, buf.len());
                let count = r.read(&mut buf[..to_read])?;

                if count == 0 {
                    *opt_remaining = Some(0);
                    return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "early eof"));
                }

                rem -= count;
                *opt_remaining = if rem > 0 {
                    Some(rem)
                } else {
                    eat(&mut *r, b"\r\n")?;
                    None
                };
                Ok(count)
            }
            EofReader(ref r) => r.borrow_mut().read(buf),
            EmptyReader => Ok(0),
        }
    }
}

impl Drop for BodyReader {
    fn drop(&mut self) {
        // consume whatever the user left behind
        let mut buf = [0u8; 4096];
        loop {
            match self.read(&mut buf) {
                Ok(0) => break,
                Ok(_) => continue,
                Err(e) => {
                    debug!("drop body reader err={}", e);
                    break;
                }
            }
        }
    }
}

fn eat(rdr: &mut dyn Read, bytes: &[u8]) -> io::Result<()> {
    let mut buf = [0];
    for &b in bytes.iter() {
        match rdr.read(&mut buf)? {
            1 if buf[0] == b => {}
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "Invalid characters found",
                ));
            }
        }
    }
    Ok(())
}

/// Chunks start with 1*HEXDIGIT, the size of the chunk.
fn read_chunk_size(rdr: &mut dyn Read) -> io::Result<usize> {
    macro_rules! byte (
        ($rdr:ident) => ({
            let mut buf = [0];
            match $rdr.read(&mut buf)? {
                1 => buf[0],
                _ => return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "Invalid chunk size line, read byte",
                )),
            }
        })
    );

    fn push_digit(size: usize, digit: u8) -> io::Result<usize> {
        size.checked_mul(16)
            .and_then(|s| s.checked_add(digit as usize))
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "chunk size overflow"))
    }

    let mut size = 0;
    let mut in_ext = false;
    let mut in_chunk_size = true;
    loop {
        match byte!(rdr) {
            b @ b'0'..=b'9' if in_chunk_size => size = push_digit(size, b - b'0')?,
            b @ b'a'..=b'f' if in_chunk_size => size = push_digit(size, b + 10 - b'a')?,
            b @ b'A'..=b'F' if in_chunk_size => size = push_digit(size, b + 10 - b'A')?,
            b'\r' => match byte!(rdr) {
                b'\n' => break,
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "Invalid chunk size line, read new line",
                    ));
                }
            },
            // the ";" starts a chunk extension
            b';' if !in_ext => {
                in_ext = true;
                in_chunk_size = false;
            }
            // "Linear white space" is ignored between the chunk size and the
            // extension separator token (";") due to the "implied *LWS rule".
            b'\t' | b' ' if !in_ext & !in_chunk_size => {}
            // LWS can follow the chunk size, but no more digits can come
            b'\t' | b' ' if in_chunk_size => in_chunk_size = false,
            // extensions are ignored, any octet goes
            ext if in_ext => {
                trace!("chunk extension byte={}", ext);
            }
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "Invalid chunk size line, unknown byte",
                ));
            }
        }
    }
    trace!("chunk size={}", size);
    Ok(size)
}
