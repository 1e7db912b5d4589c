use std::cmp;
use std::io::{self, Read, Write};

use bytes::{Buf, BytesMut};

/// Buffered reader/writer over a connection
///
/// The read side keeps everything received but not yet consumed in a
/// `BytesMut`, so a parser can look at it and ask for more data.
#[derive(Debug)]
pub struct BufferIo<T> {
    inner: T,
    reader_buf: BytesMut,
    writer_buf: Vec<u8>,
}

const INIT_BUFFER_SIZE: usize = 1024;
// grow the read buffer when less than this is left
const MIN_READ_SPACE: usize = 32;

impl<T> BufferIo<T> {
    #[inline]
    pub fn new(io: T) -> Self {
        BufferIo::with_capacity(io, INIT_BUFFER_SIZE)
    }

    #[inline]
    pub fn with_capacity(io: T, cap: usize) -> Self {
        BufferIo {
            inner: io,
            reader_buf: BytesMut::with_capacity(cap),
            writer_buf: Vec::with_capacity(cap),
        }
    }

    #[inline]
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// return the internal read buffer
    #[inline]
    pub fn get_reader_buf(&mut self) -> &mut BytesMut {
        &mut self.reader_buf
    }
}

impl<T: Read> BufferIo<T> {
    /// read some data into internal buffer
    ///
    /// returns the number of bytes read, 0 means the peer closed
    pub fn bump_read(&mut self) -> io::Result<usize> {
        if self.reader_buf.capacity() - self.reader_buf.len() < MIN_READ_SPACE {
            self.reader_buf.reserve(INIT_BUFFER_SIZE);
        }

        let mut chunk = [0u8; INIT_BUFFER_SIZE];
        let spare = self.reader_buf.capacity() - self.reader_buf.len();
        let len = cmp::min(spare, chunk.len());
        let n = self.inner.read(&mut chunk[..len])?;
        self.reader_buf.extend_from_slice(&chunk[..n]);
        Ok(n)
    }
}

impl<T: Read> Read for BufferIo<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.reader_buf.is_empty() && self.bump_read()? == 0 {
            return Ok(0);
        }

        let len = cmp::min(buf.len(), self.reader_buf.len());
        buf[..len].copy_from_slice(&self.reader_buf[..len]);
        self.reader_buf.advance(len);
        Ok(len)
    }
}

impl<T: Write> Write for BufferIo<T> {
    /// writes at most the remaining buffer space, a full buffer is flushed first
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let cap = self.writer_buf.capacity();
        if self.writer_buf.len() == cap {
            self.flush()?;
        }

        let len = cmp::min(cap - self.writer_buf.len(), buf.len());
        self.writer_buf.extend_from_slice(&buf[..len]);
        Ok(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.write_all(&self.writer_buf)?;
        self.writer_buf.clear();
        self.inner.flush()
    }
}
