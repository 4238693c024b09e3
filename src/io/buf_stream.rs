use std::io::{self, Read, Write};
use std::time::Duration;

use bytes::{Buf, Bytes, BytesMut};

use crate::error::Result;
use crate::net::NetStream;

/// Buffers reads and writes to the underlying network stream.
///
/// Writes accumulate in `wbuf` until [`flush`][Self::flush]; reads fill
/// `rbuf` on demand and are handed out without copying through
/// [`take`][Self::take].
pub(crate) struct BufStream {
    stream: Box<dyn NetStream>,

    wbuf: Vec<u8>,
    rbuf: BytesMut,
}

impl BufStream {
    pub(crate) fn new(stream: Box<dyn NetStream>) -> Self {
        Self { stream, wbuf: Vec::with_capacity(1024), rbuf: BytesMut::with_capacity(4096) }
    }

    pub(crate) fn buffer(&mut self) -> &mut Vec<u8> {
        &mut self.wbuf
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        if !self.wbuf.is_empty() {
            self.stream.write_all(&self.wbuf)?;
            self.wbuf.clear();
        }

        self.stream.flush()?;

        Ok(())
    }

    /// Ensure at least `n` bytes are available in the read buffer.
    pub(crate) fn read(&mut self, n: usize) -> Result<()> {
        let mut chunk = [0_u8; 4096];

        while self.rbuf.len() < n {
            let read = self.stream.read(&mut chunk)?;

            if read == 0 {
                // an unexpected EOF means the server told us to go away
                return Err(io::Error::from(io::ErrorKind::ConnectionAborted).into());
            }

            self.rbuf.extend_from_slice(&chunk[..read]);
        }

        Ok(())
    }

    /// View `n` buffered bytes starting at `offset`, without consuming them.
    pub(crate) fn get(&self, offset: usize, n: usize) -> &[u8] {
        &self.rbuf[offset..offset + n]
    }

    /// Discard `n` buffered bytes.
    pub(crate) fn consume(&mut self, n: usize) {
        self.rbuf.advance(n);
    }

    /// Remove and return `n` buffered bytes.
    pub(crate) fn take(&mut self, n: usize) -> Bytes {
        self.rbuf.split_to(n).freeze()
    }

    pub(crate) fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.stream.set_read_timeout(timeout)
    }

    pub(crate) fn set_write_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.stream.set_write_timeout(timeout)
    }

    /// Close the underlying stream. Safe to call more than once.
    pub(crate) fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown()
    }

    /// Swap the underlying stream, e.g. for a TLS upgrade. Any buffered
    /// writes must have been flushed and buffered reads consumed first.
    pub(crate) fn map_stream(
        &mut self,
        f: impl FnOnce(Box<dyn NetStream>) -> Result<Box<dyn NetStream>>,
    ) -> Result<()> {
        let stream = std::mem::replace(&mut self.stream, Box::new(Detached));
        self.stream = f(stream)?;

        Ok(())
    }
}

// placeholder occupying the stream slot while `map_stream` runs; if the
// mapping fails the connection is torn down, so this is never read
struct Detached;

impl Read for Detached {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::ErrorKind::NotConnected.into())
    }
}

impl Write for Detached {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::ErrorKind::NotConnected.into())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl NetStream for Detached {
    fn set_read_timeout(&mut self, _timeout: Option<Duration>) -> io::Result<()> {
        Ok(())
    }

    fn set_write_timeout(&mut self, _timeout: Option<Duration>) -> io::Result<()> {
        Ok(())
    }

    fn shutdown(&mut self) -> io::Result<()> {
        Ok(())
    }
}
