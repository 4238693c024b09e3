use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use bytes::BytesMut;
use crossbeam::channel::{Receiver, Sender};
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::connection::MySqlConnection;
use crate::io::BufStream;
use crate::net::{register_dial, NetStream};

/// In-memory stream pairs for scripted handshake exchanges.
///
/// The client end is handed out through the dial registry under the `"mock"`
/// network kind, addressed by port number; the server end stays with the
/// test, which pre-loads every server packet before connecting.
#[derive(Debug)]
pub(crate) struct Mock;

#[derive(Debug)]
pub(crate) struct MockStream {
    rbuf: BytesMut,
    read: Receiver<Vec<u8>>,
    write: Sender<Vec<u8>>,
    closed: bool,
}

#[derive(Debug)]
pub(crate) struct MockServer {
    port: u16,
    stream: MockStream,
}

static MOCK_STREAM_PORT: AtomicU16 = AtomicU16::new(0);

static MOCK_STREAMS: Lazy<Mutex<HashMap<u16, MockStream>>> = Lazy::new(Mutex::default);

static REGISTER_DIAL: Once = Once::new();

impl Mock {
    /// A scripted server handle whose peer is reachable by connecting to
    /// `network("mock")` + `address(server.port().to_string())`.
    pub(crate) fn stream() -> MockServer {
        REGISTER_DIAL.call_once(|| {
            register_dial(
                "mock",
                Arc::new(|address| {
                    let port: u16 = address
                        .parse()
                        .map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;

                    match MOCK_STREAMS.lock().remove(&port) {
                        Some(stream) => Ok(Box::new(stream) as Box<dyn NetStream>),
                        None => Err(io::ErrorKind::ConnectionRefused.into()),
                    }
                }),
            );
        });

        let port = MOCK_STREAM_PORT.fetch_add(1, Ordering::SeqCst) + 1;
        let (client, server) = Self::pair();

        MOCK_STREAMS.lock().insert(port, client);

        MockServer { port, stream: server }
    }

    /// A connection wired straight to a server handle, skipping the dial
    /// registry and the handshake; for exercising the packet layer alone.
    pub(crate) fn connection() -> (MySqlConnection, MockServer) {
        let (client, server) = Self::pair();

        let mut conn = MySqlConnection::new(BufStream::new(Box::new(client)), false, false, false);
        conn.mark_handshake_complete();

        (conn, MockServer { port: 0, stream: server })
    }

    fn pair() -> (MockStream, MockStream) {
        let (write_l, write_r) = crossbeam::channel::unbounded();
        let (read_r, read_l) = crossbeam::channel::unbounded();

        let left =
            MockStream { rbuf: BytesMut::new(), read: read_l, write: write_l, closed: false };

        let right =
            MockStream { rbuf: BytesMut::new(), read: write_r, write: read_r, closed: false };

        (left, right)
    }
}

impl MockServer {
    pub(crate) fn port(&self) -> u16 {
        self.port
    }

    /// Queue one framed packet for the client to read.
    pub(crate) fn write_packet(&mut self, sequence_id: u8, payload: &[u8]) {
        let mut framed = Vec::with_capacity(4 + payload.len());
        framed.extend_from_slice(&payload.len().to_le_bytes()[..3]);
        framed.push(sequence_id);
        framed.extend_from_slice(payload);

        let _ = self.stream.write.send(framed);
    }

    /// One flush worth of client bytes, frame headers included.
    pub(crate) fn read_message(&mut self) -> Vec<u8> {
        self.stream
            .read
            .recv_timeout(Duration::from_secs(5))
            .expect("expected a client message")
    }

    /// `None` once the client is gone and everything sent has been read.
    pub(crate) fn try_read_message(&mut self) -> Option<Vec<u8>> {
        self.stream.read.try_recv().ok()
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::ErrorKind::NotConnected.into());
        }

        loop {
            if !self.rbuf.is_empty() {
                let n = buf.len().min(self.rbuf.len());
                buf[..n].copy_from_slice(&self.rbuf.split_to(n));

                return Ok(n);
            }

            // nothing buffered, ask the channel for more
            let message = self
                .read
                .recv_timeout(Duration::from_secs(5))
                .map_err(|_| io::Error::from(io::ErrorKind::ConnectionAborted))?;

            self.rbuf.extend_from_slice(&message);
        }
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::ErrorKind::NotConnected.into());
        }

        let _ = self.write.send(buf.to_vec());

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl NetStream for MockStream {
    fn set_read_timeout(&mut self, _timeout: Option<Duration>) -> io::Result<()> {
        Ok(())
    }

    fn set_write_timeout(&mut self, _timeout: Option<Duration>) -> io::Result<()> {
        Ok(())
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.closed = true;

        Ok(())
    }
}
