use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::time::Duration;

mod dial;
mod tls;

pub use dial::{register_dial, DialFn};
pub(crate) use dial::dial;
pub use tls::{register_tls_provider, TlsProviderFn};
pub(crate) use tls::upgrade as tls_upgrade;

/// A bidirectional byte stream a MySQL connection can run over.
///
/// Implemented for [`TcpStream`] and [`UnixStream`]; custom transports are
/// supplied through [`register_dial`].
pub trait NetStream: Read + Write + Send {
    /// Bound the blocking time of subsequent reads. `None` blocks forever.
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()>;

    /// Bound the blocking time of subsequent writes. `None` blocks forever.
    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()>;

    /// Close both directions of the stream.
    ///
    /// Must be idempotent: the connection teardown path may run more than
    /// once.
    fn shutdown(&mut self) -> io::Result<()>;
}

impl NetStream for TcpStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_write_timeout(self, timeout)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        match TcpStream::shutdown(self, Shutdown::Both) {
            // already closed, likely by the server after a failed handshake
            Err(err) if err.kind() == io::ErrorKind::NotConnected => Ok(()),
            res => res,
        }
    }
}

#[cfg(unix)]
impl NetStream for UnixStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        UnixStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        UnixStream::set_write_timeout(self, timeout)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        match UnixStream::shutdown(self, Shutdown::Both) {
            Err(err) if err.kind() == io::ErrorKind::NotConnected => Ok(()),
            res => res,
        }
    }
}
