use std::collections::HashMap;
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::net::NetStream;

/// Establishes the network stream for one connection attempt.
///
/// Receives the configured address verbatim (for the built-in kinds this is
/// `host:port` or a socket path).
pub type DialFn = Arc<dyn Fn(&str) -> io::Result<Box<dyn NetStream>> + Send + Sync>;

static DIALS: Lazy<RwLock<HashMap<String, DialFn>>> = Lazy::new(RwLock::default);

/// Register a custom dial function under a network-kind name.
///
/// The connection options select it with
/// [`network`][crate::MySqlConnectOptions::network]. Registering over an
/// existing name replaces the previous function. May be called concurrently
/// with connection attempts.
pub fn register_dial(network: &str, dial: DialFn) {
    DIALS.write().insert(network.to_owned(), dial);
}

pub(crate) fn dial(
    network: &str,
    address: &str,
    connect_timeout: Option<Duration>,
) -> Result<Box<dyn NetStream>> {
    if let Some(dial) = DIALS.read().get(network).cloned() {
        return Ok((*dial)(address)?);
    }

    match network {
        "tcp" | "tcp4" | "tcp6" => dial_tcp(address, connect_timeout),

        #[cfg(unix)]
        "unix" => Ok(Box::new(UnixStream::connect(address)?)),

        _ => Err(Error::configuration(format!("unknown network kind: {network:?}"))),
    }
}

fn dial_tcp(address: &str, connect_timeout: Option<Duration>) -> Result<Box<dyn NetStream>> {
    let stream = match connect_timeout {
        Some(timeout) => {
            // `connect_timeout` takes a single resolved address; try each in
            // turn like `TcpStream::connect` itself would
            let mut last_err = None;

            let mut stream = None;
            for addr in address.to_socket_addrs()? {
                match TcpStream::connect_timeout(&addr, timeout) {
                    Ok(s) => {
                        stream = Some(s);
                        break;
                    }
                    Err(err) => last_err = Some(err),
                }
            }

            match (stream, last_err) {
                (Some(stream), _) => stream,
                (None, Some(err)) => return Err(err.into()),
                (None, None) => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "address resolved to no addresses",
                    )
                    .into())
                }
            }
        }

        None => TcpStream::connect(address)?,
    };

    stream.set_nodelay(true)?;

    Ok(Box::new(stream))
}
