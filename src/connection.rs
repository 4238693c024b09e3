use std::fmt::{self, Debug, Formatter};

use bytestring::ByteString;

use crate::io::BufStream;
use crate::protocol::response::Status;
use crate::protocol::Capabilities;

mod auth;
mod close;
mod command;
mod connect;
mod stream;

// what we can do, before intersecting with what the server advertises
const CLIENT_CAPABILITIES: Capabilities = Capabilities::LONG_PASSWORD
    .union(Capabilities::LONG_FLAG)
    .union(Capabilities::IGNORE_SPACE)
    .union(Capabilities::PROTOCOL_41)
    .union(Capabilities::TRANSACTIONS)
    .union(Capabilities::SECURE_CONNECTION)
    .union(Capabilities::PLUGIN_AUTH)
    .union(Capabilities::PLUGIN_AUTH_LENENC_DATA)
    .union(Capabilities::DEPRECATE_EOF);

/// The charset byte sent in the handshake response: `utf8mb4_general_ci`.
///
/// This is the session default until `SET NAMES` runs, and ensures error
/// messages received during the handshake are encoded sanely.
const INITIAL_CHARSET: u8 = 45;

/// A live, authenticated connection to a MySQL database server.
///
/// Produced by [`MySqlConnectOptions::connect`][crate::MySqlConnectOptions::connect];
/// never observable in a half-established state. The query layer above
/// drives it through [`execute`][Self::execute], [`ping`][Self::ping], and
/// [`close`][Self::close].
pub struct MySqlConnection {
    stream: BufStream,

    capabilities: Capabilities,
    sequence_id: u8,

    connection_id: u32,
    server_version: ByteString,
    status: Status,

    // TLS or a unix socket; some auth plugins demand this
    secure: bool,

    handshake_complete: bool,
    closed: bool,

    max_allowed_packet: u32,
    max_write_size: u32,

    parse_time: bool,
    strict: bool,
}

impl MySqlConnection {
    pub(crate) fn new(stream: BufStream, secure: bool, parse_time: bool, strict: bool) -> Self {
        Self {
            stream,
            capabilities: CLIENT_CAPABILITIES,
            sequence_id: 0,
            connection_id: 0,
            server_version: ByteString::new(),
            status: Status::empty(),
            secure,
            handshake_complete: false,
            closed: false,
            max_allowed_packet: 0xff_ff_ff,
            max_write_size: 0xff_ff_ff - 1,
            parse_time,
            strict,
        }
    }

    /// The connection id the server assigned in its greeting.
    #[must_use]
    pub fn connection_id(&self) -> u32 {
        self.connection_id
    }

    /// The version string the server announced in its greeting.
    #[must_use]
    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    /// The negotiated `max_allowed_packet`: the configured override, or the
    /// value discovered from the server after authentication.
    #[must_use]
    pub fn max_allowed_packet(&self) -> u32 {
        self.max_allowed_packet
    }

    /// The working bound for a single outgoing logical payload; never
    /// exceeds the protocol's hard per-packet maximum.
    #[must_use]
    pub fn max_write_size(&self) -> u32 {
        self.max_write_size
    }

    /// Whether temporal values should be parsed client-side, copied verbatim
    /// from the connection options for the query layer.
    #[must_use]
    pub fn parse_time(&self) -> bool {
        self.parse_time
    }

    /// Whether the session was configured strict, copied verbatim from the
    /// connection options for the query layer.
    #[must_use]
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Whether the session runs over a secure channel (TLS or a unix
    /// socket).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Whether the server reported an open transaction in its most recent
    /// status flags.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.status.contains(Status::IN_TRANS)
    }

    #[cfg(test)]
    pub(crate) fn mark_handshake_complete(&mut self) {
        self.handshake_complete = true;
    }
}

impl Debug for MySqlConnection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlConnection")
            .field("connection_id", &self.connection_id)
            .field("server_version", &self.server_version)
            .finish_non_exhaustive()
    }
}

impl Drop for MySqlConnection {
    fn drop(&mut self) {
        self.close_hard();
    }
}
