use std::time::Duration;

use crate::connection::MySqlConnection;
use crate::error::Result;
use crate::options::MySqlConnectOptions;

impl MySqlConnectOptions {
    /// Sets the network kind the connection dials.
    ///
    /// `"tcp"` and `"unix"` are built in; other names must be registered
    /// with [`register_dial`][crate::register_dial] first.
    #[must_use]
    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    /// Sets the address passed to the dial function: `host:port` for TCP,
    /// a filesystem path for unix sockets.
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Sets the username used for authentication.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Sets the password used for authentication.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the initial database for the session.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Sets the character set for the session, applied with `SET NAMES`
    /// after the handshake. Defaults to `utf8mb4`.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Sets the collation paired with the character set.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Bounds the time spent establishing the network stream.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Bounds the blocking time of each read from the server.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Bounds the blocking time of each write to the server.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Overrides `max_allowed_packet` instead of asking the server for it
    /// after the handshake.
    #[must_use]
    pub fn max_allowed_packet(mut self, max: u32) -> Self {
        self.max_allowed_packet = Some(max);
        self
    }

    /// Requests a TLS upgrade before authenticating.
    ///
    /// Requires a provider registered with
    /// [`register_tls_provider`][crate::register_tls_provider], and a server
    /// that advertises TLS support.
    #[must_use]
    pub fn use_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Asks the session to surface temporal values for client-side parsing.
    /// Copied onto the session verbatim; this crate does not interpret it.
    #[must_use]
    pub fn parse_time(mut self, parse_time: bool) -> Self {
        self.parse_time = parse_time;
        self
    }

    /// Marks the session strict. Copied onto the session verbatim.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Permits the `mysql_clear_password` plugin.
    ///
    /// Even when enabled, the plugin refuses to send the password over an
    /// insecure channel.
    #[must_use]
    pub fn enable_cleartext_plugin(mut self, enable: bool) -> Self {
        self.enable_cleartext_plugin = enable;
        self
    }

    /// Controls whether default connection attributes (`_client_name`,
    /// `_client_version`) accompany the handshake response. On by default.
    #[must_use]
    pub fn send_attributes(mut self, send: bool) -> Self {
        self.send_attributes = send;
        self
    }

    /// Adds a session variable applied with `SET <name> = <value>` once
    /// authentication completes. A failure to apply closes the session.
    #[must_use]
    pub fn session_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.session_variables.push((name.into(), value.into()));
        self
    }

    /// Opens a connection using these options.
    pub fn connect(&self) -> Result<MySqlConnection> {
        MySqlConnection::establish(self)
    }
}
