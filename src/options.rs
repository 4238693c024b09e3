use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

mod builder;
mod default;

/// Options which can be used to configure how a MySQL connection is opened.
///
/// Produced by a DSN/URL parser in the layer above; this crate consumes the
/// parsed value. Once [`connect`][Self::connect] begins the options are no
/// longer observable from outside the connection.
///
/// ```rust,no_run
/// # fn example() -> mysql_wire::Result<()> {
/// use mysql_wire::MySqlConnectOptions;
///
/// let conn = MySqlConnectOptions::new()
///     .address("localhost:3306")
///     .username("root")
///     .password("password")
///     .database("shop")
///     .connect()?;
/// # Ok(())
/// # }
/// ```
pub struct MySqlConnectOptions {
    pub(crate) network: String,
    pub(crate) address: String,

    pub(crate) username: String,
    pub(crate) password: Option<String>,
    pub(crate) database: Option<String>,

    pub(crate) charset: String,
    pub(crate) collation: Option<String>,

    pub(crate) connect_timeout: Option<Duration>,
    pub(crate) read_timeout: Option<Duration>,
    pub(crate) write_timeout: Option<Duration>,

    // `None` asks the server for its `max_allowed_packet` after the handshake
    pub(crate) max_allowed_packet: Option<u32>,

    pub(crate) use_tls: bool,
    pub(crate) parse_time: bool,
    pub(crate) strict: bool,
    pub(crate) enable_cleartext_plugin: bool,
    pub(crate) send_attributes: bool,

    // applied with `SET <name> = <value>` after authentication
    pub(crate) session_variables: Vec<(String, String)>,
}

impl MySqlConnectOptions {
    /// Creates a default set of options pointing at a MySQL server on
    /// `localhost:3306`, authenticating as the current OS user.
    #[must_use]
    pub fn new() -> Self {
        Self {
            network: "tcp".to_owned(),
            address: format!("{}:{}", default::HOST, default::PORT),
            username: default::username(),
            password: None,
            database: None,
            charset: default::CHARSET.to_owned(),
            collation: None,
            connect_timeout: None,
            read_timeout: None,
            write_timeout: None,
            max_allowed_packet: None,
            use_tls: false,
            parse_time: false,
            strict: false,
            enable_cleartext_plugin: false,
            send_attributes: true,
            session_variables: Vec::new(),
        }
    }

    /// Returns the network kind the connection dials (`"tcp"`, `"unix"`, or
    /// a name registered with [`register_dial`][crate::register_dial]).
    #[must_use]
    pub fn get_network(&self) -> &str {
        &self.network
    }

    /// Returns the address passed to the dial function.
    #[must_use]
    pub fn get_address(&self) -> &str {
        &self.address
    }

    /// Returns the username used for authentication.
    #[must_use]
    pub fn get_username(&self) -> &str {
        &self.username
    }

    /// Returns the password used for authentication, if one is set.
    #[must_use]
    pub fn get_password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Returns the initial database name, if one is set.
    #[must_use]
    pub fn get_database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Returns `true` when the configured transport provides a secure
    /// channel without further negotiation: TLS was requested, or the
    /// connection runs over a unix socket.
    #[must_use]
    pub(crate) fn is_secure(&self) -> bool {
        self.use_tls || self.network == "unix"
    }

    pub(crate) fn host(&self) -> &str {
        // the part certificate verification cares about
        self.address.rsplit_once(':').map_or(self.address.as_str(), |(host, _)| host)
    }
}

impl Default for MySqlConnectOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MySqlConnectOptions {
    fn clone(&self) -> Self {
        Self {
            network: self.network.clone(),
            address: self.address.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
            charset: self.charset.clone(),
            collation: self.collation.clone(),
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            write_timeout: self.write_timeout,
            max_allowed_packet: self.max_allowed_packet,
            use_tls: self.use_tls,
            parse_time: self.parse_time,
            strict: self.strict,
            enable_cleartext_plugin: self.enable_cleartext_plugin,
            send_attributes: self.send_attributes,
            session_variables: self.session_variables.clone(),
        }
    }
}

impl Debug for MySqlConnectOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlConnectOptions")
            .field("network", &self.network)
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("charset", &self.charset)
            .field("use_tls", &self.use_tls)
            .finish_non_exhaustive()
    }
}
