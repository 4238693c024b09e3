use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::io;
use std::result::Result as StdResult;

use crate::protocol::response::ErrPacket;

/// A specialized `Result` type for this crate.
pub type Result<T> = StdResult<T, Error>;

// Convenience type alias for internal usage.
pub(crate) type BoxDynError = Box<dyn StdError + 'static + Send + Sync>;

/// Represents all the ways opening a MySQL connection can fail.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Error communicating with the database server.
    ///
    /// This includes read and write timeouts; inspect the
    /// [`kind`][io::Error::kind] of the inner error to distinguish them.
    #[error("error communicating with the server: {0}")]
    Io(#[from] io::Error),

    /// Error returned from the database server.
    #[error("error returned from database: {0}")]
    Database(#[source] Box<MySqlDatabaseError>),

    /// Error detected on the client while negotiating authentication.
    #[error("error negotiating authentication: {0}")]
    Client(#[source] Box<MySqlClientError>),

    /// Error occurred while attempting to establish a TLS connection.
    #[error("error occurred while attempting to establish a TLS connection: {0}")]
    Tls(#[source] BoxDynError),

    /// Unexpected or invalid data encountered while communicating with the
    /// database server.
    ///
    /// This indicates a corrupted stream, a server speaking an incompatible
    /// protocol revision, or a bug in this crate.
    #[error("encountered unexpected or invalid data: {0}")]
    Protocol(String),

    /// Error in the connection configuration, detected either before dialing
    /// or while applying post-connect parameters.
    #[error("error in connection configuration: {0}")]
    Configuration(#[source] BoxDynError),
}

impl Error {
    #[inline]
    pub(crate) fn tls(err: impl Into<BoxDynError>) -> Self {
        Self::Tls(err.into())
    }

    #[inline]
    pub(crate) fn configuration(err: impl Into<BoxDynError>) -> Self {
        Self::Configuration(err.into())
    }
}

// Format an error message as a `Protocol` error
macro_rules! err_protocol {
    ($expr:expr) => {
        $crate::error::Error::Protocol($expr.into())
    };

    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::Error::Protocol(format!($fmt, $($arg)*))
    };
}

mod client;

pub use client::MySqlClientError;

/// An error returned from the MySQL database server.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug)]
pub struct MySqlDatabaseError(pub(crate) ErrPacket);

impl MySqlDatabaseError {
    pub(crate) fn new(code: u16, message: &str) -> Self {
        Self(ErrPacket::new(code, message))
    }

    /// The server-assigned error code.
    #[must_use]
    pub fn code(&self) -> u16 {
        self.0.error_code
    }

    /// The primary, human-readable error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0.error_message
    }
}

impl Display for MySqlDatabaseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.0.sql_state {
            Some(state) => write!(f, "{} ({}): {}", self.0.error_code, state, self.message()),
            None => write!(f, "{}: {}", self.0.error_code, self.message()),
        }
    }
}

impl StdError for MySqlDatabaseError {}

impl From<MySqlDatabaseError> for Error {
    fn from(err: MySqlDatabaseError) -> Self {
        Self::Database(Box::new(err))
    }
}
