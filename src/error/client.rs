use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};

use crate::error::Error;

/// An authentication failure detected on the client, before or instead of a
/// server ERR packet.
#[derive(Debug)]
#[non_exhaustive]
pub enum MySqlClientError {
    /// The server switched us to a plugin that is not in the registry.
    UnknownAuthPlugin(String),

    /// A plugin failed while computing an authentication response.
    AuthPlugin {
        plugin: &'static str,
        source: Box<dyn StdError + 'static + Send + Sync>,
    },

    /// A plugin demands a secure channel (TLS or a unix socket) that this
    /// connection does not have.
    InsecureChannel { plugin: &'static str },

    /// The server sent an empty payload where a packet was required.
    EmptyPacket { context: &'static str },
}

impl MySqlClientError {
    pub(crate) fn auth_plugin(
        plugin: &'static str,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::AuthPlugin { plugin, source: source.into() }
    }
}

impl Display for MySqlClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAuthPlugin(name) => write!(f, "unknown authentication plugin: {name}"),

            Self::AuthPlugin { plugin, source } => {
                write!(f, "authentication plugin '{plugin}' reported error: {source}")
            }

            Self::InsecureChannel { plugin } => write!(
                f,
                "authentication plugin '{plugin}' requires a secure connection (TLS or unix socket)"
            ),

            Self::EmptyPacket { context } => write!(f, "received no bytes for {context}"),
        }
    }
}

impl StdError for MySqlClientError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::AuthPlugin { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

impl From<MySqlClientError> for Error {
    fn from(err: MySqlClientError) -> Self {
        Self::Client(Box::new(err))
    }
}
