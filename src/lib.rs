//! Client-side implementation of the [MySQL] wire protocol connection phase.
//!
//! This crate owns the hard part of a MySQL client driver: opening the
//! transport, decoding the server greeting, negotiating an authentication
//! plugin (including mid-handshake plugin switches), and producing a live,
//! fully-configured session. Query execution, result decoding, and pooling
//! are the business of the layers above.
//!
//! [MySQL]: https://dev.mysql.com/doc/internals/en/connection-phase.html
//!
#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(future_incompatible)]
#![allow(clippy::doc_markdown)]

#[macro_use]
mod error;

mod connection;
mod io;
mod net;
mod options;
mod protocol;

#[cfg(test)]
mod mock;

pub use connection::MySqlConnection;
pub use error::{Error, MySqlClientError, MySqlDatabaseError, Result};
pub use net::{register_dial, register_tls_provider, DialFn, NetStream, TlsProviderFn};
pub use options::MySqlConnectOptions;
pub use protocol::auth_plugin::{register_auth_plugin, AuthPlugin, AuthPluginFactory};
