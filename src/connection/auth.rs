use bytes::Bytes;

use crate::error::{MySqlClientError, Result};
use crate::options::MySqlConnectOptions;
use crate::protocol::auth_plugin::{self, AuthPlugin, DEFAULT_PLUGIN_NAME};
use crate::protocol::connect::Handshake;
use crate::protocol::{AuthReply, AuthResponse};

use super::MySqlConnection;

// the longest legitimate exchange is four rounds; a server still switching
// or demanding more data past this bound is not converging
const MAX_AUTH_ROUNDS: usize = 8;

/// What the negotiator settled on for the handshake response packet.
pub(super) struct Negotiation {
    /// Plugin name to advertise; not necessarily what the greeting declared.
    pub(super) plugin_name: String,

    /// Initial auth response; empty when the greeting named a plugin we do
    /// not recognize and the server is expected to switch us.
    pub(super) initial_response: Vec<u8>,

    pub(super) plugin: Box<dyn AuthPlugin>,

    /// The greeting challenge as received, before any plugin touched it; a
    /// legacy switch retries against these exact bytes.
    pub(super) original_challenge: Bytes,
}

/// Select the plugin for the handshake response.
///
/// The greeting's declared name wins if it is in the registry. An
/// unrecognized name is not an error: the default plugin is advertised with
/// an empty response, and the server is expected to send an auth-switch
/// before any plugin computation is needed.
pub(super) fn negotiate(
    handshake: &Handshake,
    options: &MySqlConnectOptions,
) -> Result<Negotiation> {
    let declared = handshake
        .auth_plugin_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_PLUGIN_NAME);

    let original_challenge = handshake.auth_plugin_data.clone();

    if let Some(factory) = auth_plugin::lookup(declared) {
        let mut plugin = (*factory)(options);
        let initial_response = plugin.next(&handshake.auth_plugin_data)?.unwrap_or_default();

        return Ok(Negotiation {
            plugin_name: declared.to_owned(),
            initial_response,
            plugin,
            original_challenge,
        });
    }

    tracing::debug!(
        plugin = declared,
        "unrecognized authentication plugin in greeting; falling back to {}",
        DEFAULT_PLUGIN_NAME
    );

    let plugin = default_plugin(options)?;

    Ok(Negotiation {
        plugin_name: DEFAULT_PLUGIN_NAME.to_owned(),
        initial_response: Vec::new(),
        plugin,
        original_challenge,
    })
}

fn default_plugin(options: &MySqlConnectOptions) -> Result<Box<dyn AuthPlugin>> {
    let factory = auth_plugin::lookup(DEFAULT_PLUGIN_NAME)
        .ok_or_else(|| err_protocol!("default authentication plugin is not registered"))?;

    Ok((*factory)(options))
}

impl MySqlConnection {
    /// Drive the exchange after the handshake response until the server
    /// settles it: OK ends in success, ERR surfaces from the stream layer,
    /// switch and more-data re-enter the current or a replacement plugin.
    pub(super) fn handle_auth_result(
        &mut self,
        mut plugin: Box<dyn AuthPlugin>,
        original_challenge: &Bytes,
        options: &MySqlConnectOptions,
    ) -> Result<()> {
        for _ in 0..MAX_AUTH_ROUNDS {
            let packet = self.recv_packet()?;

            match packet.decode_with::<AuthReply, _>(self.capabilities)? {
                AuthReply::Ok(ok) => {
                    self.status = ok.status;

                    return Ok(());
                }

                AuthReply::MoreData(data) => {
                    if let Some(data) = plugin.next(&data)? {
                        self.write_packet(AuthResponse { data })?;
                        self.flush()?;
                    }

                    // nothing to send; the server's verdict is on its way
                }

                AuthReply::Switch(switch) => {
                    let data = match switch.plugin_name {
                        Some(name) => {
                            let factory = auth_plugin::lookup(&name).ok_or_else(|| {
                                MySqlClientError::UnknownAuthPlugin(name.to_string())
                            })?;

                            plugin = (*factory)(options);

                            plugin.next(&switch.data)?.unwrap_or_default()
                        }

                        // legacy switch: the default plugin retries against
                        // the original greeting challenge
                        None => {
                            plugin = default_plugin(options)?;

                            plugin.next(original_challenge)?.unwrap_or_default()
                        }
                    };

                    self.write_packet(AuthResponse { data })?;
                    self.flush()?;
                }
            }
        }

        Err(err_protocol!(
            "authentication did not terminate after {} rounds",
            MAX_AUTH_ROUNDS
        ))
    }
}
