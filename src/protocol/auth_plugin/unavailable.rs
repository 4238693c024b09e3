use crate::error::{MySqlClientError, Result};
use crate::protocol::auth_plugin::AuthPlugin;

/// Why a plugin cannot run on this connection.
#[derive(Debug)]
pub(crate) enum Unmet {
    /// The plugin is gated off in the connection options.
    Disabled,

    /// The plugin refuses to run without TLS or a unix socket.
    InsecureChannel,
}

/// Stands in for a plugin whose prerequisites this connection does not meet.
///
/// Substituted by the registry so the failure surfaces as an authentication
/// error at the moment the server actually selects the plugin, not before.
#[derive(Debug)]
pub(crate) struct UnavailablePlugin {
    name: &'static str,
    unmet: Unmet,
}

impl UnavailablePlugin {
    pub(crate) fn new(name: &'static str, unmet: Unmet) -> Self {
        Self { name, unmet }
    }
}

impl AuthPlugin for UnavailablePlugin {
    fn name(&self) -> &'static str {
        self.name
    }

    fn next(&mut self, _data: &[u8]) -> Result<Option<Vec<u8>>> {
        Err(match self.unmet {
            Unmet::Disabled => MySqlClientError::auth_plugin(
                self.name,
                "plugin is disabled; enable it in the connection options",
            ),

            Unmet::InsecureChannel => MySqlClientError::InsecureChannel { plugin: self.name },
        }
        .into())
    }
}
