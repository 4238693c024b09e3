use crate::error::Result;
use crate::options::MySqlConnectOptions;
use crate::protocol::auth_plugin::AuthPlugin;

/// Sends the password as-is, NUL-terminated.
///
/// Only ever constructed once the cleartext gate and the secure-channel
/// prerequisite have both been checked; see the registry.
///
/// https://dev.mysql.com/doc/refman/8.0/en/cleartext-pluggable-authentication.html
///
#[derive(Debug)]
pub(crate) struct ClearPasswordPlugin {
    password: String,
}

impl ClearPasswordPlugin {
    pub(crate) fn new(options: &MySqlConnectOptions) -> Self {
        Self { password: options.get_password().unwrap_or_default().to_owned() }
    }
}

impl AuthPlugin for ClearPasswordPlugin {
    fn name(&self) -> &'static str {
        "mysql_clear_password"
    }

    fn next(&mut self, _data: &[u8]) -> Result<Option<Vec<u8>>> {
        // the protocol says to ignore any challenge data
        let mut response = self.password.clone().into_bytes();
        response.push(0);

        Ok(Some(response))
    }
}
