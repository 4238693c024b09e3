use crate::error::Result;
use crate::options::MySqlConnectOptions;
use crate::protocol::auth_plugin::{rsa, AuthPlugin};

/// SHA-256 authentication without server-side caching.
///
/// Every connection performs the full exchange: the password travels in the
/// clear over a secure channel, or RSA-encrypted after a key round-trip.
///
/// https://dev.mysql.com/doc/refman/8.0/en/sha256-pluggable-authentication.html
/// https://mariadb.com/kb/en/sha256_password-plugin/
///
#[derive(Debug)]
pub(crate) struct Sha256PasswordPlugin {
    password: String,
    secure: bool,
    nonce: Vec<u8>,
}

impl Sha256PasswordPlugin {
    pub(crate) fn new(options: &MySqlConnectOptions) -> Self {
        Self {
            password: options.get_password().unwrap_or_default().to_owned(),
            secure: options.is_secure(),
            nonce: Vec::new(),
        }
    }
}

impl AuthPlugin for Sha256PasswordPlugin {
    fn name(&self) -> &'static str {
        "sha256_password"
    }

    fn next(&mut self, data: &[u8]) -> Result<Option<Vec<u8>>> {
        if self.nonce.is_empty() {
            self.nonce = data.to_vec();

            if self.password.is_empty() {
                return Ok(Some(Vec::new()));
            }

            if self.secure {
                let mut response = self.password.clone().into_bytes();
                response.push(0);

                return Ok(Some(response));
            }

            // ask the server for its RSA public key
            return Ok(Some(vec![0x01]));
        }

        let rsa_pub_key = data;

        Ok(Some(rsa::encrypt(self.name(), rsa_pub_key, &self.password, &self.nonce)?))
    }
}
