use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::error::MySqlClientError;
use crate::options::MySqlConnectOptions;
use crate::protocol::auth_plugin::{rsa, xor_eq, AuthPlugin};

const AUTH_SUCCESS: u8 = 0x03;
const AUTH_CONTINUE: u8 = 0x04;

/// SHA-256 authentication with server-side caching.
///
/// After the first successful authentication for an account the server only
/// needs the fast scramble; a cache miss falls back to a full exchange, over
/// the secure channel directly or through an RSA key round-trip.
///
/// https://dev.mysql.com/doc/refman/8.0/en/caching-sha2-pluggable-authentication.html
/// https://mariadb.com/kb/en/caching_sha2_password-authentication-plugin/
///
#[derive(Debug)]
pub(crate) struct CachingSha2Plugin {
    password: String,
    secure: bool,

    // the greeting (or switch) challenge, kept for the full-auth exchange
    nonce: Vec<u8>,
    engaged: bool,
}

impl CachingSha2Plugin {
    pub(crate) fn new(options: &MySqlConnectOptions) -> Self {
        Self {
            password: options.get_password().unwrap_or_default().to_owned(),
            secure: options.is_secure(),
            nonce: Vec::new(),
            engaged: false,
        }
    }
}

impl AuthPlugin for CachingSha2Plugin {
    fn name(&self) -> &'static str {
        "caching_sha2_password"
    }

    fn next(&mut self, data: &[u8]) -> Result<Option<Vec<u8>>> {
        if !self.engaged {
            self.engaged = true;
            self.nonce = data.to_vec();

            if self.password.is_empty() {
                // empty password => no scramble
                return Ok(Some(Vec::new()));
            }

            return Ok(Some(scramble_sha256(&self.password, data)));
        }

        match data.first() {
            // fast-auth path succeeded; nothing to send, an OK follows
            Some(&AUTH_SUCCESS) if data.len() == 1 => Ok(None),

            // full authentication required
            Some(&AUTH_CONTINUE) if data.len() == 1 => {
                if self.secure {
                    // the channel is already encrypted; send the password in the clear
                    let mut response = self.password.clone().into_bytes();
                    response.push(0);

                    Ok(Some(response))
                } else {
                    // ask the server for its RSA public key
                    Ok(Some(vec![0x02]))
                }
            }

            // anything else is the requested RSA public key
            Some(_) => Ok(Some(rsa::encrypt(self.name(), data, &self.password, &self.nonce)?)),

            None => Err(MySqlClientError::EmptyPacket {
                context: "caching_sha2_password auth-more-data",
            }
            .into()),
        }
    }
}

// SHA256( password ) ^ SHA256( nonce + SHA256( SHA256( password ) ) )
fn scramble_sha256(password: &str, nonce: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();

    hasher.update(password);

    // SHA256( password )
    let mut pw_sha2 = hasher.finalize_reset();

    hasher.update(&pw_sha2);

    // SHA256( SHA256( password ) )
    let pw_sha2_sha2 = hasher.finalize_reset();

    hasher.update(pw_sha2_sha2);
    hasher.update(nonce);

    // SHA256( SHA256( SHA256( password ) ) + nonce )
    let nonce_pw_sha2_sha2 = hasher.finalize();

    xor_eq(&mut pw_sha2, &nonce_pw_sha2_sha2);

    pw_sha2.to_vec()
}
