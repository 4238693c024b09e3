use memchr::memchr;
use sha1::{Digest, Sha1};

use crate::error::Result;
use crate::options::MySqlConnectOptions;
use crate::protocol::auth_plugin::{xor_eq, AuthPlugin};

/// The pre-8.0 default authentication method: a SHA-1 challenge/response.
///
/// https://dev.mysql.com/doc/internals/en/secure-password-authentication.html
/// https://mariadb.com/kb/en/connection/#mysql_native_password-plugin
///
#[derive(Debug)]
pub(crate) struct NativePasswordPlugin {
    password: String,
}

impl NativePasswordPlugin {
    pub(crate) fn new(options: &MySqlConnectOptions) -> Self {
        Self { password: options.get_password().unwrap_or_default().to_owned() }
    }
}

impl AuthPlugin for NativePasswordPlugin {
    fn name(&self) -> &'static str {
        "mysql_native_password"
    }

    fn next(&mut self, data: &[u8]) -> Result<Option<Vec<u8>>> {
        if self.password.is_empty() {
            // empty password => empty scramble
            return Ok(Some(Vec::new()));
        }

        // the nonce for mysql_native_password is (optionally) NUL-terminated
        let end = memchr(b'\0', data).unwrap_or(data.len());

        Ok(Some(scramble_sha1(&self.password, &data[..end])))
    }
}

// SHA1( password ) ^ SHA1( nonce + SHA1( SHA1( password ) ) )
fn scramble_sha1(password: &str, nonce: &[u8]) -> Vec<u8> {
    let mut hasher = Sha1::new();

    hasher.update(password);

    // SHA1( password )
    let mut pw_sha1 = hasher.finalize_reset();

    hasher.update(&pw_sha1);

    // SHA1( SHA1( password ) )
    let pw_sha1_sha1 = hasher.finalize_reset();

    hasher.update(nonce);
    hasher.update(pw_sha1_sha1);

    // SHA1( nonce + SHA1( SHA1( password ) ) )
    let nonce_pw_sha1_sha1 = hasher.finalize();

    xor_eq(&mut pw_sha1, &nonce_pw_sha1_sha1);

    pw_sha1.to_vec()
}
