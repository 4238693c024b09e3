use std::str::from_utf8;

use rsa::pkcs8::DecodePublicKey;
use rsa::{Oaep, RsaPublicKey};

use crate::error::{MySqlClientError, Result};
use crate::protocol::auth_plugin::xor_eq;

/// Encrypt the password with the server's RSA public key for the full-auth
/// paths of `sha256_password` and `caching_sha2_password`.
///
/// The key arrives as a PKCS#8 PEM blob in an auth-more-data packet; the
/// password is NUL-terminated and XOR-ed with the nonce before encryption.
pub(super) fn encrypt(
    plugin: &'static str,
    key: &[u8],
    password: &str,
    nonce: &[u8],
) -> Result<Vec<u8>> {
    let mut pass = password.as_bytes().to_vec();
    pass.push(0);

    xor_eq(&mut pass, nonce);

    let pem = from_utf8(key).map_err(|err| MySqlClientError::auth_plugin(plugin, err))?;

    let public = RsaPublicKey::from_public_key_pem(pem)
        .map_err(|err| MySqlClientError::auth_plugin(plugin, err.to_string()))?;

    public
        .encrypt(&mut rand::thread_rng(), Oaep::new::<sha1::Sha1>(), &pass)
        .map_err(|err| MySqlClientError::auth_plugin(plugin, err.to_string()).into())
}
