use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::net::NetStream;

/// Wraps an established stream in TLS.
///
/// Receives the plain stream and the configured host name (for certificate
/// verification). Certificate material and verification policy are the
/// provider's business; this crate only decides *when* the upgrade happens.
pub type TlsProviderFn =
    Arc<dyn Fn(Box<dyn NetStream>, &str) -> Result<Box<dyn NetStream>> + Send + Sync>;

static TLS_PROVIDER: Lazy<RwLock<Option<TlsProviderFn>>> = Lazy::new(RwLock::default);

/// Register the process-wide TLS provider used when connection options
/// request TLS.
pub fn register_tls_provider(provider: TlsProviderFn) {
    *TLS_PROVIDER.write() = Some(provider);
}

pub(crate) fn upgrade(stream: Box<dyn NetStream>, host: &str) -> Result<Box<dyn NetStream>> {
    let provider = TLS_PROVIDER
        .read()
        .clone()
        .ok_or_else(|| Error::tls("TLS was requested but no TLS provider is registered"))?;

    (*provider)(stream, host)
}
