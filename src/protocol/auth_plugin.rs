use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::Result;
use crate::options::MySqlConnectOptions;

mod caching_sha2;
mod clear;
mod native;
mod rsa;
mod sha256;
mod unavailable;

pub(crate) use caching_sha2::CachingSha2Plugin;
pub(crate) use clear::ClearPasswordPlugin;
pub(crate) use native::NativePasswordPlugin;
pub(crate) use sha256::Sha256PasswordPlugin;
pub(crate) use unavailable::{Unmet, UnavailablePlugin};

/// Plugin name assumed when the server declares none, and advertised when
/// the declared plugin is not in the registry.
pub(crate) const DEFAULT_PLUGIN_NAME: &str = "mysql_native_password";

/// One authentication method, instantiated per connection attempt.
///
/// The first call to [`next`][Self::next] receives the full challenge from
/// the greeting (or from an auth-switch request); later calls receive the
/// payload of each auth-more-data packet. `Ok(Some(bytes))` is sent to the
/// server as-is, `Ok(None)` means nothing to send, keep reading.
pub trait AuthPlugin: 'static + Debug + Send {
    fn name(&self) -> &'static str;

    fn next(&mut self, data: &[u8]) -> Result<Option<Vec<u8>>>;
}

/// Constructs a plugin instance for one connection attempt.
pub type AuthPluginFactory =
    Arc<dyn Fn(&MySqlConnectOptions) -> Box<dyn AuthPlugin> + Send + Sync>;

static PLUGINS: Lazy<RwLock<HashMap<String, AuthPluginFactory>>> = Lazy::new(|| {
    let mut plugins = HashMap::new();

    builtin(&mut plugins, "mysql_native_password", |options| {
        Box::new(NativePasswordPlugin::new(options))
    });

    builtin(&mut plugins, "caching_sha2_password", |options| {
        Box::new(CachingSha2Plugin::new(options))
    });

    builtin(&mut plugins, "sha256_password", |options| {
        Box::new(Sha256PasswordPlugin::new(options))
    });

    builtin(&mut plugins, "mysql_clear_password", |options| {
        if !options.enable_cleartext_plugin {
            return Box::new(UnavailablePlugin::new("mysql_clear_password", Unmet::Disabled));
        }

        if !options.is_secure() {
            return Box::new(UnavailablePlugin::new(
                "mysql_clear_password",
                Unmet::InsecureChannel,
            ));
        }

        Box::new(ClearPasswordPlugin::new(options))
    });

    RwLock::new(plugins)
});

fn builtin(
    plugins: &mut HashMap<String, AuthPluginFactory>,
    name: &str,
    factory: fn(&MySqlConnectOptions) -> Box<dyn AuthPlugin>,
) {
    plugins.insert(name.to_owned(), Arc::new(factory));
}

/// Register an authentication plugin under a name the server may declare.
///
/// Registering over an existing name (including a built-in) replaces the
/// previous factory. May be called concurrently with connection attempts.
pub fn register_auth_plugin(name: &str, factory: AuthPluginFactory) {
    PLUGINS.write().insert(name.to_owned(), factory);
}

pub(crate) fn lookup(name: &str) -> Option<AuthPluginFactory> {
    PLUGINS.read().get(name).cloned()
}

// XOR(x, y)
// If len(y) < len(x), wrap around inside y
fn xor_eq(x: &mut [u8], y: &[u8]) {
    let y_len = y.len();

    for i in 0..x.len() {
        x[i] ^= y[i % y_len];
    }
}
