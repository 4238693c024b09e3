use crate::error::Result;
use crate::io::{BufMutExt, Encode};
use crate::protocol::connect::SslRequest;
use crate::protocol::Capabilities;

// https://dev.mysql.com/doc/internals/en/connection-phase-packets.html#packet-Protocol::HandshakeResponse
// https://mariadb.com/kb/en/connection/#client-handshake-response

#[derive(Debug)]
pub(crate) struct HandshakeResponse<'a> {
    pub(crate) database: Option<&'a str>,

    /// Max size of a command packet that the client wants to send to the server
    pub(crate) max_packet_size: u32,

    /// Default character set for the connection
    pub(crate) charset: u8,

    /// Name of the SQL account which client wants to log in
    pub(crate) username: &'a str,

    /// Authentication method used by the client, as advertised to the server
    pub(crate) auth_plugin_name: &'a str,

    /// Opaque authentication response; empty when the negotiator fell back
    /// from an unrecognized plugin
    pub(crate) auth_response: &'a [u8],
}

impl Encode<'_, Capabilities> for HandshakeResponse<'_> {
    fn encode_with(&self, buf: &mut Vec<u8>, context: Capabilities) -> Result<()> {
        // NOTE: the first half of this packet is identical to the SSL Request packet
        SslRequest { max_packet_size: self.max_packet_size, charset: self.charset }
            .encode_with(buf, context)?;

        buf.put_str_nul(self.username);

        if context.contains(Capabilities::PLUGIN_AUTH_LENENC_DATA) {
            buf.put_bytes_lenenc(self.auth_response);
        } else if context.contains(Capabilities::SECURE_CONNECTION) {
            let len = u8::try_from(self.auth_response.len()).map_err(|_| {
                err_protocol!("auth_response.len() too long: {}", self.auth_response.len())
            })?;

            buf.push(len);
            buf.extend_from_slice(self.auth_response);
        } else {
            buf.push(0);
        }

        if context.contains(Capabilities::CONNECT_WITH_DB) {
            if let Some(database) = self.database {
                buf.put_str_nul(database);
            } else {
                buf.push(0);
            }
        }

        if context.contains(Capabilities::PLUGIN_AUTH) {
            buf.put_str_nul(self.auth_plugin_name);
        }

        if context.contains(Capabilities::CONNECT_ATTRS) {
            encode_attributes(buf);
        }

        Ok(())
    }
}

// https://dev.mysql.com/doc/refman/8.0/en/performance-schema-connection-attribute-tables.html
fn encode_attributes(buf: &mut Vec<u8>) {
    let mut attributes = Vec::new();

    for (key, value) in [
        ("_client_name", env!("CARGO_PKG_NAME")),
        ("_client_version", env!("CARGO_PKG_VERSION")),
    ] {
        attributes.put_str_lenenc(key);
        attributes.put_str_lenenc(value);
    }

    buf.put_uint_lenenc(attributes.len() as u64);
    buf.extend_from_slice(&attributes);
}
