use std::cmp::max;

use bytes::{Buf, Bytes};
use bytestring::ByteString;
use memchr::memchr;

use crate::error::Result;
use crate::io::{BufExt, Decode};
use crate::protocol::response::Status;
use crate::protocol::Capabilities;

// bytes the greeting must still hold after the server version string:
// connection id (4), first challenge fragment (8), filler (1), capability
// flags lower (2), charset (1), status (2), capability flags upper (2),
// challenge length (1), reserved (10)
const FIXED_TAIL_LEN: usize = 31;

/// The initial greeting the server sends after the stream opens.
///
/// https://dev.mysql.com/doc/internals/en/connection-phase-packets.html#packet-Protocol::Handshake
/// https://mariadb.com/kb/en/connection/#initial-handshake-packet
#[derive(Debug)]
pub(crate) struct Handshake {
    pub(crate) protocol_version: u8,
    pub(crate) server_version: ByteString,
    pub(crate) connection_id: u32,
    pub(crate) capabilities: Capabilities,
    #[allow(dead_code)]
    pub(crate) charset: u8,
    pub(crate) status: Status,

    // both wire fragments concatenated, trailing NUL stripped
    pub(crate) auth_plugin_data: Bytes,

    // empty or absent means "assume the default plugin"
    pub(crate) auth_plugin_name: Option<ByteString>,
}

impl Decode<'_> for Handshake {
    fn decode_with(mut buf: Bytes, _: ()) -> Result<Self> {
        if buf.is_empty() {
            return Err(err_protocol!("handshake packet is empty"));
        }

        let protocol_version = buf.get_u8();
        let server_version = buf.get_str_nul()?;

        if buf.len() < FIXED_TAIL_LEN {
            return Err(err_protocol!(
                "handshake packet too short: {} byte(s) after server version but expecting at least {}",
                buf.len(),
                FIXED_TAIL_LEN
            ));
        }

        let connection_id = buf.get_u32_le();

        // scramble, 1st part (authentication seed)
        let auth_plugin_data_1 = buf.get_bytes(8)?;

        // filler
        buf.advance(1);

        let capabilities_1 = buf.get_u16_le();
        let mut capabilities = Capabilities::from_bits_truncate(capabilities_1.into());

        let charset = buf.get_u8();
        let status = Status::from_bits_truncate(buf.get_u16_le());

        let capabilities_2 = buf.get_u16_le();
        capabilities |= Capabilities::from_bits_truncate(u64::from(capabilities_2) << 16);

        let auth_plugin_data_len = buf.get_u8();

        // reserved
        buf.advance(10);

        let mut auth_plugin_data = Vec::from(&*auth_plugin_data_1);

        if capabilities.contains(Capabilities::SECURE_CONNECTION) {
            // scramble, 2nd part; length = max(13, total declared length - 8),
            // NUL-terminated or zero-padded
            let len = max(13, isize::from(auth_plugin_data_len) - 8) as usize;
            let auth_plugin_data_2 = buf.get_bytes(len)?;

            auth_plugin_data.extend_from_slice(&auth_plugin_data_2);

            if auth_plugin_data.last() == Some(&0) {
                auth_plugin_data.pop();
            }
        }

        let auth_plugin_name = if capabilities.contains(Capabilities::PLUGIN_AUTH) {
            // NUL-terminated in principle; some servers omit the terminator
            Some(match memchr(b'\0', &buf) {
                Some(_) => buf.get_str_nul()?,
                None => buf.get_str_eof()?,
            })
        } else {
            None
        };

        Ok(Self {
            protocol_version,
            server_version,
            connection_id,
            capabilities,
            charset,
            status,
            auth_plugin_data: Bytes::from(auth_plugin_data),
            auth_plugin_name,
        })
    }
}
