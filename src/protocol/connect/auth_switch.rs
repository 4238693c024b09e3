use bytes::{Buf, Bytes};
use bytestring::ByteString;

use crate::error::Result;
use crate::io::{BufExt, Decode};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_connection_phase_packets_protocol_auth_switch_request.html

/// Server instruction to restart authentication with a different plugin.
///
/// A bare `0xfe` with no payload is the pre-4.1 form: retry the default
/// plugin against the *original* greeting challenge.
#[derive(Debug)]
pub(crate) struct AuthSwitchRequest {
    pub(crate) plugin_name: Option<ByteString>,
    pub(crate) data: Bytes,
}

impl Decode<'_> for AuthSwitchRequest {
    fn decode_with(mut buf: Bytes, _: ()) -> Result<Self> {
        if buf.is_empty() {
            return Err(err_protocol!("empty auth-switch packet"));
        }

        let header = buf.get_u8();
        if header != 0xfe {
            return Err(err_protocol!("expected 0xfe (AUTH_SWITCH) but found 0x{:x}", header));
        }

        if buf.is_empty() {
            // legacy auth-method-switch request
            return Ok(Self { plugin_name: None, data: Bytes::new() });
        }

        let plugin_name = buf.get_str_nul()?;

        // the new challenge, NUL-terminated; some plugins (mysql_clear_password
        // on AWS Aurora with IAM) legitimately send no data at all
        let mut data = buf;
        if data.last() == Some(&0) {
            data.truncate(data.len() - 1);
        }

        Ok(Self { plugin_name: Some(plugin_name), data })
    }
}
