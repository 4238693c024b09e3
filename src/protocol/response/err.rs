use bytes::{Buf, Bytes};
use bytestring::ByteString;

use crate::error::Result;
use crate::io::{BufExt, Decode};

// https://dev.mysql.com/doc/internals/en/packet-ERR_Packet.html
// https://mariadb.com/kb/en/err_packet/

#[allow(clippy::module_name_repetitions)]
#[derive(Debug)]
pub(crate) struct ErrPacket {
    pub(crate) error_code: u16,
    pub(crate) sql_state: Option<ByteString>,
    pub(crate) error_message: ByteString,
}

impl ErrPacket {
    pub(crate) fn new(code: u16, message: &str) -> Self {
        Self {
            error_code: code,
            sql_state: Some(ByteString::from_static("HY000")),
            error_message: ByteString::from(message),
        }
    }
}

impl Decode<'_> for ErrPacket {
    fn decode_with(mut buf: Bytes, _: ()) -> Result<Self> {
        if buf.len() < 3 {
            return Err(err_protocol!("ERR packet too short: {} byte(s)", buf.len()));
        }

        let tag = buf.get_u8();
        debug_assert!(tag == 0xff);

        let error_code = buf.get_u16_le();

        let sql_state = if buf.first() == Some(&b'#') {
            // if the next byte is '#' then we have the SQL STATE
            buf.advance(1);

            Some(buf.get_str(5)?)
        } else {
            None
        };

        let error_message = buf.get_str_eof()?;

        Ok(Self { error_code, sql_state, error_message })
    }
}
