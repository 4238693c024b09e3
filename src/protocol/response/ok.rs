use bytes::{Buf, Bytes};

use crate::error::Result;
use crate::io::{BufExt, Decode};
use crate::protocol::response::Status;
use crate::protocol::Capabilities;

// https://dev.mysql.com/doc/internals/en/packet-OK_Packet.html
// https://mariadb.com/kb/en/ok_packet/

#[derive(Debug)]
pub(crate) struct OkPacket {
    pub(crate) affected_rows: u64,
    #[allow(dead_code)]
    pub(crate) last_insert_id: u64,
    pub(crate) status: Status,
    #[allow(dead_code)]
    pub(crate) warnings: u16,
}

impl Decode<'_, Capabilities> for OkPacket {
    fn decode_with(mut buf: Bytes, capabilities: Capabilities) -> Result<Self> {
        if buf.is_empty() {
            return Err(err_protocol!("empty OK packet"));
        }

        let header = buf.get_u8();
        if header != 0x00 && header != 0xfe {
            return Err(err_protocol!(
                "expected 0x00 or 0xfe (OK_Packet) but found 0x{:x}",
                header
            ));
        }

        let affected_rows = buf.get_uint_lenenc()?.unwrap_or(0);
        let last_insert_id = buf.get_uint_lenenc()?.unwrap_or(0);

        let (status, warnings) = if buf.len() >= 4 {
            (Status::from_bits_truncate(buf.get_u16_le()), buf.get_u16_le())
        } else {
            (Status::empty(), 0)
        };

        // trailing human-readable status info; parsed only to validate the
        // frame, callers have no use for it
        if capabilities.contains(Capabilities::SESSION_TRACK) && !buf.is_empty() {
            let _info = buf.get_str_lenenc()?;

            if status.contains(Status::SESSION_STATE_CHANGED) && !buf.is_empty() {
                let _state = buf.get_bytes_lenenc()?;
            }
        }

        Ok(Self { affected_rows, last_insert_id, status, warnings })
    }
}
