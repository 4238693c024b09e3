use bytes::{Buf, Bytes};

use crate::error::Result;
use crate::io::Decode;
use crate::protocol::response::Status;

/// Marks the end of a result-set section on servers that do not speak
/// `DEPRECATE_EOF`.
///
/// https://dev.mysql.com/doc/internals/en/packet-EOF_Packet.html
#[derive(Debug)]
pub(crate) struct EofPacket {
    #[allow(dead_code)]
    pub(crate) warnings: u16,
    #[allow(dead_code)]
    pub(crate) status: Status,
}

impl Decode<'_> for EofPacket {
    fn decode_with(mut buf: Bytes, _: ()) -> Result<Self> {
        if buf.len() < 5 {
            return Err(err_protocol!("EOF packet too short: {} byte(s)", buf.len()));
        }

        let header = buf.get_u8();
        if header != 0xfe {
            return Err(err_protocol!("expected 0xfe (EOF_Packet) but found 0x{:x}", header));
        }

        let warnings = buf.get_u16_le();
        let status = Status::from_bits_truncate(buf.get_u16_le());

        Ok(Self { warnings, status })
    }
}
