use bytes::Bytes;

use crate::error::Result;
use crate::io::{Decode, Encode};
use crate::protocol::connect::AuthSwitchRequest;
use crate::protocol::response::OkPacket;
use crate::protocol::Capabilities;

/// A server reply inside the authentication exchange.
///
/// An ERR payload never reaches this decoder; the stream layer raises it as
/// a database error first.
#[derive(Debug)]
pub(crate) enum AuthReply {
    Ok(OkPacket),
    MoreData(Bytes),
    Switch(AuthSwitchRequest),
}

impl Decode<'_, Capabilities> for AuthReply {
    fn decode_with(buf: Bytes, capabilities: Capabilities) -> Result<Self> {
        match buf.first().copied() {
            Some(0x00) => OkPacket::decode_with(buf, capabilities).map(Self::Ok),
            Some(0x01) => Ok(Self::MoreData(buf.slice(1..))),
            Some(0xfe) => AuthSwitchRequest::decode_with(buf, ()).map(Self::Switch),

            Some(tag) => Err(err_protocol!(
                "received 0x{:x} but expected one of: 0x0, 0x1, or 0xfe",
                tag
            )),

            None => Err(err_protocol!("empty packet in authentication exchange")),
        }
    }
}

/// An opaque plugin response sent after the handshake response packet. The
/// payload carries no framing of its own beyond the packet header.
#[derive(Debug)]
pub(crate) struct AuthResponse {
    pub(crate) data: Vec<u8>,
}

impl Encode<'_, Capabilities> for AuthResponse {
    fn encode_with(&self, buf: &mut Vec<u8>, _: Capabilities) -> Result<()> {
        buf.extend_from_slice(&self.data);

        Ok(())
    }
}
