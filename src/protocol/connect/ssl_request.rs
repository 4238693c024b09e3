use crate::error::Result;
use crate::io::Encode;
use crate::protocol::Capabilities;

/// The first half of the handshake response, sent on its own to request a
/// TLS upgrade before any credentials cross the wire.
///
/// https://dev.mysql.com/doc/internals/en/connection-phase-packets.html#packet-Protocol::SSLRequest
#[derive(Debug)]
pub(crate) struct SslRequest {
    pub(crate) max_packet_size: u32,
    pub(crate) charset: u8,
}

impl Encode<'_, Capabilities> for SslRequest {
    fn encode_with(&self, buf: &mut Vec<u8>, context: Capabilities) -> Result<()> {
        buf.extend(&(context.bits() as u32).to_le_bytes());
        buf.extend(&self.max_packet_size.to_le_bytes());
        buf.push(self.charset);

        // reserved
        buf.extend(&[0_u8; 23]);

        Ok(())
    }
}
