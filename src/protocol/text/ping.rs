use crate::error::Result;
use crate::io::Encode;
use crate::protocol::Capabilities;

/// Check if the server is alive.
///
/// https://dev.mysql.com/doc/internals/en/com-ping.html
/// https://mariadb.com/kb/en/com_ping/
///
#[derive(Debug)]
pub(crate) struct Ping;

impl Encode<'_, Capabilities> for Ping {
    fn encode_with(&self, buf: &mut Vec<u8>, _: Capabilities) -> Result<()> {
        buf.push(0x0e);

        Ok(())
    }
}
