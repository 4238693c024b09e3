use crate::error::Result;
use crate::io::Encode;
use crate::protocol::Capabilities;

/// Tells the server that the client wants to close the connection.
///
/// https://dev.mysql.com/doc/internals/en/com-quit.html
///
#[derive(Debug)]
pub(crate) struct Quit;

impl Encode<'_, Capabilities> for Quit {
    fn encode_with(&self, buf: &mut Vec<u8>, _: Capabilities) -> Result<()> {
        buf.push(0x01);

        Ok(())
    }
}
