use crate::error::Result;
use crate::io::Encode;
use crate::protocol::Capabilities;

/// Execute a SQL statement immediately, in text mode.
///
/// https://dev.mysql.com/doc/internals/en/com-query.html
///
#[derive(Debug)]
pub(crate) struct Query<'a>(pub(crate) &'a str);

impl Encode<'_, Capabilities> for Query<'_> {
    fn encode_with(&self, buf: &mut Vec<u8>, _: Capabilities) -> Result<()> {
        buf.push(0x03);
        buf.extend_from_slice(self.0.as_bytes());

        Ok(())
    }
}
