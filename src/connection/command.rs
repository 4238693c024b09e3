use bytes::Bytes;
use bytestring::ByteString;

use crate::error::Result;
use crate::io::BufExt;
use crate::protocol::response::EofPacket;
use crate::protocol::text::{Ping, Query};
use crate::protocol::{Capabilities, Packet};

use super::MySqlConnection;

impl MySqlConnection {
    /// Run a statement and return the affected-row count.
    ///
    /// A statement that produces rows is drained and reported as zero rows
    /// affected; this surface exists for session configuration, not queries.
    pub fn execute(&mut self, sql: &str) -> Result<u64> {
        tracing::trace!(sql, "executing statement");

        self.send_command(Query(sql))?;

        let packet = self.recv_packet()?;

        match packet.first().copied() {
            Some(0x00) => {
                let ok = packet.ok(self.capabilities)?;
                self.status = ok.status;

                Ok(ok.affected_rows)
            }

            Some(0xfb) => Err(err_protocol!("unexpected LOCAL INFILE request for {:?}", sql)),

            _ => {
                let _ = self.read_scalar_result(packet)?;

                Ok(0)
            }
        }
    }

    /// Check that the server is alive.
    pub fn ping(&mut self) -> Result<()> {
        self.send_command(Ping)?;
        self.recv_ok()?;

        Ok(())
    }

    /// `SELECT @@<name>`, returning the value as text.
    pub(crate) fn get_system_var(&mut self, name: &str) -> Result<Option<ByteString>> {
        let sql = format!("SELECT @@{name}");
        self.send_command(Query(&sql))?;

        let packet = self.recv_packet()?;

        if packet.first() == Some(&0x00) {
            let _ = packet.ok(self.capabilities)?;

            return Ok(None);
        }

        self.read_scalar_result(packet)
    }

    /// Walk a text result set and keep the first column of the first row.
    fn read_scalar_result(&mut self, header: Packet<Bytes>) -> Result<Option<ByteString>> {
        let mut buf = header.0;
        let columns = buf.get_uint_lenenc()?.unwrap_or(0);

        for _ in 0..columns {
            let _column_def = self.recv_packet()?;
        }

        if !self.capabilities.contains(Capabilities::DEPRECATE_EOF) {
            let _ = self.recv_packet()?.decode_with::<EofPacket, _>(())?;
        }

        let mut value = None;

        loop {
            let row = self.recv_packet()?;

            // 0xfe with a short payload terminates the rows: an OK packet
            // under DEPRECATE_EOF, an EOF packet otherwise
            if row.first() == Some(&0xfe) && row.len() < 9 {
                return Ok(value);
            }

            let mut row = row.0;

            if value.is_none() {
                value = row.get_str_lenenc()?;
            } else {
                log::warn!("discarding unexpected additional row in scalar result");
            }
        }
    }
}
