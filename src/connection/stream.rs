//! Reads and writes packets to and from the MySQL database server.
//!
//! Packets in MySQL are prefixed by 4 bytes: 3 for the payload length (LE)
//! and one for the sequence id. A logical payload larger than `2^24 - 1`
//! bytes travels as several completely full packets followed by one that is
//! not full; receiving is the mirror of that.
//!
//! https://dev.mysql.com/doc/internals/en/mysql-packet.html
//!
use bytes::{Buf, Bytes};

use crate::error::{MySqlClientError, Result};
use crate::io::{DecodeExt, Encode};
use crate::protocol::response::{ErrPacket, OkPacket};
use crate::protocol::{Capabilities, Packet, MAX_PACKET_SIZE};
use crate::MySqlDatabaseError;

use super::MySqlConnection;

impl MySqlConnection {
    /// Frame and buffer a packet; [`flush`][Self::flush] puts it on the wire.
    pub(super) fn write_packet<'en, T>(&mut self, packet: T) -> Result<()>
    where
        T: Encode<'en, Capabilities>,
    {
        let buf = self.stream.buffer();

        Packet(packet).encode_with(buf, (self.capabilities, &mut self.sequence_id))
    }

    pub(super) fn flush(&mut self) -> Result<()> {
        self.stream.flush()
    }

    /// The sequence id restarts at zero with each new command.
    pub(super) fn send_command<'en, T>(&mut self, command: T) -> Result<()>
    where
        T: Encode<'en, Capabilities>,
    {
        self.sequence_id = 0;

        self.write_packet(command)?;
        self.flush()
    }

    /// Read one logical payload, reassembling split packets and verifying
    /// each chunk's sequence id.
    fn recv_raw(&mut self) -> Result<Packet<Bytes>> {
        let mut payload = Vec::new();

        loop {
            self.stream.read(4)?;

            let mut header = Bytes::copy_from_slice(self.stream.get(0, 4));
            let len = header.get_uint_le(3) as usize;
            let sequence_id = header.get_u8();

            if sequence_id != self.sequence_id {
                return Err(err_protocol!(
                    "packets out of order: expected sequence {} but received {}",
                    self.sequence_id,
                    sequence_id
                ));
            }

            self.sequence_id = self.sequence_id.wrapping_add(1);

            self.stream.read(4 + len)?;
            self.stream.consume(4);

            let chunk = self.stream.take(len);

            // a completely full chunk promises another one
            if payload.is_empty() && len < MAX_PACKET_SIZE {
                return Ok(Packet(chunk));
            }

            payload.extend_from_slice(&chunk);

            if len < MAX_PACKET_SIZE {
                return Ok(Packet(Bytes::from(payload)));
            }
        }
    }

    /// Read one payload and raise server errors: an ERR payload becomes
    /// [`MySqlDatabaseError`] here so protocol decoders never see it.
    pub(super) fn recv_packet(&mut self) -> Result<Packet<Bytes>> {
        let packet = self.recv_raw()?;

        match packet.first().copied() {
            None => Err(MySqlClientError::EmptyPacket { context: "server reply" }.into()),

            Some(0xff) => {
                let err = ErrPacket::decode(packet.0)?;

                Err(MySqlDatabaseError(err).into())
            }

            Some(_) => Ok(packet),
        }
    }

    pub(super) fn recv_ok(&mut self) -> Result<OkPacket> {
        let ok = self.recv_packet()?.ok(self.capabilities)?;
        self.status = ok.status;

        Ok(ok)
    }
}
