use std::cmp::min;
use std::ops::{Deref, DerefMut};

use bytes::Bytes;

use crate::error::Result;
use crate::io::{Decode, Encode};
use crate::protocol::response::OkPacket;
use crate::protocol::{Capabilities, MAX_PACKET_SIZE};

/// A single logical payload, framed for the wire on encode.
///
/// Payloads are split into chunks of at most [`MAX_PACKET_SIZE`] bytes, each
/// prefixed with a 3-byte little-endian length and the next sequence id. A
/// payload that is an exact positive multiple of the chunk size is followed
/// by an empty chunk so the receiver can tell it apart from a truncated one.
///
/// https://dev.mysql.com/doc/internals/en/mysql-packet.html
#[derive(Debug)]
pub(crate) struct Packet<T>(pub(crate) T);

impl<'en, 'stream, T> Encode<'stream, (Capabilities, &'stream mut u8)> for Packet<T>
where
    T: Encode<'en, Capabilities>,
{
    fn encode_with(
        &self,
        buf: &mut Vec<u8>,
        (capabilities, sequence_id): (Capabilities, &'stream mut u8),
    ) -> Result<()> {
        let mut next_header = |len: u32| {
            let mut header = len.to_le_bytes();
            header[3] = *sequence_id;
            *sequence_id = sequence_id.wrapping_add(1);

            header
        };

        // reserve space to write the prefixed length
        let offset = buf.len();
        buf.extend(&[0_u8; 4]);

        // encode the payload
        self.0.encode_with(buf, capabilities)?;

        // determine the length of the encoded payload
        // and write to our reserved space
        let len = buf.len() - offset - 4;
        let header = &mut buf[offset..];

        header[..4].copy_from_slice(&next_header(min(len, MAX_PACKET_SIZE) as u32));

        // add more packets if we need to split the data
        if len >= MAX_PACKET_SIZE {
            let rest = buf.split_off(offset + 4 + MAX_PACKET_SIZE);
            let mut chunks = rest.chunks_exact(MAX_PACKET_SIZE);

            for chunk in chunks.by_ref() {
                buf.reserve(chunk.len() + 4);
                buf.extend(&next_header(chunk.len() as u32));
                buf.extend(chunk);
            }

            // this also adds the empty terminal packet when the payload
            // length is an exact multiple of the chunk size
            let remainder = chunks.remainder();
            buf.reserve(remainder.len() + 4);
            buf.extend(&next_header(remainder.len() as u32));
            buf.extend(remainder);
        }

        Ok(())
    }
}

impl Packet<Bytes> {
    pub(crate) fn decode<'de, T>(self) -> Result<T>
    where
        T: Decode<'de, ()>,
    {
        self.decode_with(())
    }

    pub(crate) fn decode_with<'de, T, C>(self, context: C) -> Result<T>
    where
        T: Decode<'de, C>,
    {
        T::decode_with(self.0, context)
    }

    pub(crate) fn ok(self, capabilities: Capabilities) -> Result<OkPacket> {
        self.decode_with(capabilities)
    }
}

impl Deref for Packet<Bytes> {
    type Target = Bytes;

    fn deref(&self) -> &Bytes {
        &self.0
    }
}

impl DerefMut for Packet<Bytes> {
    fn deref_mut(&mut self) -> &mut Bytes {
        &mut self.0
    }
}
