use bytes::Bytes;

use crate::error::Result;

mod buf;
mod buf_mut;
mod buf_stream;

pub(crate) use buf::BufExt;
pub(crate) use buf_mut::BufMutExt;
pub(crate) use buf_stream::BufStream;

/// Serialize a protocol frame into the write buffer.
///
/// `Context` carries whatever negotiated state the frame layout depends on,
/// most commonly the capability flags.
pub(crate) trait Encode<'en, Context = ()> {
    fn encode_with(&self, buf: &mut Vec<u8>, context: Context) -> Result<()>;
}

/// Deserialize a protocol frame from a packet payload.
pub(crate) trait Decode<'de, Context = ()>: Sized {
    fn decode_with(buf: Bytes, context: Context) -> Result<Self>;
}

impl<'de, T> DecodeExt<'de> for T where T: Decode<'de, ()> {}

pub(crate) trait DecodeExt<'de>: Decode<'de, ()> {
    fn decode(buf: Bytes) -> Result<Self> {
        Self::decode_with(buf, ())
    }
}
