use bytes::{Buf, Bytes};
use bytestring::ByteString;
use memchr::memchr;

use crate::error::{Error, Result};

/// Checked reads over a packet payload.
///
/// Every method validates the remaining length first; a short buffer is a
/// `Protocol` error, never a panic.
#[allow(clippy::module_name_repetitions)]
pub(crate) trait BufExt: Buf {
    fn get_bytes(&mut self, n: usize) -> Result<Bytes>;

    fn get_str(&mut self, n: usize) -> Result<ByteString>;

    fn get_str_nul(&mut self) -> Result<ByteString>;

    fn get_str_eof(&mut self) -> Result<ByteString>;

    // length-encoded integer; `None` is the NULL sentinel (0xFB)
    // https://dev.mysql.com/doc/internals/en/integer.html#packet-Protocol::LengthEncodedInteger
    fn get_uint_lenenc(&mut self) -> Result<Option<u64>>;

    fn get_str_lenenc(&mut self) -> Result<Option<ByteString>>;

    fn get_bytes_lenenc(&mut self) -> Result<Option<Bytes>>;
}

fn underflow(wanted: usize, have: usize) -> Error {
    err_protocol!("packet payload too short: wanted {} more byte(s) but have {}", wanted, have)
}

impl BufExt for Bytes {
    fn get_bytes(&mut self, n: usize) -> Result<Bytes> {
        if self.len() < n {
            return Err(underflow(n, self.len()));
        }

        Ok(self.split_to(n))
    }

    fn get_str(&mut self, n: usize) -> Result<ByteString> {
        ByteString::try_from(self.get_bytes(n)?)
            .map_err(|err| err_protocol!("expected UTF-8 string: {}", err))
    }

    fn get_str_nul(&mut self) -> Result<ByteString> {
        let nul = memchr(b'\0', self)
            .ok_or_else(|| err_protocol!("expected NUL-terminated string in packet payload"))?;

        let s = ByteString::try_from(self.split_to(nul + 1).slice(..nul))
            .map_err(|err| err_protocol!("expected UTF-8 string: {}", err))?;

        Ok(s)
    }

    fn get_str_eof(&mut self) -> Result<ByteString> {
        let n = self.len();
        self.get_str(n)
    }

    fn get_uint_lenenc(&mut self) -> Result<Option<u64>> {
        if self.is_empty() {
            return Err(underflow(1, 0));
        }

        Ok(match self.get_u8() {
            0xfb => None,

            0xfc => {
                if self.len() < 2 {
                    return Err(underflow(2, self.len()));
                }
                Some(u64::from(self.get_u16_le()))
            }

            0xfd => {
                if self.len() < 3 {
                    return Err(underflow(3, self.len()));
                }
                Some(self.get_uint_le(3))
            }

            0xfe => {
                if self.len() < 8 {
                    return Err(underflow(8, self.len()));
                }
                Some(self.get_u64_le())
            }

            value => Some(u64::from(value)),
        })
    }

    fn get_str_lenenc(&mut self) -> Result<Option<ByteString>> {
        self.get_uint_lenenc()?
            .map(|len| {
                let len = usize::try_from(len)
                    .map_err(|_| err_protocol!("string length out of range: {}", len))?;

                self.get_str(len)
            })
            .transpose()
    }

    fn get_bytes_lenenc(&mut self) -> Result<Option<Bytes>> {
        self.get_uint_lenenc()?
            .map(|len| {
                let len = usize::try_from(len)
                    .map_err(|_| err_protocol!("byte length out of range: {}", len))?;

                self.get_bytes(len)
            })
            .transpose()
    }
}
