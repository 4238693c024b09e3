use bytes::BufMut;

#[allow(clippy::module_name_repetitions)]
pub(crate) trait BufMutExt {
    fn put_str_nul(&mut self, s: &str);

    // https://dev.mysql.com/doc/internals/en/integer.html#packet-Protocol::LengthEncodedInteger
    fn put_uint_lenenc(&mut self, value: u64);

    fn put_str_lenenc(&mut self, s: &str);

    fn put_bytes_lenenc(&mut self, bytes: &[u8]);
}

impl BufMutExt for Vec<u8> {
    fn put_str_nul(&mut self, s: &str) {
        self.extend_from_slice(s.as_bytes());
        self.push(0);
    }

    fn put_uint_lenenc(&mut self, value: u64) {
        if value < 0xfb {
            self.push(value as u8);
        } else if value <= u64::from(u16::MAX) {
            self.push(0xfc);
            self.put_u16_le(value as u16);
        } else if value <= 0xff_ff_ff {
            self.push(0xfd);
            self.put_uint_le(value, 3);
        } else {
            self.push(0xfe);
            self.put_u64_le(value);
        }
    }

    fn put_str_lenenc(&mut self, s: &str) {
        self.put_bytes_lenenc(s.as_bytes());
    }

    fn put_bytes_lenenc(&mut self, bytes: &[u8]) {
        self.put_uint_lenenc(bytes.len() as u64);
        self.extend_from_slice(bytes);
    }
}
