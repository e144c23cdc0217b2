//! An append-only buffer builder mirroring [`super::Reader`].

use crate::codec::encode_nat;

#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Writer {
        Writer { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_nat(&mut self, value: u64) {
        self.buf.extend(encode_nat(value));
    }

    pub fn write_hash(&mut self, hash: &[u8; 32]) {
        self.buf.extend_from_slice(hash);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_existence_marker(&mut self, present: bool) {
        self.write_u8(present as u8);
    }
}
