//! A cursor over an encoded state blob.

use crate::codec::{decode_nat, read_fixed_le};

use super::DecodingContext;

pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Reader<'a> {
        Reader { bytes, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize, ctx: &DecodingContext) -> Result<&'a [u8], super::StateCodecError> {
        let end = self.pos.checked_add(n).ok_or_else(|| ctx.end_of_stream())?;
        if end > self.bytes.len() {
            return Err(ctx.end_of_stream());
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn read_u8(&mut self, ctx: &DecodingContext) -> Result<u8, super::StateCodecError> {
        Ok(self.take(1, ctx)?[0])
    }

    pub fn read_u32(&mut self, ctx: &DecodingContext) -> Result<u32, super::StateCodecError> {
        Ok(read_fixed_le::<4>(self.take(4, ctx)?) as u32)
    }

    pub fn read_u64(&mut self, ctx: &DecodingContext) -> Result<u64, super::StateCodecError> {
        Ok(read_fixed_le::<8>(self.take(8, ctx)?))
    }

    pub fn read_nat(&mut self, ctx: &DecodingContext) -> Result<u64, super::StateCodecError> {
        let (value, n) = decode_nat(&self.bytes[self.pos..]).map_err(|_| ctx.end_of_stream())?;
        self.pos += n;
        Ok(value)
    }

    pub fn read_hash(&mut self, ctx: &DecodingContext) -> Result<[u8; 32], super::StateCodecError> {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(self.take(32, ctx)?);
        Ok(hash)
    }

    pub fn read_fixed<const N: usize>(
        &mut self,
        ctx: &DecodingContext,
    ) -> Result<[u8; N], super::StateCodecError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N, ctx)?);
        Ok(buf)
    }

    pub fn read_bytes(&mut self, n: usize, ctx: &DecodingContext) -> Result<Vec<u8>, super::StateCodecError> {
        Ok(self.take(n, ctx)?.to_vec())
    }

    pub fn read_existence_marker(&mut self, ctx: &DecodingContext) -> Result<bool, super::StateCodecError> {
        match self.read_u8(ctx)? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(ctx.invalid_value()),
        }
    }
}
