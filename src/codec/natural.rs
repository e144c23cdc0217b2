//! Variable-length natural number encoding.
//!
//! `0x00` encodes zero. `0x01..=0x7F` encode themselves. `0xFF` is followed by a
//! fixed 8-byte little-endian `u64`. Any other leading byte has `l` (`1..=7`)
//! leading one-bits followed by a zero bit; the remaining `7-l` low bits of the
//! prefix form the high-order part of the value, and `l` further little-endian
//! bytes follow and form the low-order part.

use thiserror::Error;

/// Error produced when decoding a natural number from a truncated buffer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NatDecodeError {
    /// The buffer ended before the encoding's prescribed length was reached.
    #[error("end of stream while decoding a natural number")]
    EndOfStream,
}

/// Encode `n` using the variable-length natural number scheme. Length of the
/// result is the scheme's prescribed length for `n` (1 to 9 bytes).
pub fn encode_nat(n: u64) -> Vec<u8> {
    if n == 0 {
        return vec![0];
    }
    for l in 0u32..=7 {
        let threshold = 1u128 << (7 * (l + 1));
        if (n as u128) >= threshold {
            continue;
        }
        if l == 0 {
            return vec![n as u8];
        }
        let high = (n >> (8 * l)) as u8;
        let prefix = (256u16 - (1u16 << (8 - l))) as u8 | high;
        let mut out = Vec::with_capacity(1 + l as usize);
        out.push(prefix);
        out.extend_from_slice(&n.to_le_bytes()[..l as usize]);
        return out;
    }
    let mut out = Vec::with_capacity(9);
    out.push(0xFF);
    out.extend_from_slice(&n.to_le_bytes());
    out
}

/// Decode a natural number from the start of `bytes`, returning the value and
/// the number of bytes consumed. Total for any well-formed prefix of sufficient
/// length; fails with [`NatDecodeError::EndOfStream`] otherwise.
pub fn decode_nat(bytes: &[u8]) -> Result<(u64, usize), NatDecodeError> {
    let &b0 = bytes.first().ok_or(NatDecodeError::EndOfStream)?;

    if b0 == 0x00 {
        return Ok((0, 1));
    }
    if b0 < 0x80 {
        return Ok((b0 as u64, 1));
    }
    if b0 == 0xFF {
        let body = bytes.get(1..9).ok_or(NatDecodeError::EndOfStream)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(body);
        return Ok((u64::from_le_bytes(buf), 9));
    }

    let l = b0.leading_ones() as usize;
    let high_mask = (1u16 << (8 - l - 1)) - 1;
    let high = (b0 as u16 & high_mask) as u64;
    let body = bytes.get(1..1 + l).ok_or(NatDecodeError::EndOfStream)?;
    let mut buf = [0u8; 8];
    buf[..l].copy_from_slice(body);
    let low = u64::from_le_bytes(buf);
    Ok((high * (1u64 << (8 * l)) + low, 1 + l))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_vectors() {
        assert_eq!(decode_nat(&[0x00]).unwrap(), (0, 1));
        assert_eq!(decode_nat(&[0x42]).unwrap(), (66, 1));
        assert_eq!(
            decode_nat(&[0xFF, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap(),
            (0, 9)
        );
    }

    #[test]
    fn end_of_stream() {
        assert_eq!(decode_nat(&[]), Err(NatDecodeError::EndOfStream));
        assert_eq!(decode_nat(&[0xFF, 1, 2]), Err(NatDecodeError::EndOfStream));
        assert_eq!(decode_nat(&[0x81]), Err(NatDecodeError::EndOfStream));
    }

    #[test]
    fn encoded_length_matches_scheme() {
        assert_eq!(encode_nat(0).len(), 1);
        assert_eq!(encode_nat(127).len(), 1);
        assert_eq!(encode_nat(128).len(), 2);
        assert_eq!(encode_nat(16_383).len(), 2);
        assert_eq!(encode_nat(16_384).len(), 3);
        assert_eq!(encode_nat(u64::MAX).len(), 9);
    }

    #[quickcheck_macros::quickcheck]
    fn round_trip(n: u64) -> bool {
        let encoded = encode_nat(n);
        decode_nat(&encoded) == Ok((n, encoded.len()))
    }
}
