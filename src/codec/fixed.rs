//! Fixed-width little-endian integer helpers.

/// Read a fixed-width little-endian unsigned integer of `WIDTH` bytes from the
/// start of `bytes`, zero-extending into a `u64`. Bytes past the end of `bytes`
/// (but within `WIDTH`) read as zero, mirroring the program decoder's
/// "bytes past `|code|` read as zero" rule.
pub fn read_fixed_le<const WIDTH: usize>(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    let n = WIDTH.min(bytes.len()).min(8);
    buf[..n].copy_from_slice(&bytes[..n]);
    u64::from_le_bytes(buf)
}

/// Write the low `WIDTH` bytes of `value` as little-endian into `out`.
pub fn write_fixed_le<const WIDTH: usize>(value: u64, out: &mut Vec<u8>) {
    let bytes = value.to_le_bytes();
    out.extend_from_slice(&bytes[..WIDTH]);
}

/// Sign-extend the low `SRC_BITS` bits of `value` to a full `u64`.
pub const fn sign_extend<const SRC_BITS: u32>(value: u64) -> i64 {
    let shift = 64 - SRC_BITS;
    ((value << shift) as i64) >> shift
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_short_buffers_as_zero_padded() {
        assert_eq!(read_fixed_le::<4>(&[0x01, 0x02]), 0x0000_0201);
        assert_eq!(read_fixed_le::<4>(&[]), 0);
    }

    #[test]
    fn round_trips() {
        let mut out = Vec::new();
        write_fixed_le::<3>(0x00AB_CDEF, &mut out);
        assert_eq!(out, vec![0xEF, 0xCD, 0xAB]);
        assert_eq!(read_fixed_le::<3>(&out), 0x00AB_CDEF);
    }

    #[test]
    fn sign_extension() {
        assert_eq!(sign_extend::<8>(0xFF), -1);
        assert_eq!(sign_extend::<8>(0x7F), 127);
        assert_eq!(sign_extend::<16>(0x8000), -32768);
    }
}
