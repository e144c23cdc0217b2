//! Variable-length natural number encoding and fixed-width little-endian
//! integer helpers shared by the program decoder and the state codec.

mod fixed;
mod natural;

pub use fixed::{read_fixed_le, sign_extend, write_fixed_le};
pub use natural::{decode_nat, encode_nat, NatDecodeError};
