//! Variable length integer encoding used for every message field.
//!
//! Values are sent as 7-bit groups, most significant first, with bit 7 set on
//! every byte but the last. The first byte is sign-extended when its bits 6
//! and 5 are both set, so small negative numbers stay short.

use heapless::Vec;

use crate::error::{DecodeError, EncodeError};

/// Longest encoding of a 32-bit value.
pub const MAX_INT_LEN: usize = 5;

fn encoded_len(value: u32) -> usize {
    let sv = value as i32;
    if (-(1 << 5)..(3 << 5)).contains(&sv) {
        1
    } else if (-(1 << 12)..(3 << 12)).contains(&sv) {
        2
    } else if (-(1 << 19)..(3 << 19)).contains(&sv) {
        3
    } else if (-(1 << 26)..(3 << 26)).contains(&sv) {
        4
    } else {
        MAX_INT_LEN
    }
}

/// Append `value` to `out`. Signed fields are passed as their two's complement bits.
pub fn encode_int<const N: usize>(out: &mut Vec<u8, N>, value: u32) -> Result<(), EncodeError> {
    let len = encoded_len(value);
    for group in (1..len).rev() {
        let byte = ((value >> (7 * group)) & 0x7f) as u8 | 0x80;
        out.push(byte).map_err(|_| EncodeError::Overflow)?;
    }
    out.push((value & 0x7f) as u8).map_err(|_| EncodeError::Overflow)
}

/// Parse one integer from the front of `buf`, advancing it past the consumed bytes.
pub fn parse_int(buf: &mut &[u8]) -> Result<u32, DecodeError> {
    let mut byte = next_byte(buf)?;
    let mut value = u32::from(byte & 0x7f);
    if byte & 0x60 == 0x60 {
        value |= !0x1f;
    }
    while byte & 0x80 != 0 {
        byte = next_byte(buf)?;
        value = (value << 7) | u32::from(byte & 0x7f);
    }
    Ok(value)
}

fn next_byte(buf: &mut &[u8]) -> Result<u8, DecodeError> {
    let (&byte, rest) = buf.split_first().ok_or(DecodeError::Truncated)?;
    *buf = rest;
    Ok(byte)
}
