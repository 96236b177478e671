//! Base-62 codec over arbitrary-precision big-endian integers.
//!
//! A byte string is read as one unsigned big-endian integer and rendered in
//! base 62. Two digit orders are in circulation:
//!
//! - [`Alphabet::Standard`]: `0-9`, `a-z`, `A-Z`
//! - [`Alphabet::Inverted`]: `0-9`, `A-Z`, `a-z` (what token segments use)
//!
//! The two differ only in letter case, so the inverted alphabet is the
//! standard one with ASCII letter case swapped on the way out (encode) and on
//! the way in (decode).

use thiserror::Error;

/// Digits in standard order.
const DIGITS: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Numeric base.
const BASE: u32 = 62;

/// Base-62 digit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alphabet {
    /// `0-9`, `a-z`, `A-Z`.
    Standard,
    /// `0-9`, `A-Z`, `a-z`.
    #[default]
    Inverted,
}

/// Errors from [`decode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Base62Error {
    /// Input was empty.
    #[error("empty base62 input")]
    Empty,

    /// Input contained a character outside the alphabet.
    #[error("invalid base62 digit {found:?} at offset {offset}")]
    InvalidDigit {
        /// The offending character, as given.
        found: char,
        /// Character offset in the input.
        offset: usize,
    },

    /// Decoded value does not fit the requested length.
    #[error("decoded value needs {needed} bytes, target length is {length}")]
    Overflow {
        /// Minimal byte length of the decoded value.
        needed: usize,
        /// Requested output length.
        length: usize,
    },
}

impl Base62Error {
    /// Buffer the decoder hands back alongside this error.
    ///
    /// An overflow yields a zero-filled buffer of the requested length; the
    /// other failures yield nothing.
    pub fn fallback_buffer(&self) -> Option<Vec<u8>> {
        match self {
            Self::Overflow { length, .. } => Some(vec![0; *length]),
            Self::Empty | Self::InvalidDigit { .. } => None,
        }
    }
}

/// Encodes `bytes` as a base-62 string.
///
/// Leading zero bytes do not contribute digits; an empty or all-zero input
/// encodes as `"0"`.
pub fn encode(bytes: &[u8], alphabet: Alphabet) -> String {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let mut number = bytes[start..].to_vec();
    if number.is_empty() {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(number.len() * 4 / 3 + 1);
    while !number.is_empty() {
        let remainder = div_rem_in_place(&mut number);
        digits.push(DIGITS[remainder as usize]);
    }

    digits.iter().rev().map(|&d| swap_case(char::from(d), alphabet)).collect()
}

/// Decodes a base-62 string into bytes.
///
/// With `length == 0` the minimal big-endian representation is returned (zero
/// decodes to an empty buffer). Otherwise the result is exactly `length`
/// bytes, zero-padded on the left; a value that needs more room fails with
/// [`Base62Error::Overflow`], whose [`fallback_buffer`] is zero-filled.
///
/// [`fallback_buffer`]: Base62Error::fallback_buffer
pub fn decode(text: &str, length: usize, alphabet: Alphabet) -> Result<Vec<u8>, Base62Error> {
    if text.is_empty() {
        return Err(Base62Error::Empty);
    }

    let mut number: Vec<u8> = Vec::new();
    for (offset, found) in text.chars().enumerate() {
        let digit = digit_value(swap_case(found, alphabet))
            .ok_or(Base62Error::InvalidDigit { found, offset })?;
        mul_add_in_place(&mut number, digit);
    }

    if length == 0 {
        return Ok(number);
    }
    if number.len() > length {
        return Err(Base62Error::Overflow { needed: number.len(), length });
    }

    let mut out = vec![0u8; length];
    out[length - number.len()..].copy_from_slice(&number);
    Ok(out)
}

/// Swaps ASCII letter case when targeting the inverted alphabet.
///
/// ASCII case swapping always lands on ASCII; everything that is not an
/// ASCII letter passes through untouched.
fn swap_case(c: char, alphabet: Alphabet) -> char {
    match alphabet {
        Alphabet::Standard => c,
        Alphabet::Inverted if c.is_ascii_lowercase() => c.to_ascii_uppercase(),
        Alphabet::Inverted => c.to_ascii_lowercase(),
    }
}

/// Value of a standard-order digit.
fn digit_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        'a'..='z' => Some(c as u32 - 'a' as u32 + 10),
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 36),
        _ => None,
    }
}

/// Divides a minimal big-endian number by the base, returning the remainder.
///
/// The quotient replaces `number` and stays minimal (no leading zeros).
fn div_rem_in_place(number: &mut Vec<u8>) -> u32 {
    let mut remainder = 0u32;
    let mut quotient = Vec::with_capacity(number.len());
    for &byte in number.iter() {
        let acc = (remainder << 8) | u32::from(byte);
        // acc < 62 * 256, so the quotient digit fits a byte
        let q = (acc / BASE) as u8;
        remainder = acc % BASE;
        if !quotient.is_empty() || q != 0 {
            quotient.push(q);
        }
    }
    *number = quotient;
    remainder
}

/// Computes `number = number * 62 + digit` on a minimal big-endian number.
fn mul_add_in_place(number: &mut Vec<u8>, digit: u32) {
    let mut carry = digit;
    for byte in number.iter_mut().rev() {
        let acc = u32::from(*byte) * BASE + carry;
        *byte = (acc & 0xff) as u8;
        carry = acc >> 8;
    }
    while carry > 0 {
        number.insert(0, (carry & 0xff) as u8);
        carry >>= 8;
    }
}
