//! Fuzz target for the base-62 codec
//!
//! # Strategy
//!
//! - Arbitrary text decoded at arbitrary target lengths, both alphabets
//! - Arbitrary bytes encoded and decoded back
//!
//! # Invariants
//!
//! - NEVER panic on any text or length
//! - A successful decode with `length > 0` returns exactly `length` bytes
//! - Overflow yields a zeroed fallback buffer of the requested length
//! - `decode(encode(bytes), bytes.len())` returns `bytes`

#![no_main]

use arbitrary::Arbitrary;
use forge_core::{
    Alphabet, Base62Error,
    base62::{decode, encode},
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    text: &'a str,
    bytes: &'a [u8],
    length: u8,
    inverted: bool,
}

fuzz_target!(|input: Input<'_>| {
    let alphabet = if input.inverted { Alphabet::Inverted } else { Alphabet::Standard };
    let length = usize::from(input.length);

    match decode(input.text, length, alphabet) {
        Ok(decoded) if length > 0 => assert_eq!(decoded.len(), length),
        Ok(_) => {},
        Err(e @ Base62Error::Overflow { .. }) => {
            let fallback = e.fallback_buffer().unwrap_or_default();
            assert_eq!(fallback.len(), length);
            assert!(fallback.iter().all(|&b| b == 0));
        },
        Err(_) => {},
    }

    // Leading zero bytes are not representable; compare against the padded form
    let encoded = encode(input.bytes, alphabet);
    if !input.bytes.is_empty() {
        let decoded = decode(&encoded, input.bytes.len(), alphabet);
        assert_eq!(decoded.as_deref(), Ok(input.bytes));
    }
});
