//! Fuzz target for [`Token::parse`]
//!
//! Token text comes from files and the command line, so parsing must accept
//! anything.
//!
//! # Invariants
//!
//! - NEVER panic, whatever the input (non-ASCII, control characters, no
//!   separator, many separators)
//! - `full_text` is the trimmed input, never altered by validation
//! - Segments are only populated when the separator was found
//! - `encoded_payload == encoded_input + encoded_checksum`
//! - Re-parsing `full_text` yields the same token
//! - Schema-valid tokens carry a 3-character prefix
//! - The checksum segment is 6 characters whenever the payload allows it
//! - A payload with no input before the checksum never validates

#![no_main]

use forge_core::{CHECKSUM_LENGTH, PREFIX_LENGTH, Token};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|text: &str| {
    let token = Token::parse(text);

    assert_eq!(token.full_text(), text.trim());
    assert!(token.schema_checked());

    if !token.has_segments() {
        assert!(token.prefix().is_empty());
        assert!(token.encoded_payload().is_empty());
        assert!(!token.schema_valid());
    }

    assert_eq!(
        format!("{}{}", token.encoded_input(), token.encoded_checksum()),
        token.encoded_payload()
    );

    assert_eq!(Token::parse(token.full_text()), token);

    if token.schema_valid() {
        assert_eq!(token.prefix().len(), PREFIX_LENGTH);
    }
    if token.encoded_payload().chars().count() >= CHECKSUM_LENGTH {
        assert_eq!(token.encoded_checksum().chars().count(), CHECKSUM_LENGTH);
    }
    if token.encoded_input().is_empty() {
        assert!(!token.has_valid_checksum());
    }
});
