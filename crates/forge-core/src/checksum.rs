//! CRC32 (IEEE) over token text.

/// CRC32 of the string's UTF-8 bytes.
pub fn crc32(text: &str) -> u32 {
    crc32fast::hash(text.as_bytes())
}

/// CRC32 of the string's UTF-8 bytes, big-endian encoded.
pub fn crc32_bytes(text: &str) -> [u8; 4] {
    crc32(text).to_be_bytes()
}
