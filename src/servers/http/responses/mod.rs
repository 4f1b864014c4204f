//! Bencoded response bodies.
//!
//! The tracker only ever *encodes* bencode, and only three response shapes,
//! so each response type assembles its body byte-exactly with the helpers
//! below. Dictionary keys must be emitted in sorted order; the writers here
//! are called in that order by construction.
pub mod announce;
pub mod error;
pub mod scrape;

/// Writes a bencoded byte string: `<len>:<bytes>`.
pub(crate) fn write_bytes(output: &mut Vec<u8>, value: &[u8]) {
    output.extend_from_slice(value.len().to_string().as_bytes());
    output.push(b':');
    output.extend_from_slice(value);
}

/// Writes a bencoded integer: `i<value>e`.
pub(crate) fn write_int(output: &mut Vec<u8>, value: i64) {
    output.push(b'i');
    output.extend_from_slice(value.to_string().as_bytes());
    output.push(b'e');
}
