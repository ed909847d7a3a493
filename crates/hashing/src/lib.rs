#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `hashing` provides the two primitives every object in the store is
//! addressed and classified by: a stable content hash and a heuristic
//! text/binary classifier.
//!
//! # Design
//!
//! [`hash`] hashes the *uncompressed* payload so an object's identity never
//! depends on which compression scheme the store happened to choose for it.
//! [`is_binary`] only inspects a bounded prefix of the payload so classifying
//! a multi-gigabyte blob stays O(1) in practice.

/// Number of leading bytes inspected by [`is_binary`].
pub const BINARY_SNIFF_WINDOW: usize = 8192;

/// Fraction of printable bytes below which a payload is classified as binary.
const PRINTABLE_RATIO_THRESHOLD: f64 = 0.85;

/// Hashes `bytes` with the object store's content-addressing function.
///
/// Returns 64 lowercase hex characters. Two calls with equal `bytes` always
/// return equal hashes, and the hash is stable across machines and runs.
#[must_use]
pub fn hash(bytes: &[u8]) -> String {
    checksums::sha256_hex(bytes)
}

/// Validates that `candidate` has the shape of a value produced by [`hash`]:
/// exactly 64 lowercase hexadecimal characters.
#[must_use]
pub fn is_well_formed_hash(candidate: &str) -> bool {
    candidate.len() == 64 && candidate.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
}

/// Classifies `bytes` as binary or text using a heuristic prefix scan.
///
/// Inspects at most [`BINARY_SNIFF_WINDOW`] bytes. A NUL byte anywhere in
/// that window is an immediate binary verdict. Otherwise the fraction of
/// "printable" bytes (0x20-0x7E plus tab/LF/CR) is compared against
/// [`PRINTABLE_RATIO_THRESHOLD`]; falling below it classifies the content as
/// binary. Empty input is always classified as text.
#[must_use]
pub fn is_binary(bytes: &[u8], _name: Option<&str>) -> bool {
    if bytes.is_empty() {
        return false;
    }

    let window = &bytes[..bytes.len().min(BINARY_SNIFF_WINDOW)];

    if window.contains(&0u8) {
        return true;
    }

    let printable = window.iter().filter(|&&b| is_printable(b)).count();
    let ratio = printable as f64 / window.len() as f64;
    ratio < PRINTABLE_RATIO_THRESHOLD
}

const fn is_printable(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7E | 0x09 | 0x0A | 0x0D)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_64_lowercase_hex_chars() {
        let digest = hash(b"hello world");
        assert!(is_well_formed_hash(&digest));
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash(b"same bytes"), hash(b"same bytes"));
    }

    #[test]
    fn hash_differs_for_different_payloads() {
        assert_ne!(hash(b"a"), hash(b"b"));
    }

    #[test]
    fn empty_input_is_text() {
        assert!(!is_binary(&[], None));
    }

    #[test]
    fn nul_byte_forces_binary() {
        assert!(is_binary(b"hello\0world", None));
    }

    #[test]
    fn plain_text_is_text() {
        let text = b"The quick brown fox jumps over the lazy dog.\nSecond line.\n";
        assert!(!is_binary(text, None));
    }

    #[test]
    fn mostly_control_bytes_are_binary() {
        let noisy: Vec<u8> = (0u8..=255).collect();
        assert!(is_binary(&noisy, None));
    }

    #[test]
    fn only_inspects_the_sniff_window() {
        let mut payload = vec![b'a'; BINARY_SNIFF_WINDOW];
        payload.extend(std::iter::repeat(0u8).take(1024));
        assert!(!is_binary(&payload, None));
    }

    #[test]
    fn malformed_hash_shapes_are_rejected() {
        assert!(!is_well_formed_hash("short"));
        assert!(!is_well_formed_hash(&"a".repeat(63)));
        assert!(!is_well_formed_hash(&"A".repeat(64)));
        assert!(!is_well_formed_hash(&"g".repeat(64)));
    }
}
