//! Fixed-size content digests used for object identity and delta block verification.

use blake2::Blake2b512;
use blake2::Digest as _;
use sha2::Sha256;

/// SHA-256 over `bytes`, rendered as 64 lowercase hex characters.
///
/// This is the content hash used to name every object in the store: trees,
/// commits, blobs, and reconstructed delta payloads are all addressed by this
/// function's output.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    hex::encode(digest)
}

/// BLAKE2b-512 over `bytes`, rendered as 128 lowercase hex characters.
///
/// Used as the strong hash in the delta engine's block signature table: a
/// weak-hash hit is only trusted once the matching block's BLAKE2b-512 digest
/// also agrees, which is what makes hash collisions in the 32-bit rolling
/// checksum harmless.
#[must_use]
pub fn blake2b512(bytes: &[u8]) -> String {
    let mut hasher = Blake2b512::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_empty_matches_known_vector() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
    }

    #[test]
    fn sha256_is_64_hex_chars() {
        let digest = sha256_hex(b"hello world");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn blake2b512_is_128_hex_chars() {
        let digest = blake2b512(b"hello world");
        assert_eq!(digest.len(), 128);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn deterministic_across_calls() {
        assert_eq!(sha256_hex(b"abc"), sha256_hex(b"abc"));
        assert_eq!(blake2b512(b"abc"), blake2b512(b"abc"));
    }
}
