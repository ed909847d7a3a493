use hashing::{hash, is_binary, is_well_formed_hash};
use proptest::prelude::*;

proptest! {
    #[test]
    fn hash_roundtrips_shape(bytes in proptest::collection::vec(any::<u8>(), 0..4096)) {
        prop_assert!(is_well_formed_hash(&hash(&bytes)));
    }

    #[test]
    fn hash_is_stable_under_repetition(bytes in proptest::collection::vec(any::<u8>(), 0..4096)) {
        prop_assert_eq!(hash(&bytes), hash(&bytes));
    }

    #[test]
    fn is_binary_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..16_384)) {
        let _ = is_binary(&bytes, None);
    }

    #[test]
    fn printable_ascii_text_is_never_binary(
        text in "[ -~\\n\\r\\t]{0,4096}"
    ) {
        prop_assert!(!is_binary(text.as_bytes(), None));
    }
}
