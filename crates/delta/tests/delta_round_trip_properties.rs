//! Integration tests exercising delta creation and reconstruction over larger,
//! more varied inputs than the crate's unit tests.

use delta::{apply, create};

#[test]
fn large_text_with_a_single_inserted_paragraph_round_trips() {
    let old = "the quick brown fox jumps over the lazy dog\n".repeat(500);
    let mut new = old.clone();
    new.insert_str(old.len() / 2, "an entirely new paragraph was inserted here\n");

    let delta = create(old.as_bytes(), new.as_bytes());
    let reconstructed = apply(old.as_bytes(), &delta.operations, delta.original_size, &delta.new_hash).unwrap();

    assert_eq!(reconstructed, new.as_bytes());
    assert!(delta.is_worthwhile());
}

#[test]
fn reordering_large_chunks_still_round_trips() {
    let chunk_a = vec![0x10u8; 4096];
    let chunk_b = vec![0x20u8; 4096];
    let chunk_c = vec![0x30u8; 4096];

    let mut old = Vec::new();
    old.extend_from_slice(&chunk_a);
    old.extend_from_slice(&chunk_b);
    old.extend_from_slice(&chunk_c);

    let mut new = Vec::new();
    new.extend_from_slice(&chunk_c);
    new.extend_from_slice(&chunk_b);
    new.extend_from_slice(&chunk_a);

    let delta = create(&old, &new);
    let reconstructed = apply(&old, &delta.operations, delta.original_size, &delta.new_hash).unwrap();

    assert_eq!(reconstructed, new);
}

#[test]
fn empty_old_and_empty_new_round_trip_to_nothing() {
    let delta = create(&[], &[]);
    let reconstructed = apply(&[], &delta.operations, delta.original_size, &delta.new_hash).unwrap();
    assert!(reconstructed.is_empty());
}

#[test]
fn wire_format_round_trips_through_serialize_and_deserialize() {
    let old: Vec<u8> = (0..10_000).map(|i| (i % 97) as u8).collect();
    let mut new = old.clone();
    new[2500..2600].fill(0xAB);

    let built = create(&old, &new);
    let wire = built.serialize();
    let decoded = delta::deserialize_operations(&wire).unwrap();
    let reconstructed = apply(&old, &decoded, built.original_size, &built.new_hash).unwrap();

    assert_eq!(reconstructed, new);
}
