//! Integration tests for signature table construction over larger inputs.

use signature::{SignatureTable, BLOCK_SIZE};

#[test]
fn covers_every_byte_of_a_multi_megabyte_input() {
    let old: Vec<u8> = (0..(BLOCK_SIZE * 20_000)).map(|i| (i % 251) as u8).collect();
    let table = SignatureTable::build(&old);

    let expected_blocks = old.len().div_ceil(BLOCK_SIZE);
    assert_eq!(table.block_count(), expected_blocks);
}

#[test]
fn repeated_pattern_produces_heavy_collisions_but_stays_correct() {
    let pattern = vec![0xABu8; BLOCK_SIZE];
    let old: Vec<u8> = pattern.iter().copied().cycle().take(BLOCK_SIZE * 50).collect();
    let table = SignatureTable::build(&old);

    assert_eq!(table.block_count(), 50);
    assert_eq!(table.bucket_count(), 1, "identical blocks must collide into one bucket");
}

#[test]
fn single_byte_input_forms_one_short_block() {
    let table = SignatureTable::build(&[42u8]);
    assert_eq!(table.block_count(), 1);
}
