//! Integration tests for the rolling scan over larger, more varied inputs.

use matching::{scan, Operation};
use signature::{SignatureTable, BLOCK_SIZE};

fn reconstruct(old: &[u8], ops: &[Operation]) -> Vec<u8> {
    let mut out = Vec::new();
    for op in ops {
        match op {
            Operation::Copy { offset, length } => out.extend_from_slice(&old[*offset..*offset + *length]),
            Operation::Insert(data) => out.extend_from_slice(data),
        }
    }
    out
}

#[test]
fn middle_block_removed_still_reconstructs() {
    let old: Vec<u8> = (0..(BLOCK_SIZE * 30)).map(|i| (i % 113) as u8).collect();
    let mut new = old[..BLOCK_SIZE * 10].to_vec();
    new.extend_from_slice(&old[BLOCK_SIZE * 15..]);

    let table = SignatureTable::build(&old);
    let ops = scan(&old, &new, &table);

    assert_eq!(reconstruct(&old, &ops), new);
}

#[test]
fn shuffled_blocks_each_still_resolve_to_a_copy() {
    let block_a = vec![0xAAu8; BLOCK_SIZE];
    let block_b = vec![0xBBu8; BLOCK_SIZE];
    let block_c = vec![0xCCu8; BLOCK_SIZE];

    let mut old = Vec::new();
    old.extend_from_slice(&block_a);
    old.extend_from_slice(&block_b);
    old.extend_from_slice(&block_c);

    let mut new = Vec::new();
    new.extend_from_slice(&block_c);
    new.extend_from_slice(&block_a);
    new.extend_from_slice(&block_b);

    let table = SignatureTable::build(&old);
    let ops = scan(&old, &new, &table);

    assert_eq!(reconstruct(&old, &ops), new);
    assert!(
        ops.iter().all(|op| matches!(op, Operation::Copy { .. })),
        "every shuffled block should resolve to a copy, not an insert"
    );
}

#[test]
fn repeated_large_insert_region_round_trips() {
    let old = vec![5u8; BLOCK_SIZE * 4];
    let mut new = old[..BLOCK_SIZE * 2].to_vec();
    new.extend(std::iter::repeat(b'x').take(BLOCK_SIZE * 3));
    new.extend_from_slice(&old[BLOCK_SIZE * 2..]);

    let table = SignatureTable::build(&old);
    let ops = scan(&old, &new, &table);

    assert_eq!(reconstruct(&old, &ops), new);
}

#[test]
fn byte_at_a_time_growth_always_round_trips() {
    let old: Vec<u8> = (0..(BLOCK_SIZE * 5)).map(|i| (i % 251) as u8).collect();
    let table = SignatureTable::build(&old);

    for extra_len in 0..=BLOCK_SIZE {
        let mut new = old.clone();
        new.extend((0..extra_len).map(|i| (200 + i) as u8));
        let ops = scan(&old, &new, &table);
        assert_eq!(reconstruct(&old, &ops), new, "mismatch at extra_len={extra_len}");
    }
}
