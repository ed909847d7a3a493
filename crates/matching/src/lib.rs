#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `matching` runs the rolling scan that turns a base ("old") byte sequence
//! and a [`signature::SignatureTable`] built over it into a sequence of
//! [`Operation`]s describing how to reconstruct a new byte sequence from the
//! old one plus literal data.
//!
//! # Design
//!
//! A 64-byte window is rolled byte by byte across `new` using
//! [`checksums::Adler32`]. At every position with a full window remaining,
//! the weak checksum is looked up in the signature table; any candidates are
//! disambiguated with a [`checksums::blake2b512`] strong hash before being
//! trusted. A confirmed match is extended forward as far as the bytes keep
//! agreeing, which lets a single [`Operation::Copy`] span more than one
//! block. Bytes that never match anything accumulate into
//! [`Operation::Insert`] runs.
//!
//! # Invariants
//!
//! - Concatenating the operations' represented bytes (copying from `old` or
//!   inserting literal data) reproduces `new` exactly.
//! - Adjacent `Insert` operations are coalesced; the scan never emits two in
//!   a row.
//! - A `Copy` is only emitted after its strong hash has been confirmed
//!   against the candidate block; a weak-hash hit alone is never trusted.

use checksums::Adler32;
use signature::SignatureTable;

/// One instruction for reconstructing a new byte sequence from an old one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Operation {
    /// Copy `length` bytes from `old` starting at `offset`.
    Copy {
        /// Byte offset into the base sequence.
        offset: usize,
        /// Number of bytes to copy.
        length: usize,
    },
    /// Insert these literal bytes, present in `new` but not found in `old`.
    Insert(Vec<u8>),
}

/// Scans `new` against a signature table built over `old`, returning the
/// operations needed to reconstruct `new` from `old`.
///
/// This only produces the operation stream; serialization and
/// reconstruction live in the `delta` crate.
///
/// The weak checksum is maintained as a rolling window: seeded once over the
/// first block, then updated by one byte per miss via
/// [`Adler32::roll`](checksums::Adler32::roll) rather than recomputed from
/// scratch, which is what keeps the scan O(`new.len()`) instead of
/// O(`new.len()` * block size).
#[must_use]
pub fn scan(old: &[u8], new: &[u8], table: &SignatureTable) -> Vec<Operation> {
    let block_size = signature::BLOCK_SIZE;
    let mut ops: Vec<Operation> = Vec::new();
    let mut pending_insert: Vec<u8> = Vec::new();
    let mut pos = 0usize;

    let flush_insert = |pending: &mut Vec<u8>, ops: &mut Vec<Operation>| {
        if !pending.is_empty() {
            ops.push(Operation::Insert(std::mem::take(pending)));
        }
    };

    if new.len() < block_size {
        pending_insert.extend_from_slice(new);
        flush_insert(&mut pending_insert, &mut ops);
        return ops;
    }

    let mut rolling = Adler32::new();
    rolling.update(&new[pos..pos + block_size]);
    let mut seeded = true;

    while pos < new.len() {
        let remaining = new.len() - pos;
        if remaining < block_size {
            pending_insert.extend_from_slice(&new[pos..]);
            break;
        }

        if !seeded {
            rolling = Adler32::new();
            rolling.update(&new[pos..pos + block_size]);
            seeded = true;
        }

        let window = &new[pos..pos + block_size];
        let weak = rolling.value();
        let candidates = table.candidates(weak);

        let confirmed = if candidates.is_empty() {
            None
        } else {
            let strong = checksums::blake2b512(window);
            candidates.iter().find(|c| c.strong == strong)
        };

        match confirmed {
            Some(candidate) => {
                flush_insert(&mut pending_insert, &mut ops);

                let base_offset = candidate.offset;
                let mut matched_len = block_size;
                while pos + matched_len < new.len()
                    && base_offset + matched_len < old.len()
                    && new[pos + matched_len] == old[base_offset + matched_len]
                {
                    matched_len += 1;
                }

                pos += matched_len;
                seeded = false;

                if let Some(Operation::Copy { offset, length }) = ops.last_mut() {
                    if *offset + *length == base_offset {
                        *length += matched_len;
                        continue;
                    }
                }

                #[cfg(feature = "tracing")]
                tracing::trace!(pos, base_offset, matched_len, "confirmed block match");

                ops.push(Operation::Copy {
                    offset: base_offset,
                    length: matched_len,
                });
            }
            None => {
                pending_insert.push(new[pos]);
                if pos + block_size < new.len() {
                    rolling
                        .roll(new[pos], new[pos + block_size], block_size)
                        .expect("rolling checksum was seeded with a full block above");
                }
                pos += 1;
            }
        }
    }

    flush_insert(&mut pending_insert, &mut ops);

    #[cfg(feature = "tracing")]
    tracing::debug!(old_len = old.len(), new_len = new.len(), operations = ops.len(), "scan complete");

    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use signature::SignatureTable;

    fn reconstruct(old: &[u8], ops: &[Operation]) -> Vec<u8> {
        let mut out = Vec::new();
        for op in ops {
            match op {
                Operation::Copy { offset, length } => {
                    out.extend_from_slice(&old[*offset..*offset + *length]);
                }
                Operation::Insert(data) => out.extend_from_slice(data),
            }
        }
        out
    }

    #[test]
    fn identical_input_is_a_single_copy() {
        let old = vec![7u8; signature::BLOCK_SIZE * 5];
        let new = old.clone();
        let table = SignatureTable::build(&old);
        let ops = scan(&old, &new, &table);

        assert_eq!(ops.len(), 1, "identical input should coalesce into one copy");
        assert_eq!(reconstruct(&old, &ops), new);
    }

    #[test]
    fn completely_different_input_is_a_single_insert() {
        let old = vec![1u8; signature::BLOCK_SIZE * 4];
        let new = vec![2u8; signature::BLOCK_SIZE * 4];
        let table = SignatureTable::build(&old);
        let ops = scan(&old, &new, &table);

        assert_eq!(ops.len(), 1);
        assert!(matches!(ops[0], Operation::Insert(_)));
        assert_eq!(reconstruct(&old, &ops), new);
    }

    #[test]
    fn one_byte_change_reconstructs_exactly() {
        let old: Vec<u8> = (0..(signature::BLOCK_SIZE * 10)).map(|i| (i % 200) as u8).collect();
        let mut new = old.clone();
        new[signature::BLOCK_SIZE * 5 + 3] ^= 0xff;
        let table = SignatureTable::build(&old);
        let ops = scan(&old, &new, &table);

        assert_eq!(reconstruct(&old, &ops), new);
        assert!(
            ops.iter().any(|op| matches!(op, Operation::Insert(_))),
            "a changed byte must surface as an insert"
        );
    }

    #[test]
    fn prepended_bytes_still_find_the_trailing_match() {
        let old = vec![9u8; signature::BLOCK_SIZE * 3];
        let mut new = vec![1, 2, 3, 4, 5];
        new.extend_from_slice(&old);
        let table = SignatureTable::build(&old);
        let ops = scan(&old, &new, &table);

        assert_eq!(reconstruct(&old, &ops), new);
        assert!(matches!(ops.first(), Some(Operation::Insert(_))));
    }

    #[test]
    fn empty_old_input_is_all_insert() {
        let table = SignatureTable::build(&[]);
        let new = b"hello world".to_vec();
        let ops = scan(&[], &new, &table);

        assert_eq!(ops.len(), 1);
        assert_eq!(reconstruct(&[], &ops), new);
    }

    #[test]
    fn empty_new_input_produces_no_operations() {
        let old = vec![1u8; signature::BLOCK_SIZE];
        let table = SignatureTable::build(&old);
        let ops = scan(&old, &[], &table);
        assert!(ops.is_empty());
    }

    #[test]
    fn trailing_short_remainder_is_inserted_literally() {
        let old = vec![3u8; signature::BLOCK_SIZE * 2];
        let mut new = old.clone();
        new.extend_from_slice(b"tail");
        let table = SignatureTable::build(&old);
        let ops = scan(&old, &new, &table);

        assert_eq!(reconstruct(&old, &ops), new);
        assert!(matches!(ops.last(), Some(Operation::Insert(data)) if data == b"tail"));
    }
}
