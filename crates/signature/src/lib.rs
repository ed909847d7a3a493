#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `signature` builds the block signature table the delta engine scans
//! against: a weak rolling checksum paired with a strong hash for every
//! fixed-size block of a base ("old") byte sequence.
//!
//! # Design
//!
//! [`BLOCK_SIZE`] blocks are hashed with [`checksums::Adler32`] (cheap,
//! collision-prone) and [`checksums::blake2b512`] (expensive, collision-safe).
//! The table maps weak hash to a list of candidate blocks sharing it, since
//! weak-hash collisions are expected and must be disambiguated by the caller
//! via the strong hash before a match is trusted.
//!
//! # Invariants
//!
//! - Every block except possibly the last is exactly [`BLOCK_SIZE`] bytes.
//! - The table is built in O(`old.len()`) time and owns O(`old.len()` /
//!   [`BLOCK_SIZE`]) auxiliary memory; it is not retained beyond the call
//!   that built it.

use rustc_hash::FxHashMap;

/// Fixed block size used to partition the base sequence.
pub const BLOCK_SIZE: usize = 64;

/// One block's position and strong hash, associated with a weak-hash bucket.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlockSignature {
    /// BLAKE2b-512 hex digest of the block's bytes.
    pub strong: String,
    /// Byte offset of the block within the base sequence.
    pub offset: usize,
    /// Length of the block in bytes (equal to [`BLOCK_SIZE`] except possibly
    /// for the final block).
    pub length: usize,
}

/// Block signature table over a base byte sequence.
///
/// Built once per delta-creation call via [`SignatureTable::build`], then
/// consulted by the scan in the `matching` crate. Collision chains (multiple
/// blocks sharing a weak hash) are expected and preserved in insertion order.
#[derive(Clone, Debug, Default)]
pub struct SignatureTable {
    buckets: FxHashMap<u32, Vec<BlockSignature>>,
}

impl SignatureTable {
    /// Partitions `old` into [`BLOCK_SIZE`]-byte blocks (the final block may
    /// be shorter) and indexes each by its weak Adler-32 checksum.
    ///
    /// With the `parallel` feature enabled, the per-block strong hashes are
    /// computed across a rayon thread pool before being folded into the
    /// table; the weak hash (cheap enough that parallelising it would not
    /// pay for itself) is still computed inline.
    #[must_use]
    pub fn build(old: &[u8]) -> Self {
        let mut buckets: FxHashMap<u32, Vec<BlockSignature>> =
            FxHashMap::with_capacity_and_hasher(old.len() / BLOCK_SIZE + 1, Default::default());

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let signed: Vec<(u32, BlockSignature)> = Self::blocks(old)
                .collect::<Vec<_>>()
                .into_par_iter()
                .map(|(offset, block)| {
                    let weak = checksums::Adler32::of(block);
                    let strong = checksums::blake2b512(block);
                    (
                        weak,
                        BlockSignature {
                            strong,
                            offset,
                            length: block.len(),
                        },
                    )
                })
                .collect();

            for (weak, signature) in signed {
                buckets.entry(weak).or_default().push(signature);
            }
        }

        #[cfg(not(feature = "parallel"))]
        for (offset, block) in Self::blocks(old) {
            let weak = checksums::Adler32::of(block);
            let strong = checksums::blake2b512(block);
            buckets.entry(weak).or_default().push(BlockSignature {
                strong,
                offset,
                length: block.len(),
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            old_len = old.len(),
            blocks = buckets.values().map(Vec::len).sum::<usize>(),
            buckets = buckets.len(),
            "signature table built"
        );

        Self { buckets }
    }

    /// Iterates `old` as `(offset, block)` pairs of at most [`BLOCK_SIZE`] bytes.
    fn blocks(old: &[u8]) -> impl Iterator<Item = (usize, &[u8])> {
        old.chunks(BLOCK_SIZE)
            .scan(0usize, |offset, block| {
                let this_offset = *offset;
                *offset += block.len();
                Some((this_offset, block))
            })
    }

    /// Candidate blocks sharing `weak_hash`, in the order they were inserted.
    ///
    /// Returns an empty slice (never a panic) when the weak hash has no
    /// matching block, which is the common case during a scan.
    #[must_use]
    pub fn candidates(&self, weak_hash: u32) -> &[BlockSignature] {
        self.buckets.get(&weak_hash).map_or(&[], Vec::as_slice)
    }

    /// Number of distinct weak-hash buckets in the table.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of blocks indexed, across all buckets.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}
