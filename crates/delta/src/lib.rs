#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `delta` ties the signature table and rolling scan together into a
//! complete delta: creation, a compact wire serialization, and
//! hash-verified reconstruction.
//!
//! # Design
//!
//! [`create`] builds a [`signature::SignatureTable`] over the base sequence
//! and scans the new sequence against it via [`matching::scan`]. The
//! resulting [`Operation`] list is serialized as a 4-byte big-endian
//! operation count followed by each operation (`COPY` tag `0x00` plus
//! big-endian length and offset; `INSERT` tag `0x01` plus big-endian length
//! and raw bytes), then compressed with deflate. [`apply`] reverses this:
//! inflate, parse, replay the operations into a fresh buffer, and verify the
//! result's hash before returning it.
//!
//! # Invariants
//!
//! - `apply(old, &create(old, new)) == Ok(new)` for any `old`/`new` pair.
//! - Reconstruction never trusts operation data without checking it: a size
//!   mismatch, an out-of-bounds copy, an unrecognised tag, a truncated
//!   stream, and a final hash mismatch are each reported as a distinct
//!   [`ReconstructError`] variant.

pub use matching::Operation;

use signature::SignatureTable;
use std::io::{self, Read, Write};

/// A COPY operation's tag byte in the serialized wire format.
const TAG_COPY: u8 = 0x00;
/// An INSERT operation's tag byte in the serialized wire format.
const TAG_INSERT: u8 = 0x01;

/// A delta describing `new` as edits against `old`.
///
/// Carries enough bookkeeping (`original_size`, `old_hash`, `new_hash`) for
/// the object store to validate reconstruction without re-deriving it from
/// the operation list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Delta {
    /// The edit operations, in order.
    pub operations: Vec<Operation>,
    /// Length in bytes of the sequence this delta reconstructs.
    pub original_size: usize,
    /// Content hash of the base sequence the delta is relative to.
    pub old_hash: String,
    /// Content hash of the sequence this delta reconstructs.
    pub new_hash: String,
}

impl Delta {
    /// Serializes the operation list to the compact, deflate-compressed wire format.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        serialize_operations(&self.operations)
    }

    /// Size in bytes of the serialized, compressed operation stream.
    ///
    /// Computed on demand rather than cached, since it is only consulted
    /// once per store decision.
    #[must_use]
    pub fn delta_size(&self) -> usize {
        self.serialize().len()
    }

    /// Ratio of compressed delta size to original size; lower is better.
    ///
    /// Returns `0.0` for a zero-length original, treating "nothing to
    /// reconstruct" as maximally favorable rather than dividing by zero.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.delta_size() as f64 / self.original_size as f64
    }

    /// Whether storing this delta is smaller than half the original size.
    ///
    /// The object store decides whether to actually apply this threshold;
    /// this only exposes the comparison spec'd by the delta engine itself.
    #[must_use]
    pub fn is_worthwhile(&self) -> bool {
        (self.delta_size() as f64) < 0.5 * self.original_size as f64
    }
}

/// Builds a delta reconstructing `new` from `old`.
///
/// Runs in O(`old.len()` + `new.len()`) time and uses O(`old.len()` / 64)
/// auxiliary memory for the short-lived signature table, which is freed
/// when this call returns.
#[must_use]
pub fn create(old: &[u8], new: &[u8]) -> Delta {
    let table = SignatureTable::build(old);
    let operations = matching::scan(old, new, &table);

    #[cfg(feature = "tracing")]
    tracing::trace!(old_len = old.len(), new_len = new.len(), operations = operations.len(), "delta created");

    Delta {
        operations,
        original_size: new.len(),
        old_hash: hashing::hash(old),
        new_hash: hashing::hash(new),
    }
}

/// Serializes an operation list to the compact, deflate-compressed wire format.
#[must_use]
pub fn serialize_operations(operations: &[Operation]) -> Vec<u8> {
    let mut raw = Vec::new();
    raw.extend_from_slice(&(operations.len() as u32).to_be_bytes());

    for op in operations {
        match op {
            Operation::Copy { offset, length } => {
                raw.push(TAG_COPY);
                raw.extend_from_slice(&(*length as u32).to_be_bytes());
                raw.extend_from_slice(&(*offset as u32).to_be_bytes());
            }
            Operation::Insert(data) => {
                raw.push(TAG_INSERT);
                raw.extend_from_slice(&(data.len() as u32).to_be_bytes());
                raw.extend_from_slice(data);
            }
        }
    }

    let mut encoder = flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(&raw)
        .expect("writing to an in-memory buffer cannot fail");
    encoder
        .finish()
        .expect("finishing an in-memory deflate stream cannot fail")
}

/// Inflates and parses a serialized operation stream.
///
/// # Errors
///
/// Returns [`ReconstructError::Truncated`] if the stream ends mid-field,
/// [`ReconstructError::UnknownOperationTag`] on an unrecognised tag byte,
/// and [`ReconstructError::Inflate`] if the deflate stream itself is
/// malformed.
pub fn deserialize_operations(compressed: &[u8]) -> Result<Vec<Operation>, ReconstructError> {
    let mut decoder = flate2::read::DeflateDecoder::new(compressed);
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw).map_err(ReconstructError::Inflate)?;

    let mut cursor = Cursor::new(&raw);
    let count = cursor.read_u32()? as usize;
    let mut operations = Vec::with_capacity(count);

    for _ in 0..count {
        let tag = cursor.read_u8()?;
        match tag {
            TAG_COPY => {
                let length = cursor.read_u32()? as usize;
                let offset = cursor.read_u32()? as usize;
                operations.push(Operation::Copy { offset, length });
            }
            TAG_INSERT => {
                let length = cursor.read_u32()? as usize;
                let data = cursor.read_bytes(length)?;
                operations.push(Operation::Insert(data));
            }
            other => return Err(ReconstructError::UnknownOperationTag(other)),
        }
    }

    Ok(operations)
}

/// Replays `operations` against `old`, reconstructing the original byte
/// sequence and verifying it against `expected_new_hash`.
///
/// # Errors
///
/// Returns a distinct [`ReconstructError`] variant for each way
/// reconstruction can fail: a length mismatch against `original_size`, a
/// `COPY` reading past the end of `old`, or a hash mismatch after
/// reconstruction completes.
pub fn apply(
    old: &[u8],
    operations: &[Operation],
    original_size: usize,
    expected_new_hash: &str,
) -> Result<Vec<u8>, ReconstructError> {
    let mut out = Vec::with_capacity(original_size);

    for op in operations {
        match op {
            Operation::Copy { offset, length } => {
                let end = offset.checked_add(*length).ok_or(ReconstructError::CopyOutOfBounds {
                    offset: *offset,
                    length: *length,
                    base_len: old.len(),
                })?;
                if end > old.len() {
                    return Err(ReconstructError::CopyOutOfBounds {
                        offset: *offset,
                        length: *length,
                        base_len: old.len(),
                    });
                }
                out.extend_from_slice(&old[*offset..end]);
            }
            Operation::Insert(data) => out.extend_from_slice(data),
        }
    }

    if out.len() != original_size {
        return Err(ReconstructError::SizeMismatch {
            expected: original_size,
            actual: out.len(),
        });
    }

    let actual_hash = hashing::hash(&out);
    if actual_hash != expected_new_hash {
        #[cfg(feature = "tracing")]
        tracing::debug!(expected = expected_new_hash, actual = %actual_hash, "reconstructed hash mismatch");
        return Err(ReconstructError::HashMismatch {
            expected: expected_new_hash.to_string(),
            actual: actual_hash,
        });
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(operations = operations.len(), size = out.len(), "delta applied");

    Ok(out)
}

/// Every way reconstructing a byte sequence from a delta can fail.
#[derive(Debug, thiserror::Error)]
pub enum ReconstructError {
    /// The reconstructed buffer's length did not match the delta's recorded `original_size`.
    #[error("reconstructed {actual} bytes, expected {expected}")]
    SizeMismatch {
        /// Length the delta claimed to reconstruct.
        expected: usize,
        /// Length actually produced.
        actual: usize,
    },
    /// A `COPY` operation referenced bytes past the end of the base sequence.
    #[error("copy of {length} bytes at offset {offset} exceeds base length {base_len}")]
    CopyOutOfBounds {
        /// Offset the copy started at.
        offset: usize,
        /// Number of bytes the copy requested.
        length: usize,
        /// Length of the base sequence it was read against.
        base_len: usize,
    },
    /// The serialized stream contained a tag byte that is neither `COPY` nor `INSERT`.
    #[error("unrecognised delta operation tag {0:#04x}")]
    UnknownOperationTag(u8),
    /// The serialized stream ended before a field it promised was fully read.
    #[error("truncated delta stream")]
    Truncated,
    /// Reconstruction completed but hashed to something other than the expected value.
    #[error("reconstructed content hash {actual} does not match expected {expected}")]
    HashMismatch {
        /// Hash the delta claimed the result would have.
        expected: String,
        /// Hash actually computed over the reconstructed bytes.
        actual: String,
    },
    /// The deflate-compressed stream itself could not be inflated.
    #[error("failed to inflate delta stream: {0}")]
    Inflate(#[source] io::Error),
}

/// Minimal big-endian cursor over the decompressed operation stream.
///
/// Kept private: callers only ever see the parsed [`Operation`] list or a
/// [`ReconstructError`], never this intermediate reader.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_u8(&mut self) -> Result<u8, ReconstructError> {
        let byte = *self.data.get(self.pos).ok_or(ReconstructError::Truncated)?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_u32(&mut self) -> Result<u32, ReconstructError> {
        let end = self.pos + 4;
        let slice = self.data.get(self.pos..end).ok_or(ReconstructError::Truncated)?;
        self.pos = end;
        Ok(u32::from_be_bytes(slice.try_into().expect("slice is exactly 4 bytes")))
    }

    fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>, ReconstructError> {
        let end = self.pos + length;
        let slice = self.data.get(self.pos..end).ok_or(ReconstructError::Truncated)?;
        self.pos = end;
        Ok(slice.to_vec())
    }
}
