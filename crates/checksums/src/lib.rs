#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `checksums` provides the weak and strong digest primitives the delta engine
//! and object store build on: a rolling Adler-32 checksum for block matching and
//! a pair of fixed-size content digests (BLAKE2b-512 for delta block signatures,
//! SHA-256 for object identity).
//!
//! # Design
//!
//! - [`adler`] implements the rolling checksum (`Adler32`) used to scan a `new`
//!   buffer for blocks that already exist in `old` without rehashing every byte.
//! - [`strong`] wraps [`blake2`] and [`sha2`] behind small, panic-free digest
//!   helpers so higher layers never reach for the underlying crates directly.
//!
//! # Invariants
//!
//! - `Adler32` truncates both accumulators modulo [`adler::BASE`] after every
//!   update, matching the classical zlib/rsync definition.
//! - The rolling update computes the `w * x_out` term in 64 bits before
//!   reducing modulo `BASE`, since it can exceed 32 bits for large windows.
//!
//! # Errors
//!
//! [`adler::RollError`] reports malformed rolling-window updates (mismatched
//! slice lengths, empty windows).

pub mod adler;
pub mod strong;

pub use adler::{Adler32, RollError};
pub use strong::{blake2b512, sha256_hex};
