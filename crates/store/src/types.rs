//! Row-level types shared across the object store's public API.

use crate::error::StoreError;

/// The four kinds of object the store persists.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ObjectType {
    /// Opaque byte payload.
    Blob,
    /// Sorted directory-entry listing.
    Tree,
    /// Tree snapshot plus parentage and authorship metadata.
    Commit,
    /// A placeholder row whose real payload lives in the `deltas` table.
    Delta,
}

impl ObjectType {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
            Self::Delta => "delta",
        }
    }

    pub(crate) fn parse(raw: &str) -> Result<Self, StoreError> {
        match raw {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            "delta" => Ok(Self::Delta),
            other => Err(StoreError::CorruptEnumValue {
                column: "objects.type",
                value: other.to_string(),
            }),
        }
    }
}

/// How an object row's `data` column is encoded.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Compression {
    /// `data` holds the payload verbatim.
    None,
    /// `data` holds the payload zlib-compressed.
    Zlib,
    /// `data` is an empty placeholder; the real payload is reconstructed from a delta.
    Delta,
}

impl Compression {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Zlib => "zlib",
            Self::Delta => "delta",
        }
    }

    pub(crate) fn parse(raw: &str) -> Result<Self, StoreError> {
        match raw {
            "none" => Ok(Self::None),
            "zlib" => Ok(Self::Zlib),
            "delta" => Ok(Self::Delta),
            other => Err(StoreError::Database(rusqlite::Error::InvalidColumnType(
                0,
                format!("unknown compression {other:?}"),
                rusqlite::types::Type::Text,
            ))),
        }
    }
}

/// An object as reconstructed for a caller: decompressed or delta-reconstructed,
/// indistinguishable from one another once returned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoredObject {
    /// Content hash identifying this object.
    pub hash: String,
    /// Which kind of object this is.
    pub object_type: ObjectType,
    /// The object's uncompressed payload.
    pub data: Vec<u8>,
    /// Length of `data` in bytes.
    pub size: usize,
}

/// Whether a ref names a branch head or a tag.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum RefType {
    /// A mutable branch head under `refs/heads/`.
    Branch,
    /// A tag under `refs/tags/`.
    Tag,
}

impl RefType {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Branch => "branch",
            Self::Tag => "tag",
        }
    }

    pub(crate) fn parse(raw: &str) -> Result<Self, StoreError> {
        match raw {
            "branch" => Ok(Self::Branch),
            "tag" => Ok(Self::Tag),
            other => Err(StoreError::Database(rusqlite::Error::InvalidColumnType(
                0,
                format!("unknown ref type {other:?}"),
                rusqlite::types::Type::Text,
            ))),
        }
    }
}

/// A name-to-hash pointer, with its kind and timestamps.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefEntry {
    /// Full ref path, e.g. `refs/heads/main`.
    pub name: String,
    /// Hash the ref currently points at.
    pub hash: String,
    /// Whether this is a branch head or a tag.
    pub ref_type: RefType,
    /// Unix timestamp the ref was first created.
    pub created_at: i64,
    /// Unix timestamp the ref was last updated.
    pub updated_at: i64,
}

/// Result of [`crate::ObjectStore::store_object`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoreOutcome {
    /// Content hash of the stored object.
    pub hash: String,
    /// Whether this call actually inserted a new row, or the hash already existed.
    pub is_new: bool,
}

/// Why [`crate::ObjectStore::store_blob_with_delta`] did or didn't use a delta.
///
/// These mirror the reason codes the storage layer reports as a successful
/// fallback signal rather than an error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeltaDecisionReason {
    /// The hash was already present; nothing was stored.
    AlreadyPresent,
    /// No base hash was supplied, so the blob was stored in full.
    NoBaseProvided,
    /// The supplied base hash does not resolve to a stored object.
    BaseNotFound,
    /// A delta was computed but did not clear the worthwhile threshold.
    DeltaNotBeneficial,
    /// A delta was computed, cleared the worthwhile threshold, and was stored.
    DeltaStored,
}

impl DeltaDecisionReason {
    /// Stable string form of this reason, suitable for logging or display to a caller.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyPresent => "already_present",
            Self::NoBaseProvided => "no_base_provided",
            Self::BaseNotFound => "base_not_found",
            Self::DeltaNotBeneficial => "delta_not_beneficial",
            Self::DeltaStored => "delta_stored",
        }
    }
}

/// An object row exactly as stored on disk: `data` is left in whatever
/// form `compression` says it is in (raw, zlib-compressed, or an empty
/// delta placeholder), not decompressed or reconstructed.
///
/// Used by branch transfer to copy rows between stores verbatim, so a
/// pre-compressed payload is never re-compressed on import.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawObject {
    /// Content hash identifying this object.
    pub hash: String,
    /// Which kind of object this is.
    pub object_type: ObjectType,
    /// The stored bytes, exactly as persisted (not decompressed).
    pub data: Vec<u8>,
    /// Length of the *uncompressed* payload in bytes.
    pub size: usize,
    /// How `data` is encoded.
    pub compression: Compression,
}

/// A delta row exactly as stored on disk, for verbatim transfer between stores.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawDelta {
    /// Hash of the object this delta reconstructs.
    pub hash: String,
    /// Hash of the base object this delta is relative to.
    pub base_hash: String,
    /// Serialized, compressed operation list.
    pub delta_data: Vec<u8>,
    /// Length of the reconstructed payload in bytes.
    pub original_size: usize,
    /// Length of `delta_data` in bytes.
    pub delta_size: usize,
    /// Ratio of `delta_size` to `original_size`.
    pub compression_ratio: f64,
}

/// Result of [`crate::ObjectStore::store_blob_with_delta`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeltaStoreOutcome {
    /// Content hash of the stored (or already-present) blob.
    pub hash: String,
    /// Whether the blob ended up stored as a delta against its base.
    pub used_delta: bool,
    /// Why the decision came out the way it did.
    pub reason: DeltaDecisionReason,
    /// Ratio of compressed delta size to original size, when a delta was computed at all.
    pub compression_ratio: Option<f64>,
}
