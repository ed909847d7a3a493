//! Error types surfaced by the object store.

/// Everything that can go wrong storing, fetching, or validating objects.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying database rejected or failed to execute a statement.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A zlib-compressed object's bytes failed to inflate.
    #[error("failed to inflate object payload: {0}")]
    Inflate(#[source] std::io::Error),

    /// A delta's serialized operations failed to reconstruct the object they describe.
    #[error("failed to reconstruct object {hash} from its delta chain: {source}")]
    Reconstruct {
        /// Hash of the object that failed to reconstruct.
        hash: String,
        /// Underlying reconstruction failure.
        #[source]
        source: delta::ReconstructError,
    },

    /// A delta chain revisited a hash it had already walked through.
    #[error("delta chain for {0} contains a cycle")]
    CyclicDeltaChain(String),

    /// A delta chain exceeded the configured maximum depth before terminating.
    #[error("delta chain for {hash} exceeds the maximum depth of {max_depth}")]
    ChainTooDeep {
        /// Hash the chain walk started from.
        hash: String,
        /// Configured maximum depth.
        max_depth: u32,
    },

    /// An object row is marked delta-compressed but has no companion row in `deltas`.
    #[error("object {0} is marked as a delta but has no delta record")]
    MissingDeltaRecord(String),

    /// A delta's base hash does not correspond to any stored object.
    #[error("delta base object {0} is missing")]
    BaseObjectMissing(String),

    /// `store_object` was asked to store a row with delta compression directly.
    ///
    /// Delta-compressed rows may only be written by [`crate::ObjectStore::store_blob_with_delta`],
    /// which also writes the companion `deltas` row atomically.
    #[error("store_object cannot write delta-compressed rows directly")]
    DeltaCompressionNotDirectlyStorable,

    /// A row's `type`/`compression` column held a value outside its expected enum.
    #[error("column {column} holds unrecognised value {value:?}")]
    CorruptEnumValue {
        /// Name of the offending column.
        column: &'static str,
        /// The unrecognised value read from it.
        value: String,
    },
}
