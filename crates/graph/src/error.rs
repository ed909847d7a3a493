//! Error types surfaced while encoding, decoding, or walking the object graph.

/// Everything that can go wrong building or walking the blob/tree/commit graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The underlying object store failed.
    #[error(transparent)]
    Store(#[from] store::StoreError),

    /// A hash-shaped argument was not 64 lowercase hex characters.
    #[error("malformed hash: {0:?}")]
    MalformedHash(String),

    /// No commit object exists with this hash.
    #[error("commit {0} not found")]
    CommitNotFound(String),

    /// No tree object exists with this hash.
    #[error("tree {0} not found")]
    TreeNotFound(String),

    /// A stored tree payload could not be parsed as the canonical tree encoding.
    #[error("malformed tree encoding at line {line}: {reason}")]
    InvalidTreeEncoding {
        /// 1-based line number of the offending entry.
        line: usize,
        /// Human-readable description of what was wrong with it.
        reason: String,
    },

    /// A stored commit payload could not be parsed as the canonical commit encoding.
    #[error("malformed commit encoding: {0}")]
    InvalidCommitEncoding(String),

    /// A commit message contained an embedded newline, which the canonical
    /// encoding cannot represent (a commit message is a single logical line).
    #[error("commit message must not contain embedded newlines")]
    MessageContainsNewline,

    /// A branch or tag leaf name was empty or contained a `/`.
    #[error("invalid ref leaf name: {0:?}")]
    InvalidRefName(String),
}
