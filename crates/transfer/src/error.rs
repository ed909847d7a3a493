//! Error types surfaced while exporting or importing a branch.

/// Everything that can go wrong exporting or importing a branch.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The branch ref did not exist in the source store.
    #[error("branch {0:?} not found")]
    BranchNotFound(String),

    /// The bytes handed to [`crate::import_branch`] did not begin with the
    /// expected database file magic.
    #[error("not a valid branch transfer file: unrecognised header")]
    InvalidFormat,

    /// A filesystem operation on the temporary transfer file failed.
    #[error("transfer I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The object store failed.
    #[error(transparent)]
    Store(#[from] store::StoreError),

    /// The object graph failed to walk or decode.
    #[error(transparent)]
    Graph(#[from] graph::GraphError),
}
