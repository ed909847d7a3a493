//! Errors surfaced by [`crate::Repository`]'s composed operations.

/// Everything that can go wrong driving a [`crate::Repository`].
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The object store failed.
    #[error(transparent)]
    Store(#[from] store::StoreError),

    /// The object graph failed to build, encode, or walk.
    #[error(transparent)]
    Graph(#[from] graph::GraphError),

    /// Branch export or import failed.
    #[error(transparent)]
    Transfer(#[from] transfer::TransferError),

    /// The new tree is identical to the current branch head's tree, so
    /// there is nothing to commit.
    #[error("nothing to commit: tree is unchanged from branch head")]
    NothingToCommit,

    /// A merge was requested between a branch and itself.
    #[error("cannot merge branch {0:?} into itself")]
    MergeSameBranch(String),

    /// A merge named a branch with no matching ref.
    #[error("branch {0:?} not found")]
    MergeBranchNotFound(String),
}
