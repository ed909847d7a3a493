#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `webdvcs` is a content-addressed object store with rolling-checksum
//! delta compression, an object graph of blob/tree/commit objects,
//! branch-scoped transfer between repositories, and three-way tree
//! merge. This crate is the composition root: it wires the lower-level
//! `store`, `graph`, `merge`, and `transfer` crates behind a single
//! [`Repository`] handle and re-exports every type a collaborator (a
//! CLI, a staging area, an archive inspector — all out of this crate's
//! own scope) needs to drive them.
//!
//! # Design
//!
//! [`Repository`] holds nothing beyond an open [`store::ObjectStore`];
//! every method is a thin delegation to `graph`, `merge`, or `transfer`,
//! plus the handful of semantic checks those crates leave to a caller
//! (refusing an empty commit, refusing a merge of a branch with
//! itself or a branch that does not exist).
//!
//! # Invariants
//!
//! - `commit` never creates a commit whose tree is identical to its
//!   parent's tree.
//! - `merge` never calls into [`merge::merge_trees`] without first
//!   resolving both branches to existing refs.

mod error;

pub use error::RepositoryError;

pub use graph::{
    get_blob, get_commit, get_commit_history, get_optimized_history, get_tree, Commit, EntryKind,
    GraphError, Tree, TreeEntry, DEFAULT_EMAIL,
};
pub use merge::{merge_trees, Conflict, ConflictKind, MergeOutcome};
pub use store::{
    Compression, DeltaDecisionReason, DeltaStoreOutcome, ObjectStore, ObjectType, RefEntry,
    RefType, StoreError, StoreOutcome,
};
pub use transfer::{suggested_filename, ImportStats, TransferError, EXTENSION};

/// Metadata key holding the default commit author's display name.
pub const AUTHOR_NAME_KEY: &str = "author.name";
/// Metadata key holding the default commit author's email address.
pub const AUTHOR_EMAIL_KEY: &str = "author.email";

/// A single handle onto an object store plus the graph/merge/transfer
/// operations that make it useful: the composition root every
/// collaborator is expected to depend on instead of wiring the
/// component crates together itself.
pub struct Repository {
    store: ObjectStore,
}

impl Repository {
    /// Opens (or creates) the repository's database at `path`. `":memory:"`
    /// produces an ephemeral in-memory repository.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Store`] if the underlying database
    /// cannot be opened or migrated.
    pub fn open(path: &str) -> Result<Self, RepositoryError> {
        Ok(Self { store: ObjectStore::open(path)? })
    }

    /// Borrows the underlying object store, for collaborators that need
    /// direct access (e.g. storing a blob before building a tree around it).
    #[must_use]
    pub const fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Creates a commit on `branch` pointing at `tree`, and advances the
    /// branch ref to the new commit.
    ///
    /// The author name/email default to the `author.name`/`author.email`
    /// metadata keys (empty if unset, which `graph::commit_tree` maps to
    /// [`DEFAULT_EMAIL`]).
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NothingToCommit`] if `branch` already
    /// has a head commit whose tree equals `tree`, and propagates any
    /// lower-level store or graph failure otherwise.
    pub fn commit(
        &self,
        branch: &str,
        tree: &str,
        message: &str,
        timestamp: i64,
    ) -> Result<String, RepositoryError> {
        graph::validate_branch_name(branch)?;
        let ref_name = format!("refs/heads/{branch}");
        let parent = self.store.get_ref(&ref_name)?.map(|entry| entry.hash);

        if let Some(parent_hash) = &parent {
            let parent_commit = graph::get_commit(&self.store, parent_hash)?;
            if parent_commit.tree == tree {
                return Err(RepositoryError::NothingToCommit);
            }
        }

        let author = self.store.get_metadata(AUTHOR_NAME_KEY)?.unwrap_or_default();
        let email = self.store.get_metadata(AUTHOR_EMAIL_KEY)?.unwrap_or_default();

        let commit_hash =
            graph::commit_tree(&self.store, tree, parent.as_deref(), &author, &email, timestamp, message)?;
        self.store.set_ref(&ref_name, &commit_hash, RefType::Branch)?;
        Ok(commit_hash)
    }

    /// Three-way merges `source` into `current`, resolving both branch
    /// names to their head commits and the merge base between them.
    ///
    /// A missing merge base (unrelated histories) merges against an
    /// empty base tree, so every entry present on either side is
    /// classified as newly added rather than modified.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::MergeSameBranch`] if `current` and
    /// `source` name the same branch, [`RepositoryError::MergeBranchNotFound`]
    /// if either does not resolve to a ref, and propagates lower-level
    /// graph/store failures otherwise.
    pub fn merge(&self, current: &str, source: &str) -> Result<MergeOutcome, RepositoryError> {
        if current == source {
            return Err(RepositoryError::MergeSameBranch(current.to_string()));
        }

        let current_head = self.resolve_branch_head(current)?;
        let source_head = self.resolve_branch_head(source)?;

        let base_tree = match graph::find_merge_base(&self.store, &current_head, &source_head)? {
            Some(base_commit) => {
                let commit = graph::get_commit(&self.store, &base_commit)?;
                graph::get_tree(&self.store, &commit.tree)?
            }
            None => Tree::new(Vec::new()),
        };

        let current_commit = graph::get_commit(&self.store, &current_head)?;
        let source_commit = graph::get_commit(&self.store, &source_head)?;
        let current_tree = graph::get_tree(&self.store, &current_commit.tree)?;
        let source_tree = graph::get_tree(&self.store, &source_commit.tree)?;

        Ok(merge::merge_trees(&base_tree, &current_tree, &source_tree))
    }

    fn resolve_branch_head(&self, branch: &str) -> Result<String, RepositoryError> {
        self.store
            .get_ref(&format!("refs/heads/{branch}"))?
            .map(|entry| entry.hash)
            .ok_or_else(|| RepositoryError::MergeBranchNotFound(branch.to_string()))
    }

    /// Exports `branch`'s reachable subgraph as a standalone database file.
    ///
    /// # Errors
    ///
    /// See [`transfer::export_branch`].
    pub fn export_branch(&self, branch: &str) -> Result<Vec<u8>, RepositoryError> {
        Ok(transfer::export_branch(&self.store, branch)?)
    }

    /// Imports a branch previously produced by [`Self::export_branch`].
    ///
    /// # Errors
    ///
    /// See [`transfer::import_branch`].
    pub fn import_branch(&self, bytes: &[u8]) -> Result<ImportStats, RepositoryError> {
        Ok(transfer::import_branch(&self.store, bytes)?)
    }

    /// Deletes every stored object (and its delta row, if any) that is
    /// not reachable from some ref, returning the number of objects removed.
    ///
    /// # Errors
    ///
    /// Propagates any lower-level store or graph failure.
    pub fn garbage_collect(&self) -> Result<usize, RepositoryError> {
        let keep: std::collections::HashSet<String> =
            graph::collect_reachable_from_refs(&self.store)?.into_iter().collect();
        Ok(self.store.sweep_unreachable(&keep)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> Repository {
        Repository::open(":memory:").unwrap()
    }

    fn single_blob_tree(repo: &Repository, contents: &[u8]) -> String {
        let blob = repo.store().store_object(contents, ObjectType::Blob, Compression::Zlib).unwrap();
        let tree = Tree::new(vec![TreeEntry {
            name: "file.txt".to_string(),
            kind: EntryKind::File,
            hash: Some(blob.hash),
            mode: 0o100644,
            mtime: None,
            size: None,
            target: None,
            binary: None,
        }]);
        graph::store_tree(repo.store(), &tree).unwrap()
    }

    #[test]
    fn committing_the_same_tree_twice_is_rejected() {
        let repo = repo();
        let tree = single_blob_tree(&repo, b"v1");
        repo.commit("main", &tree, "first", 0).unwrap();

        let err = repo.commit("main", &tree, "no-op", 1).unwrap_err();
        assert!(matches!(err, RepositoryError::NothingToCommit));
    }

    #[test]
    fn committing_a_changed_tree_advances_the_branch() {
        let repo = repo();
        let tree_a = single_blob_tree(&repo, b"v1");
        let first = repo.commit("main", &tree_a, "first", 0).unwrap();

        let tree_b = single_blob_tree(&repo, b"v2");
        let second = repo.commit("main", &tree_b, "second", 1).unwrap();

        assert_ne!(first, second);
        let history = graph::get_commit_history(repo.store(), &second, 10).unwrap();
        assert_eq!(history, vec![second, first]);
    }

    #[test]
    fn merging_a_branch_with_itself_is_rejected() {
        let repo = repo();
        let tree = single_blob_tree(&repo, b"v1");
        repo.commit("main", &tree, "first", 0).unwrap();

        let err = repo.merge("main", "main").unwrap_err();
        assert!(matches!(err, RepositoryError::MergeSameBranch(name) if name == "main"));
    }

    #[test]
    fn merging_an_unknown_branch_is_rejected() {
        let repo = repo();
        let tree = single_blob_tree(&repo, b"v1");
        repo.commit("main", &tree, "first", 0).unwrap();

        let err = repo.merge("main", "does-not-exist").unwrap_err();
        assert!(matches!(err, RepositoryError::MergeBranchNotFound(name) if name == "does-not-exist"));
    }

    #[test]
    fn garbage_collection_keeps_only_what_a_ref_can_reach() {
        let repo = repo();
        let tree_a = single_blob_tree(&repo, b"v1");
        repo.commit("main", &tree_a, "first", 0).unwrap();

        // an orphaned blob stored but never committed
        repo.store().store_object(b"orphan", ObjectType::Blob, Compression::Zlib).unwrap();

        let removed = repo.garbage_collect().unwrap();
        assert_eq!(removed, 1);
    }
}
