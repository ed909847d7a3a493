#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `graph` layers the blob/tree/commit object graph on top of `store`'s
//! flat, hash-addressed rows: canonical tree/commit encodings, commit
//! history traversal, merge-base discovery, the branch-export-sized
//! "optimised history", and the reachability closure that both garbage
//! collection and branch transfer are built from.
//!
//! # Design
//!
//! Trees and commits are plain structs ([`Tree`], [`Commit`]) with
//! `encode`/`decode` to and from the canonical text payload `store`
//! persists them as; this crate never reaches into `store`'s schema
//! directly, only its `get_object`/`store_object` API. The history walk,
//! merge-base search, and reachability closure are expressed as small,
//! independent graph algorithms over commit/tree hashes rather than any
//! shared traversal abstraction, matching how directly `spec.md` §4.4
//! describes each one.
//!
//! # Invariants
//!
//! - The object graph is a DAG: a commit's parent hash is chosen before
//!   the commit itself is hashed, so no cycle-breaking machinery is
//!   needed in the common case. [`get_commit_history`] and
//!   [`collect_reachable`] still track visited sets defensively, since a
//!   corrupt or maliciously constructed store could otherwise spin
//!   forever.
//! - [`Tree::encode`]/[`Tree::decode`] round-trip exactly: two trees with
//!   the same entries always produce the same bytes, and therefore the
//!   same hash.

mod commit;
mod error;
mod tree;

pub use commit::{Commit, DEFAULT_EMAIL};
pub use error::GraphError;
pub use tree::{EntryKind, Tree, TreeEntry};

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use store::{Compression, ObjectStore, ObjectType, RefType};

/// Validates that `hash` has the shape [`hashing::hash`] produces: 64
/// lowercase hex characters.
///
/// Every public entry point here that accepts a caller-supplied hash
/// (rather than one this crate already derived internally, e.g. while
/// walking a tree it just decoded) calls this first, per `spec.md` §6:
/// "any API accepting hashes must reject other shapes."
///
/// # Errors
///
/// Returns [`GraphError::MalformedHash`] otherwise.
fn validate_hash(hash: &str) -> Result<(), GraphError> {
    if hashing::is_well_formed_hash(hash) {
        Ok(())
    } else {
        Err(GraphError::MalformedHash(hash.to_string()))
    }
}

/// Fetches a blob's raw payload by hash.
///
/// # Errors
///
/// Returns [`GraphError::MalformedHash`] if `hash` is not 64 lowercase hex
/// characters, or [`GraphError::Store`] on a lower-level store failure.
pub fn get_blob(store: &ObjectStore, hash: &str) -> Result<Option<Vec<u8>>, GraphError> {
    validate_hash(hash)?;
    Ok(store.get_blob(hash)?)
}

/// Fetches and decodes a tree by hash.
///
/// # Errors
///
/// Returns [`GraphError::MalformedHash`] if `hash` is not 64 lowercase hex
/// characters, [`GraphError::TreeNotFound`] if no object exists with this
/// hash, or [`GraphError::InvalidTreeEncoding`] if its payload is not a
/// valid canonical tree encoding.
pub fn get_tree(store: &ObjectStore, hash: &str) -> Result<Tree, GraphError> {
    validate_hash(hash)?;
    let object = store.get_object(hash)?.ok_or_else(|| GraphError::TreeNotFound(hash.to_string()))?;
    Tree::decode(&object.data)
}

/// Stores a tree, returning its content hash.
///
/// # Errors
///
/// Returns [`GraphError::Store`] on a lower-level store failure.
pub fn store_tree(store: &ObjectStore, tree: &Tree) -> Result<String, GraphError> {
    Ok(store.store_object(&tree.encode(), ObjectType::Tree, Compression::Zlib)?.hash)
}

/// Fetches and decodes a commit by hash.
///
/// # Errors
///
/// Returns [`GraphError::MalformedHash`] if `hash` is not 64 lowercase hex
/// characters, [`GraphError::CommitNotFound`] if no object exists with this
/// hash, or [`GraphError::InvalidCommitEncoding`] if its payload is not a
/// valid canonical commit encoding.
pub fn get_commit(store: &ObjectStore, hash: &str) -> Result<Commit, GraphError> {
    validate_hash(hash)?;
    let object = store.get_object(hash)?.ok_or_else(|| GraphError::CommitNotFound(hash.to_string()))?;
    Commit::decode(&object.data)
}

/// Builds, stores, and returns the hash of a new commit.
///
/// Defaults `email` to [`DEFAULT_EMAIL`] when empty.
///
/// # Errors
///
/// Returns [`GraphError::MalformedHash`] if `tree` or `parent` is not 64
/// lowercase hex characters, [`GraphError::MessageContainsNewline`] if
/// `message` contains a `\n`, or [`GraphError::Store`] on a lower-level
/// store failure.
pub fn commit_tree(
    store: &ObjectStore,
    tree: &str,
    parent: Option<&str>,
    author: &str,
    email: &str,
    timestamp: i64,
    message: &str,
) -> Result<String, GraphError> {
    validate_hash(tree)?;
    if let Some(parent) = parent {
        validate_hash(parent)?;
    }
    if message.contains('\n') {
        return Err(GraphError::MessageContainsNewline);
    }

    let commit = Commit {
        tree: tree.to_string(),
        parent: parent.map(str::to_string),
        author: author.to_string(),
        email: if email.is_empty() { DEFAULT_EMAIL.to_string() } else { email.to_string() },
        timestamp,
        message: message.to_string(),
    };

    Ok(store.store_object(&commit.encode(), ObjectType::Commit, Compression::Zlib)?.hash)
}

/// Validates a branch or tag leaf name: non-empty, and free of `/`.
///
/// # Errors
///
/// Returns [`GraphError::InvalidRefName`] otherwise.
pub fn validate_branch_name(name: &str) -> Result<(), GraphError> {
    validate_ref_leaf(name)
}

/// Validates a tag leaf name: non-empty, and free of `/`.
///
/// # Errors
///
/// Returns [`GraphError::InvalidRefName`] otherwise.
pub fn validate_tag_name(name: &str) -> Result<(), GraphError> {
    validate_ref_leaf(name)
}

fn validate_ref_leaf(name: &str) -> Result<(), GraphError> {
    if name.is_empty() || name.contains('/') {
        return Err(GraphError::InvalidRefName(name.to_string()));
    }
    Ok(())
}

/// Walks a commit's ancestry, popping from a queue seeded with `start`,
/// visiting each commit once, and enqueuing its parent.
///
/// Terminates once `result.len() == max_count` or the queue empties.
///
/// # Errors
///
/// Returns [`GraphError::MalformedHash`] if `start` is not 64 lowercase hex
/// characters, or [`GraphError::CommitNotFound`] if any visited hash does
/// not resolve to a commit.
pub fn get_commit_history(store: &ObjectStore, start: &str, max_count: usize) -> Result<Vec<String>, GraphError> {
    validate_hash(start)?;
    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::from([start.to_string()]);
    let mut result = Vec::new();

    while let Some(hash) = queue.pop_front() {
        if result.len() >= max_count {
            break;
        }
        if !visited.insert(hash.clone()) {
            continue;
        }

        let commit = get_commit(store, &hash)?;
        result.push(hash);

        if let Some(parent) = commit.parent {
            queue.push_back(parent);
        }
    }

    Ok(result)
}

/// Walks a commit's full ancestry (unbounded), commit hash first.
fn full_ancestry(store: &ObjectStore, start: &str) -> Result<Vec<String>, GraphError> {
    let mut visited = FxHashSet::default();
    let mut chain = Vec::new();
    let mut current = Some(start.to_string());

    while let Some(hash) = current {
        if !visited.insert(hash.clone()) {
            break;
        }
        let commit = get_commit(store, &hash)?;
        chain.push(hash);
        current = commit.parent;
    }

    Ok(chain)
}

/// Finds the most recent common ancestor of `h1` and `h2`.
///
/// Walks `h1`'s ancestry into a set, then walks `h2`'s ancestry and
/// returns the first hash also present in that set. Returns `None` if
/// the two histories share no ancestor.
///
/// # Errors
///
/// Returns [`GraphError::MalformedHash`] if `h1` or `h2` is not 64
/// lowercase hex characters, or [`GraphError::CommitNotFound`] if either
/// history contains a dangling parent hash.
pub fn find_merge_base(store: &ObjectStore, h1: &str, h2: &str) -> Result<Option<String>, GraphError> {
    validate_hash(h1)?;
    validate_hash(h2)?;
    let ancestors_of_h1: FxHashSet<String> = full_ancestry(store, h1)?.into_iter().collect();

    for hash in full_ancestry(store, h2)? {
        if ancestors_of_h1.contains(&hash) {
            return Ok(Some(hash));
        }
    }

    Ok(None)
}

/// Computes the smallest commit-history prefix of `head` needed to reach
/// every other branch head, bounding transfer size for a related set of
/// branches.
///
/// For each head in `other_branch_heads`, finds its merge base with
/// `head` and that base's distance along `head`'s first-parent chain.
/// The closest merge base wins; the returned history is `head`'s ancestry
/// up to and including that commit. If no merge base exists against any
/// other head, returns `head`'s full history.
///
/// # Errors
///
/// Returns [`GraphError::MalformedHash`] if `head` is not 64 lowercase hex
/// characters, or [`GraphError::CommitNotFound`] if any involved history
/// contains a dangling parent hash.
pub fn get_optimized_history(store: &ObjectStore, head: &str, other_branch_heads: &[String]) -> Result<Vec<String>, GraphError> {
    validate_hash(head)?;
    let head_ancestry = full_ancestry(store, head)?;
    let position: FxHashMap<&str, usize> = head_ancestry.iter().enumerate().map(|(i, h)| (h.as_str(), i)).collect();

    let mut closest: Option<usize> = None;

    for other_head in other_branch_heads {
        if other_head == head {
            continue;
        }
        if let Some(base) = find_merge_base(store, head, other_head)? {
            if let Some(&distance) = position.get(base.as_str()) {
                closest = Some(closest.map_or(distance, |best| best.min(distance)));
            }
        }
    }

    Ok(match closest {
        Some(distance) => head_ancestry[..=distance].to_vec(),
        None => head_ancestry,
    })
}

/// Breadth-first closure of every hash reachable from `commit`: the
/// commit itself, its tree (recursively, through subtrees), every blob
/// the tree(s) reference, and every ancestor commit plus their trees and
/// blobs.
///
/// Deltas are transparent here: `store::ObjectStore::get_object`
/// reconstructs them to the same graph-level object before this walk
/// ever inspects a row's type.
///
/// # Errors
///
/// Returns [`GraphError::MalformedHash`] if `commit` is not 64 lowercase
/// hex characters, [`GraphError::Store`] on a lower-level store failure,
/// or a not-found/encoding error if the graph is internally inconsistent.
pub fn collect_reachable(store: &ObjectStore, commit: &str) -> Result<FxHashSet<String>, GraphError> {
    validate_hash(commit)?;
    let mut reachable = FxHashSet::default();
    let mut queue = VecDeque::from([commit.to_string()]);

    while let Some(hash) = queue.pop_front() {
        if !reachable.insert(hash.clone()) {
            continue;
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(frontier = queue.len(), visited = reachable.len(), "reachability walk step");

        let object = store.get_object(&hash)?.ok_or_else(|| GraphError::CommitNotFound(hash.clone()))?;

        match object.object_type {
            ObjectType::Commit => {
                let commit = Commit::decode(&object.data)?;
                queue.push_back(commit.tree);
                if let Some(parent) = commit.parent {
                    queue.push_back(parent);
                }
            }
            ObjectType::Tree => {
                let tree = Tree::decode(&object.data)?;
                for entry in tree.entries() {
                    if let Some(child) = &entry.hash {
                        queue.push_back(child.clone());
                    }
                }
            }
            ObjectType::Blob | ObjectType::Delta => {}
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(%commit, count = reachable.len(), "reachability closure computed");

    Ok(reachable)
}

/// Unions [`collect_reachable`] over every ref in the store (branches and
/// tags alike), the closure a garbage-collection pass must keep.
///
/// # Errors
///
/// Returns [`GraphError::Store`] on a lower-level store failure.
pub fn collect_reachable_from_refs(store: &ObjectStore) -> Result<FxHashSet<String>, GraphError> {
    let mut keep = FxHashSet::default();
    for entry in store.list_refs()? {
        if matches!(entry.ref_type, RefType::Branch | RefType::Tag) {
            keep.extend(collect_reachable(store, &entry.hash)?);
        }
    }
    Ok(keep)
}
