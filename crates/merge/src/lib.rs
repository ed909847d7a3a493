#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `merge` implements the three-way merge core: given a common-ancestor
//! ("base") tree and two tree snapshots that diverged from it
//! ("current" and "source"), decide per entry name whether the merge can
//! take one side automatically or must report a conflict.
//!
//! # Design
//!
//! [`merge_trees`] classifies each name present in any of the three trees
//! against the decision table in the object-graph specification: added
//! on one or both sides, deleted on one or both sides, modified on one or
//! both sides, and every combination of those. Byte equality between two
//! entries is checked via their content hash (an acceptable accelerator
//! for content-addressed blobs) with a full structural comparison as the
//! fallback for entries with no hash, such as symlinks.
//!
//! # Invariants
//!
//! - A name absent from all three trees never appears in the merge
//!   decision; absence from the *result* tree always means "deleted",
//!   never "forgotten".
//! - The function is pure: it never touches the object store and never
//!   fails. Any tree it is handed (even an empty one) produces either a
//!   merged tree or a non-empty conflict list.

use graph::{Tree, TreeEntry};
use rustc_hash::FxHashSet;

/// Why a given entry name could not be merged automatically.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ConflictKind {
    /// The name was added independently on both sides with different content.
    BothAdded,
    /// The name was modified independently on both sides with different content.
    BothModified,
    /// Modified in `current`, deleted in `source`.
    ModifiedDeleted,
    /// Deleted in `current`, modified in `source`.
    DeletedModified,
}

/// One entry name that could not be merged automatically.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Conflict {
    /// The entry name in conflict.
    pub name: String,
    /// Why it conflicted.
    pub kind: ConflictKind,
}

/// Result of [`merge_trees`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MergeOutcome {
    /// Every name merged automatically; here is the resulting tree.
    Merged(Tree),
    /// At least one name conflicted. The three input trees are returned
    /// unchanged alongside the list of conflicts, so a caller can present
    /// them for manual resolution.
    Conflicted {
        /// The common ancestor tree, unchanged.
        base: Tree,
        /// The "current" tree, unchanged.
        current: Tree,
        /// The "source" tree, unchanged.
        source: Tree,
        /// Every name that conflicted, in name order.
        conflicts: Vec<Conflict>,
    },
}

/// How one tree's entry for a given name compares to the base.
enum Side<'a> {
    Deleted,
    Unmodified,
    Modified(&'a TreeEntry),
}

fn classify<'a>(base_entry: Option<&TreeEntry>, side_entry: Option<&'a TreeEntry>) -> Side<'a> {
    match (base_entry, side_entry) {
        (_, None) => Side::Deleted,
        (Some(base), Some(entry)) if entries_equal(base, entry) => Side::Unmodified,
        (_, Some(entry)) => Side::Modified(entry),
    }
}

fn entries_equal(a: &TreeEntry, b: &TreeEntry) -> bool {
    match (&a.hash, &b.hash) {
        (Some(ha), Some(hb)) => ha == hb && a.kind == b.kind && a.mode == b.mode,
        _ => a == b,
    }
}

/// Performs a three-way merge of `current` and `source` against their
/// common ancestor `base`.
///
/// See the module documentation for the decision table this implements.
#[must_use]
pub fn merge_trees(base: &Tree, current: &Tree, source: &Tree) -> MergeOutcome {
    let mut names: FxHashSet<&str> = FxHashSet::default();
    names.extend(base.entries().iter().map(|e| e.name.as_str()));
    names.extend(current.entries().iter().map(|e| e.name.as_str()));
    names.extend(source.entries().iter().map(|e| e.name.as_str()));

    let mut sorted_names: Vec<&str> = names.into_iter().collect();
    sorted_names.sort_unstable();

    let mut merged_entries = Vec::new();
    let mut conflicts = Vec::new();

    for name in sorted_names {
        let base_entry = base.entry(name);
        let current_entry = current.entry(name);
        let source_entry = source.entry(name);

        match (base_entry, current_entry, source_entry) {
            (None, current_entry, source_entry) => match (current_entry, source_entry) {
                (Some(c), None) => merged_entries.push(c.clone()),
                (None, Some(s)) => merged_entries.push(s.clone()),
                (Some(c), Some(s)) => {
                    if entries_equal(c, s) {
                        merged_entries.push(c.clone());
                    } else {
                        #[cfg(feature = "tracing")]
                        tracing::trace!(name, kind = "both_added", "merge conflict");
                        conflicts.push(Conflict {
                            name: name.to_string(),
                            kind: ConflictKind::BothAdded,
                        });
                    }
                }
                (None, None) => unreachable!("name is only visited because it appears in some tree"),
            },
            (Some(base_entry), current_entry, source_entry) => {
                let cur = classify(Some(base_entry), current_entry);
                let src = classify(Some(base_entry), source_entry);

                match (cur, src) {
                    (Side::Deleted, Side::Deleted) | (Side::Deleted, Side::Unmodified) | (Side::Unmodified, Side::Deleted) => {
                        // deleted: omit from the merged tree.
                    }
                    (Side::Deleted, Side::Modified(_)) => {
                        #[cfg(feature = "tracing")]
                        tracing::trace!(name, kind = "deleted_modified", "merge conflict");
                        conflicts.push(Conflict {
                            name: name.to_string(),
                            kind: ConflictKind::DeletedModified,
                        });
                    }
                    (Side::Modified(_), Side::Deleted) => {
                        #[cfg(feature = "tracing")]
                        tracing::trace!(name, kind = "modified_deleted", "merge conflict");
                        conflicts.push(Conflict {
                            name: name.to_string(),
                            kind: ConflictKind::ModifiedDeleted,
                        });
                    }
                    (Side::Unmodified, Side::Modified(s)) => merged_entries.push(s.clone()),
                    (Side::Modified(c), Side::Unmodified) => merged_entries.push(c.clone()),
                    (Side::Unmodified, Side::Unmodified) => merged_entries.push(base_entry.clone()),
                    (Side::Modified(c), Side::Modified(s)) => {
                        if entries_equal(c, s) {
                            merged_entries.push(c.clone());
                        } else {
                            #[cfg(feature = "tracing")]
                            tracing::trace!(name, kind = "both_modified", "merge conflict");
                            conflicts.push(Conflict {
                                name: name.to_string(),
                                kind: ConflictKind::BothModified,
                            });
                        }
                    }
                }
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(entries = merged_entries.len(), conflicts = conflicts.len(), "merge complete");

    if conflicts.is_empty() {
        MergeOutcome::Merged(Tree::new(merged_entries))
    } else {
        MergeOutcome::Conflicted {
            base: base.clone(),
            current: current.clone(),
            source: source.clone(),
            conflicts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph::EntryKind;

    fn file(name: &str, content_hash: &str) -> TreeEntry {
        TreeEntry {
            name: name.to_string(),
            kind: EntryKind::File,
            hash: Some(content_hash.to_string()),
            mode: 0o100644,
            mtime: None,
            size: None,
            target: None,
            binary: None,
        }
    }

    fn tree(entries: Vec<TreeEntry>) -> Tree {
        Tree::new(entries)
    }

    fn hash_of(byte: u8) -> String {
        format!("{byte:02x}").repeat(32)
    }

    #[test]
    fn both_modified_differently_conflicts() {
        let base = tree(vec![file("f", &hash_of(0xaa))]);
        let current = tree(vec![file("f", &hash_of(0xbb))]);
        let source = tree(vec![file("f", &hash_of(0xcc))]);

        match merge_trees(&base, &current, &source) {
            MergeOutcome::Conflicted { conflicts, .. } => {
                assert_eq!(conflicts, vec![Conflict { name: "f".to_string(), kind: ConflictKind::BothModified }]);
            }
            MergeOutcome::Merged(_) => panic!("expected a conflict"),
        }
    }

    #[test]
    fn both_modified_to_equal_bytes_takes_the_modification() {
        let base = tree(vec![file("f", &hash_of(0xaa))]);
        let current = tree(vec![file("f", &hash_of(0xbb))]);
        let source = tree(vec![file("f", &hash_of(0xbb))]);

        match merge_trees(&base, &current, &source) {
            MergeOutcome::Merged(result) => assert_eq!(result.entry("f").unwrap().hash.as_deref(), Some(hash_of(0xbb).as_str())),
            MergeOutcome::Conflicted { .. } => panic!("expected a clean merge"),
        }
    }

    #[test]
    fn modified_on_one_side_only_takes_the_modifier() {
        let base = tree(vec![file("f", &hash_of(0xaa))]);
        let current = tree(vec![file("f", &hash_of(0xbb))]);
        let source = tree(vec![file("f", &hash_of(0xaa))]);

        match merge_trees(&base, &current, &source) {
            MergeOutcome::Merged(result) => assert_eq!(result.entry("f").unwrap().hash.as_deref(), Some(hash_of(0xbb).as_str())),
            MergeOutcome::Conflicted { .. } => panic!("expected a clean merge"),
        }
    }

    #[test]
    fn both_added_with_equal_content_takes_it() {
        let base = tree(vec![]);
        let current = tree(vec![file("new", &hash_of(1))]);
        let source = tree(vec![file("new", &hash_of(1))]);

        match merge_trees(&base, &current, &source) {
            MergeOutcome::Merged(result) => assert!(result.entry("new").is_some()),
            MergeOutcome::Conflicted { .. } => panic!("expected a clean merge"),
        }
    }

    #[test]
    fn both_added_with_different_content_conflicts() {
        let base = tree(vec![]);
        let current = tree(vec![file("new", &hash_of(1))]);
        let source = tree(vec![file("new", &hash_of(2))]);

        match merge_trees(&base, &current, &source) {
            MergeOutcome::Conflicted { conflicts, .. } => {
                assert_eq!(conflicts, vec![Conflict { name: "new".to_string(), kind: ConflictKind::BothAdded }]);
            }
            MergeOutcome::Merged(_) => panic!("expected a conflict"),
        }
    }

    #[test]
    fn added_on_one_side_only_is_taken() {
        let base = tree(vec![]);
        let current = tree(vec![file("only_current", &hash_of(1))]);
        let source = tree(vec![]);

        match merge_trees(&base, &current, &source) {
            MergeOutcome::Merged(result) => assert!(result.entry("only_current").is_some()),
            MergeOutcome::Conflicted { .. } => panic!("expected a clean merge"),
        }
    }

    #[test]
    fn deleted_on_both_sides_is_deleted() {
        let base = tree(vec![file("gone", &hash_of(1))]);
        let current = tree(vec![]);
        let source = tree(vec![]);

        match merge_trees(&base, &current, &source) {
            MergeOutcome::Merged(result) => assert!(result.entry("gone").is_none()),
            MergeOutcome::Conflicted { .. } => panic!("expected a clean merge"),
        }
    }

    #[test]
    fn deleted_on_one_side_unmodified_on_the_other_is_deleted() {
        let base = tree(vec![file("gone", &hash_of(1))]);
        let current = tree(vec![]);
        let source = tree(vec![file("gone", &hash_of(1))]);

        match merge_trees(&base, &current, &source) {
            MergeOutcome::Merged(result) => assert!(result.entry("gone").is_none()),
            MergeOutcome::Conflicted { .. } => panic!("expected a clean merge"),
        }
    }

    #[test]
    fn deleted_on_one_side_modified_on_the_other_conflicts() {
        let base = tree(vec![file("f", &hash_of(1))]);
        let current = tree(vec![]);
        let source = tree(vec![file("f", &hash_of(2))]);

        match merge_trees(&base, &current, &source) {
            MergeOutcome::Conflicted { conflicts, .. } => {
                assert_eq!(conflicts, vec![Conflict { name: "f".to_string(), kind: ConflictKind::DeletedModified }]);
            }
            MergeOutcome::Merged(_) => panic!("expected a conflict"),
        }

        let current_modified = tree(vec![file("f", &hash_of(2))]);
        let source_deleted = tree(vec![]);
        match merge_trees(&base, &current_modified, &source_deleted) {
            MergeOutcome::Conflicted { conflicts, .. } => {
                assert_eq!(conflicts, vec![Conflict { name: "f".to_string(), kind: ConflictKind::ModifiedDeleted }]);
            }
            MergeOutcome::Merged(_) => panic!("expected a conflict"),
        }
    }

    #[test]
    fn unmodified_entries_are_carried_through() {
        let base = tree(vec![file("stable", &hash_of(1))]);
        let current = tree(vec![file("stable", &hash_of(1))]);
        let source = tree(vec![file("stable", &hash_of(1))]);

        match merge_trees(&base, &current, &source) {
            MergeOutcome::Merged(result) => assert!(result.entry("stable").is_some()),
            MergeOutcome::Conflicted { .. } => panic!("expected a clean merge"),
        }
    }

    #[test]
    fn base_a_current_b_source_c_is_a_single_both_modified_conflict() {
        let base = tree(vec![file("f", &hash_of(0xA))]);
        let current = tree(vec![file("f", &hash_of(0xB))]);
        let source = tree(vec![file("f", &hash_of(0xC))]);

        match merge_trees(&base, &current, &source) {
            MergeOutcome::Conflicted { conflicts, .. } => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].kind, ConflictKind::BothModified);
            }
            MergeOutcome::Merged(_) => panic!("expected exactly one both-modified conflict"),
        }
    }
}
