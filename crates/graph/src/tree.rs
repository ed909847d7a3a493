//! Directory-snapshot encoding: sorted entries, one per line, hashed as a
//! single canonical payload.

use crate::error::GraphError;

/// Placeholder token written in place of a null field (a symlink's blob
/// hash, or an entry with no target), so column positions stay stable
/// across an otherwise variable-length line.
const NULL_FIELD: &str = "-";

/// What kind of filesystem entry a [`TreeEntry`] represents.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EntryKind {
    /// A regular file; `hash` names its blob.
    File,
    /// A subdirectory; `hash` names its child tree.
    Dir,
    /// An inspectable archive member; encoded like a file.
    Archive,
    /// A symbolic link; `hash` is `None` and `target` names the link target.
    Symlink,
}

impl EntryKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dir => "dir",
            Self::Archive => "archive",
            Self::Symlink => "symlink",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "file" => Some(Self::File),
            "dir" => Some(Self::Dir),
            "archive" => Some(Self::Archive),
            "symlink" => Some(Self::Symlink),
            _ => None,
        }
    }
}

/// One named child of a [`Tree`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreeEntry {
    /// Path component; unique within the tree that holds this entry.
    pub name: String,
    /// Kind of filesystem entry this names.
    pub kind: EntryKind,
    /// Blob or child-tree hash. `None` for symlinks.
    pub hash: Option<String>,
    /// POSIX-style permission bits.
    pub mode: u32,
    /// Modification time, if recorded.
    pub mtime: Option<i64>,
    /// Uncompressed content size, if recorded.
    pub size: Option<u64>,
    /// Symlink target, if this entry is a symlink.
    pub target: Option<String>,
    /// Whether the entry's content was classified as binary.
    pub binary: Option<bool>,
}

/// A sorted snapshot of one directory level.
///
/// Entries are always kept sorted by [`TreeEntry::name`] so that two
/// trees with the same entries encode to byte-identical payloads, and
/// therefore hash identically.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Builds a tree from an unordered entry list, sorting it canonically.
    #[must_use]
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self { entries }
    }

    /// The tree's entries, in canonical (name-sorted) order.
    #[must_use]
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// Looks up a single entry by name.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Encodes this tree to its canonical textual payload.
    ///
    /// A tree with no entries encodes as an empty payload. Otherwise each
    /// entry is one line, newline-joined with no trailing newline, so
    /// identical entry lists always produce byte-identical bytes.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        self.entries
            .iter()
            .map(encode_entry)
            .collect::<Vec<_>>()
            .join("\n")
            .into_bytes()
    }

    /// Parses a tree's canonical textual payload.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidTreeEncoding`] if any line does not
    /// have the required four leading fields, or names an unrecognised
    /// entry-kind token.
    pub fn decode(payload: &[u8]) -> Result<Self, GraphError> {
        let text = String::from_utf8_lossy(payload);
        if text.is_empty() {
            return Ok(Self::default());
        }

        let entries = text
            .split('\n')
            .enumerate()
            .map(|(idx, line)| decode_entry(line, idx + 1))
            .collect::<Result<Vec<_>, _>>()?;

        // Input is trusted to already be canonically sorted (it was
        // produced by `encode`), but re-sorting is cheap insurance for
        // payloads handed in from elsewhere (e.g. an imported branch).
        Ok(Self::new(entries))
    }
}

fn encode_entry(entry: &TreeEntry) -> String {
    let mut fields = vec![
        format!("{:o}", entry.mode),
        entry.name.clone(),
        entry.hash.clone().unwrap_or_else(|| NULL_FIELD.to_string()),
        entry.kind.as_str().to_string(),
    ];

    if let Some(mtime) = entry.mtime {
        fields.push(mtime.to_string());
    }
    if let Some(size) = entry.size {
        fields.push(size.to_string());
    }
    if let Some(target) = &entry.target {
        fields.push(target.clone());
    }
    if let Some(binary) = entry.binary {
        fields.push(if binary { "binary".to_string() } else { "text".to_string() });
    }

    fields.join(" ")
}

fn decode_entry(line: &str, line_no: usize) -> Result<TreeEntry, GraphError> {
    let invalid = |reason: &str| GraphError::InvalidTreeEncoding {
        line: line_no,
        reason: reason.to_string(),
    };

    let mut tokens = line.split(' ');
    let mode_token = tokens.next().ok_or_else(|| invalid("missing mode field"))?;
    let name = tokens.next().ok_or_else(|| invalid("missing name field"))?.to_string();
    let hash_token = tokens.next().ok_or_else(|| invalid("missing hash field"))?;
    let kind_token = tokens.next().ok_or_else(|| invalid("missing type field"))?;

    let mode = u32::from_str_radix(mode_token, 8).map_err(|_| invalid("mode is not valid octal"))?;
    let hash = (hash_token != NULL_FIELD).then(|| hash_token.to_string());
    let kind = EntryKind::parse(kind_token).ok_or_else(|| invalid("unrecognised entry type"))?;

    let mut mtime = None;
    let mut size = None;
    let mut target = None;
    let mut binary = None;

    for token in tokens {
        if let Ok(n) = token.parse::<i64>() {
            if mtime.is_none() {
                mtime = Some(n);
            } else if size.is_none() {
                size = Some(n as u64);
            }
        } else if token == "binary" {
            binary = Some(true);
        } else if token == "text" {
            binary = Some(false);
        } else if target.is_none() {
            target = Some(token.to_string());
        }
    }

    Ok(TreeEntry {
        name,
        kind,
        hash,
        mode,
        mtime,
        size,
        target,
        binary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_entry(name: &str, hash: &str) -> TreeEntry {
        TreeEntry {
            name: name.to_string(),
            kind: EntryKind::File,
            hash: Some(hash.to_string()),
            mode: 0o100644,
            mtime: None,
            size: None,
            target: None,
            binary: None,
        }
    }

    #[test]
    fn empty_tree_encodes_to_empty_payload() {
        let tree = Tree::new(vec![]);
        assert_eq!(tree.encode(), Vec::<u8>::new());
        assert_eq!(Tree::decode(&[]).unwrap(), tree);
    }

    #[test]
    fn encoding_is_canonical_regardless_of_insertion_order() {
        let a = Tree::new(vec![file_entry("b.txt", &"1".repeat(64)), file_entry("a.txt", &"2".repeat(64))]);
        let b = Tree::new(vec![file_entry("a.txt", &"2".repeat(64)), file_entry("b.txt", &"1".repeat(64))]);
        assert_eq!(a.encode(), b.encode());
    }

    #[test]
    fn round_trips_through_encode_decode() {
        let tree = Tree::new(vec![file_entry("a.txt", &"a".repeat(64)), file_entry("b.txt", &"b".repeat(64))]);
        let decoded = Tree::decode(&tree.encode()).unwrap();
        assert_eq!(decoded, tree);
    }

    #[test]
    fn mode_round_trips_as_octal() {
        let tree = Tree::new(vec![file_entry("x", &"c".repeat(64))]);
        let encoded = String::from_utf8(tree.encode()).unwrap();
        assert!(encoded.starts_with("100644 "));
    }

    #[test]
    fn symlink_entry_has_no_hash_but_has_a_target() {
        let entry = TreeEntry {
            name: "link".to_string(),
            kind: EntryKind::Symlink,
            hash: None,
            mode: 0o120000,
            mtime: None,
            size: None,
            target: Some("../elsewhere".to_string()),
            binary: None,
        };
        let tree = Tree::new(vec![entry.clone()]);
        let decoded = Tree::decode(&tree.encode()).unwrap();
        assert_eq!(decoded.entry("link").unwrap(), &entry);
    }

    #[test]
    fn optional_trailing_fields_round_trip() {
        let entry = TreeEntry {
            name: "data.bin".to_string(),
            kind: EntryKind::File,
            hash: Some("d".repeat(64)),
            mode: 0o100644,
            mtime: Some(1_700_000_000),
            size: Some(4096),
            target: None,
            binary: Some(true),
        };
        let tree = Tree::new(vec![entry.clone()]);
        let decoded = Tree::decode(&tree.encode()).unwrap();
        assert_eq!(decoded.entry("data.bin").unwrap(), &entry);
    }

    #[test]
    fn entry_lookup_by_name() {
        let tree = Tree::new(vec![file_entry("only.txt", &"e".repeat(64))]);
        assert!(tree.entry("only.txt").is_some());
        assert!(tree.entry("missing.txt").is_none());
    }

    #[test]
    fn malformed_line_is_rejected() {
        let err = Tree::decode(b"100644 onlytwo").unwrap_err();
        assert!(matches!(err, GraphError::InvalidTreeEncoding { .. }));
    }

    #[test]
    fn unrecognised_entry_kind_is_rejected() {
        let line = format!("100644 x {} bogus", "a".repeat(64));
        let err = Tree::decode(line.as_bytes()).unwrap_err();
        assert!(matches!(err, GraphError::InvalidTreeEncoding { .. }));
    }
}
