//! Commit encoding: a tree snapshot plus parentage and authorship, as a
//! small canonical text payload.

use crate::error::GraphError;

/// Email substituted when a commit is created without one.
pub const DEFAULT_EMAIL: &str = "unknown@example.com";

/// A snapshot pointing at one tree, plus metadata and an optional parent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Commit {
    /// Hash of this commit's tree.
    pub tree: String,
    /// Hash of the parent commit, or `None` for a root commit.
    pub parent: Option<String>,
    /// Author's display name.
    pub author: String,
    /// Author's email.
    pub email: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// Commit message. Always a single logical line (no embedded newlines).
    pub message: String,
}

impl Commit {
    /// Encodes this commit to its canonical textual payload.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut lines = vec![format!("tree {}", self.tree)];
        if let Some(parent) = &self.parent {
            lines.push(format!("parent {parent}"));
        }
        lines.push(format!("author {} <{}> {}", self.author, self.email, self.timestamp));
        lines.push(format!("message {}", self.message));
        lines.join("\n").into_bytes()
    }

    /// Parses a commit's canonical textual payload.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidCommitEncoding`] if the payload does
    /// not have a `tree` line, a well-formed `author` line, and a
    /// `message` line, in that relative order.
    pub fn decode(payload: &[u8]) -> Result<Self, GraphError> {
        let text = String::from_utf8_lossy(payload);
        let mut lines = text.split('\n');

        let tree = lines
            .next()
            .and_then(|l| l.strip_prefix("tree "))
            .ok_or_else(|| GraphError::InvalidCommitEncoding("missing tree line".to_string()))?
            .to_string();

        let mut next = lines.next().ok_or_else(|| GraphError::InvalidCommitEncoding("missing author line".to_string()))?;

        let parent = if let Some(rest) = next.strip_prefix("parent ") {
            let hash = rest.to_string();
            next = lines.next().ok_or_else(|| GraphError::InvalidCommitEncoding("missing author line".to_string()))?;
            Some(hash)
        } else {
            None
        };

        let author_line = next
            .strip_prefix("author ")
            .ok_or_else(|| GraphError::InvalidCommitEncoding("missing author line".to_string()))?;
        let (author, email, timestamp) = parse_author_line(author_line)?;

        let message_line = lines.next().ok_or_else(|| GraphError::InvalidCommitEncoding("missing message line".to_string()))?;
        let message = message_line
            .strip_prefix("message ")
            .ok_or_else(|| GraphError::InvalidCommitEncoding("missing message line".to_string()))?
            .to_string();

        Ok(Self {
            tree,
            parent,
            author,
            email,
            timestamp,
            message,
        })
    }
}

/// Parses `"<name> <<email>> <unix-seconds>"` into its three parts.
fn parse_author_line(line: &str) -> Result<(String, String, i64), GraphError> {
    let open = line
        .rfind('<')
        .ok_or_else(|| GraphError::InvalidCommitEncoding("author line has no email".to_string()))?;
    let close = line[open..]
        .find('>')
        .map(|offset| open + offset)
        .ok_or_else(|| GraphError::InvalidCommitEncoding("author line's email is unterminated".to_string()))?;

    let name = line[..open].trim().to_string();
    let email = line[open + 1..close].to_string();
    let timestamp = line[close + 1..]
        .trim()
        .parse::<i64>()
        .map_err(|_| GraphError::InvalidCommitEncoding("author line's timestamp is not an integer".to_string()))?;

    Ok((name, email, timestamp))
}
