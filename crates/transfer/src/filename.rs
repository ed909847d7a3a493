//! Suggested filename for an exported branch transfer file.

use time::format_description::well_known::Iso8601;
use time::OffsetDateTime;

/// Extension appended to every suggested export filename.
pub const EXTENSION: &str = "webdvcs-branch";

/// Builds the suggested filename for exporting `branch` at `timestamp`
/// (Unix seconds): `<branch>-<ISO-8601-timestamp-with-colons-replaced-by-dashes>.webdvcs-branch`.
///
/// This is advisory only — the core does not touch the filesystem, so
/// nothing requires a caller to use it — but it is provided so every
/// collaborator names export files the same way.
#[must_use]
pub fn suggested_filename(branch: &str, timestamp: i64) -> String {
    let formatted = OffsetDateTime::from_unix_timestamp(timestamp)
        .ok()
        .and_then(|dt| dt.format(&Iso8601::DEFAULT).ok())
        .unwrap_or_else(|| timestamp.to_string());
    let sanitized = formatted.replace(':', "-");
    format!("{branch}-{sanitized}.{EXTENSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colons_are_replaced_with_dashes() {
        let name = suggested_filename("main", 1_700_000_000);
        assert!(!name.contains(':'));
        assert!(name.starts_with("main-"));
        assert!(name.ends_with(".webdvcs-branch"));
    }
}
