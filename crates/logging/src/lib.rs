#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` is a thin facade over [`tracing`] shared by every crate in the
//! workspace. It exists so the object store, delta engine, object graph, and
//! transfer layers emit diagnostics the same way, without any of them
//! depending on whether a subscriber is installed.
//!
//! # Design
//!
//! The core never writes to standard output or standard error and never
//! installs a subscriber itself: [`tracing::debug!`], [`tracing::trace!`],
//! and friends are no-ops until a caller installs one, which keeps the
//! library side effect-free while still giving embedders structured
//! instrumentation to hook into.
//!
//! [`init_fmt_subscriber`] is provided purely as a convenience for
//! *external* collaborators (CLIs, test harnesses) that want a reasonable
//! default; the core never calls it on its own behalf.
//!
//! # Examples
//!
//! ```
//! use logging::Verbosity;
//!
//! let verbosity = Verbosity::from_occurrences(2);
//! assert_eq!(verbosity, Verbosity::Debug);
//! ```

pub use tracing;

/// Verbosity level an external collaborator may map its own `-v` flags onto.
///
/// The core itself does not read this type; it exists so callers have a
/// single place to translate "how many times was `-v` passed" into a
/// [`tracing::Level`] when they install their own subscriber.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Verbosity {
    /// No diagnostic output beyond warnings and errors.
    Quiet,
    /// Coarse progress information.
    Info,
    /// Per-operation detail (object stores, delta decisions, ref updates).
    Debug,
    /// Everything, including per-block delta-matching decisions.
    Trace,
}

impl Verbosity {
    /// Maps a repeated `-v` flag count onto a verbosity level.
    #[must_use]
    pub const fn from_occurrences(count: u8) -> Self {
        match count {
            0 => Self::Quiet,
            1 => Self::Info,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// The [`tracing::Level`] this verbosity corresponds to.
    #[must_use]
    pub const fn tracing_level(self) -> tracing::Level {
        match self {
            Self::Quiet => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }
}

/// Installs a process-wide `tracing-subscriber` formatter at the given verbosity.
///
/// This is a convenience for binaries and tests embedding the store; the
/// core crates never call it themselves. Calling it more than once per
/// process is harmless but only the first call takes effect, matching
/// [`tracing::subscriber::set_global_default`]'s semantics.
#[cfg(feature = "tracing-subscriber")]
pub fn init_fmt_subscriber(verbosity: Verbosity) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level().into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occurrence_mapping_saturates_at_trace() {
        assert_eq!(Verbosity::from_occurrences(0), Verbosity::Quiet);
        assert_eq!(Verbosity::from_occurrences(1), Verbosity::Info);
        assert_eq!(Verbosity::from_occurrences(2), Verbosity::Debug);
        assert_eq!(Verbosity::from_occurrences(3), Verbosity::Trace);
        assert_eq!(Verbosity::from_occurrences(255), Verbosity::Trace);
    }

    #[test]
    fn verbosity_levels_are_totally_ordered() {
        assert!(Verbosity::Quiet < Verbosity::Info);
        assert!(Verbosity::Info < Verbosity::Debug);
        assert!(Verbosity::Debug < Verbosity::Trace);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn verbosity_round_trips_through_json() {
        let encoded = serde_json::to_string(&Verbosity::Debug).unwrap();
        assert_eq!(encoded, "\"debug\"");
        let decoded: Verbosity = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, Verbosity::Debug);
    }
}
