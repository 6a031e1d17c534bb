//! Error types for the modgraph-extract crate.

use std::backtrace::Backtrace;
use std::fmt;
use std::path::{Path, PathBuf};

/// Error type for module-tree discovery and symbol extraction.
///
/// Only fatal conditions become errors: a manifest or entry file that cannot
/// be read, an entry file the parser rejects outright, or a project with no
/// locatable entry point. Recoverable conditions (unreadable non-entry files,
/// unresolved `mod` names) degrade to empty module stubs with a logged
/// diagnostic and never surface here.
#[derive(Debug)]
pub struct ExtractError {
    kind: ExtractErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods instead.
#[derive(Debug)]
enum ExtractErrorKind {
    /// A file that must exist could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The parser rejected the entry file.
    Parse { path: PathBuf },
    /// No library or binary entry point could be located.
    Manifest { root: PathBuf },
}

impl ExtractError {
    /// Creates an error for an unreadable required file.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            kind: ExtractErrorKind::Io {
                path: path.into(),
                source,
            },
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates an error for an unparseable entry file.
    pub fn parse(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ExtractErrorKind::Parse { path: path.into() },
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates an error for a project with no locatable entry point.
    pub fn manifest(root: impl Into<PathBuf>) -> Self {
        Self {
            kind: ExtractErrorKind::Manifest { root: root.into() },
            backtrace: Backtrace::capture(),
        }
    }

    /// Returns true if this error is due to an I/O failure.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, ExtractErrorKind::Io { .. })
    }

    /// Returns true if this error is due to an entry-file parse failure.
    pub fn is_parse(&self) -> bool {
        matches!(self.kind, ExtractErrorKind::Parse { .. })
    }

    /// Returns true if this error is due to a missing entry point.
    pub fn is_manifest(&self) -> bool {
        matches!(self.kind, ExtractErrorKind::Manifest { .. })
    }

    /// The file or directory the failure refers to.
    pub fn path(&self) -> &Path {
        match &self.kind {
            ExtractErrorKind::Io { path, .. } => path,
            ExtractErrorKind::Parse { path } => path,
            ExtractErrorKind::Manifest { root } => root,
        }
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExtractErrorKind::Io { path, source } => {
                write!(f, "cannot read {}: {source}", path.display())
            }
            ExtractErrorKind::Parse { path } => {
                write!(f, "syntax error in entry file {}", path.display())
            }
            ExtractErrorKind::Manifest { root } => {
                write!(
                    f,
                    "no library or binary entry point found under {}",
                    root.display()
                )
            }
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ExtractErrorKind::Io { source, .. } => Some(source),
            ExtractErrorKind::Parse { .. } | ExtractErrorKind::Manifest { .. } => None,
        }
    }
}
