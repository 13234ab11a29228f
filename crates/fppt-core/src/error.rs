//! Error types for template expansion.
//!
//! Every variant is fatal to a run. Messages are single-line and name the
//! offending path(s); underlying causes are exposed through
//! [`std::error::Error::source`] rather than repeated in the message.

use std::fmt;
use std::path::{Path, PathBuf};

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No definition exists for an invocation in any search location.
    #[error("no template definition '{definition}' found in any of: {}", join_paths(.candidates))]
    NotFound {
        definition: String,
        candidates: Vec<PathBuf>,
    },

    /// More than one search location provides the same definition.
    #[error("multiple template definitions for '{definition}': {}", join_paths(.candidates))]
    Ambiguous {
        definition: String,
        candidates: Vec<PathBuf>,
    },

    /// None of the search locations has a template directory.
    #[error("no template directories found in any of: {}", join_paths(.candidates))]
    NoTemplateRoots { candidates: Vec<PathBuf> },

    /// An invocation path that does not follow `<base>.<tag>.fppt`.
    #[error("invalid template invocation {path}: {reason}")]
    InvalidInvocation { path: PathBuf, reason: &'static str },

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A template body failed to parse, or the loaded set could not be linked.
    #[error("failed to load templates from [{}]", join_paths(.paths))]
    TemplateLoad {
        paths: Vec<PathBuf>,
        source: tera::Error,
    },

    /// The next offset does not fit in an `i64`.
    #[error("offset {offset} cannot advance by {step} without overflowing")]
    OffsetOverflow { offset: i64, step: i64 },

    #[error("failed to render template '{template}'")]
    Render {
        template: String,
        source: tera::Error,
    },
}

/// Coarse failure category, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Ambiguous,
    Io,
    Render,
    Overflow,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } | Error::NoTemplateRoots { .. } | Error::InvalidInvocation { .. } => {
                ErrorKind::NotFound
            }
            Error::Ambiguous { .. } => ErrorKind::Ambiguous,
            Error::Io { .. } => ErrorKind::Io,
            Error::TemplateLoad { .. } | Error::Render { .. } => ErrorKind::Render,
            Error::OffsetOverflow { .. } => ErrorKind::Overflow,
        }
    }

    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::Ambiguous => "ambiguous",
            ErrorKind::Io => "io",
            ErrorKind::Render => "render",
            ErrorKind::Overflow => "overflow",
        };
        f.write_str(name)
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(",")
}
