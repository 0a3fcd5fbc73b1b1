//! Error taxonomy shared by every core operation.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the core crate.
pub type Result<T, E = GrabError> = std::result::Result<T, E>;

/// One failed attempt against a single mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorFailure {
    pub url: String,
    pub reason: String,
}

impl fmt::Display for MirrorFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.url, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum GrabError {
    /// Lock file is absent and creating a new one was not permitted.
    #[error("file '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    /// Lock file exists but is not a valid lock document.
    #[error("failed to parse '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// A URL being added is already recorded by another resource.
    #[error("resource '{0}' is already present")]
    DuplicateResource(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("'{}' is not a directory", .0.display())]
    InvalidDestination(PathBuf),

    #[error("'{0}' is not a valid permission definition")]
    InvalidPermission(String),

    #[error("nothing to download")]
    NothingToDownload,

    /// Every mirror of a resource failed to transfer.
    #[error("all mirrors failed for '{url}': {}", join_failures(.attempts))]
    AllMirrorsFailed {
        url: String,
        attempts: Vec<MirrorFailure>,
    },

    /// Transferred content does not hash to the recorded integrity.
    #[error("integrity mismatch for '{url}': expected {expected}, got {actual}")]
    IntegrityMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("download cancelled")]
    Cancelled,

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// First failing resource of a download run, by selection order.
    #[error("resource #{index} ({url})")]
    Resource {
        index: usize,
        url: String,
        #[source]
        source: Box<GrabError>,
    },
}

impl GrabError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        GrabError::Io {
            context: context.into(),
            source,
        }
    }

    /// The underlying failure kind, looking through the per-resource wrapper.
    pub fn inner(&self) -> &GrabError {
        match self {
            GrabError::Resource { source, .. } => source.inner(),
            other => other,
        }
    }
}

fn join_failures(attempts: &[MirrorFailure]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
