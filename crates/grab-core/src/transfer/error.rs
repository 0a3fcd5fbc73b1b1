use std::io;

use thiserror::Error;

/// Failure of a single transfer attempt against one URL.
///
/// Kept separate from [`crate::GrabError`] so the retry layer can classify it
/// before the outcome is folded into a per-resource error.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Curl(#[from] curl::Error),
    #[error("HTTP {0}")]
    Http(u32),
    #[error("storage: {0}")]
    Storage(#[from] io::Error),
    #[error("cancelled")]
    Cancelled,
    /// The blocking transfer task panicked or was aborted.
    #[error("transfer task failed: {0}")]
    Task(String),
}
