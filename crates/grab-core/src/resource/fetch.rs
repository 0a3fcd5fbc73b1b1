//! Mirror fallback: try each URL in order until one transfer succeeds.

use std::io::BufWriter;
use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::error::{GrabError, MirrorFailure, Result};
use crate::integrity::Algorithm;
use crate::retry::{classify, RetryDecision};
use crate::storage::StagedFile;
use crate::transfer::{self, FetchError, Fetched, TransferOptions};

/// A completed transfer sitting in its staging file, not yet verified.
#[derive(Debug)]
pub(crate) struct Staged {
    pub file: StagedFile,
    pub fetched: Fetched,
    /// Mirror that served the bytes.
    pub url: String,
}

/// Transfers the first mirror that succeeds into a staging file in `staging_dir`.
///
/// Any transfer failure moves on to the next mirror. Cancellation and local
/// storage failures end the search immediately.
pub(crate) async fn fetch_from_mirrors(
    urls: &[String],
    algorithm: Algorithm,
    staging_dir: &Path,
    opts: &TransferOptions,
    cancel: &CancellationToken,
) -> Result<Staged> {
    let mut attempts = Vec::with_capacity(urls.len());
    for url in urls {
        match fetch_with_retry(url, algorithm, staging_dir, opts, cancel).await {
            Ok(staged) => return Ok(staged),
            Err(FetchError::Cancelled) => return Err(GrabError::Cancelled),
            Err(FetchError::Storage(e)) => {
                return Err(GrabError::io(
                    format!("write staging file in {}", staging_dir.display()),
                    e,
                ))
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "mirror failed");
                attempts.push(MirrorFailure {
                    url: url.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    Err(GrabError::AllMirrorsFailed {
        url: urls.first().cloned().unwrap_or_default(),
        attempts,
    })
}

async fn fetch_with_retry(
    url: &str,
    algorithm: Algorithm,
    staging_dir: &Path,
    opts: &TransferOptions,
    cancel: &CancellationToken,
) -> Result<Staged, FetchError> {
    let mut attempt = 1u32;
    loop {
        let err = match fetch_once(url, algorithm, staging_dir, opts, cancel).await {
            Ok(staged) => return Ok(staged),
            Err(e) => e,
        };
        match opts.retry.decide(attempt, classify(&err)) {
            RetryDecision::NoRetry => return Err(err),
            RetryDecision::RetryAfter(delay) => {
                tracing::debug!(url, attempt, ?delay, error = %err, "retrying mirror");
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                }
                attempt += 1;
            }
        }
    }
}

async fn fetch_once(
    url: &str,
    algorithm: Algorithm,
    staging_dir: &Path,
    opts: &TransferOptions,
    cancel: &CancellationToken,
) -> Result<Staged, FetchError> {
    let mut file = StagedFile::create_in(staging_dir)?;
    let url = url.to_string();
    let opts = *opts;
    let cancel = cancel.clone();

    tokio::task::spawn_blocking(move || {
        let fetched = {
            let mut out = BufWriter::new(file.as_file_mut());
            transfer::fetch_into(&url, &mut out, algorithm, &opts, &cancel)?
        };
        Ok::<_, FetchError>(Staged { file, fetched, url })
    })
    .await
    .map_err(|e| FetchError::Task(e.to_string()))?
}
