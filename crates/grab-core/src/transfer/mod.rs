//! Blocking HTTP transfers via libcurl.
//!
//! Everything here runs on the calling thread; async callers go through
//! `tokio::task::spawn_blocking`. Cancellation is observed from both the write
//! callback and the progress callback, so a stalled connection is abandoned as
//! promptly as one that is streaming.

mod error;
mod head;

pub use error::FetchError;
pub use head::{probe_content_length, HeadResult};

use std::io::Write;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::integrity::{Algorithm, Integrity};
use crate::retry::RetryPolicy;

/// Network knobs for GET transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    pub connect_timeout: Duration,
    /// Upper bound for a whole transfer, including body.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(3600),
            retry: RetryPolicy::default(),
        }
    }
}

/// Outcome of a successful GET: digest of everything written and its length.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub integrity: Integrity,
    pub bytes: u64,
}

/// GETs `url`, writing the body to `out` and hashing it with `algorithm` on the fly.
///
/// Non-2xx responses are errors. On any error the content of `out` is
/// unspecified and must be discarded by the caller.
pub fn fetch_into<W: Write>(
    url: &str,
    out: &mut W,
    algorithm: Algorithm,
    opts: &TransferOptions,
    cancel: &CancellationToken,
) -> Result<Fetched, FetchError> {
    if cancel.is_cancelled() {
        return Err(FetchError::Cancelled);
    }

    let mut hasher = algorithm.hasher();
    let mut written = 0u64;
    let mut storage_err: Option<std::io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.fail_on_error(true)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.low_speed_limit(1)?;
    easy.low_speed_time(Duration::from_secs(60))?;
    easy.timeout(opts.timeout)?;
    easy.progress(true)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            if cancel.is_cancelled() {
                return Ok(0); // abort transfer
            }
            if let Err(e) = out.write_all(data) {
                storage_err = Some(e);
                return Ok(0);
            }
            hasher.update(data);
            written += data.len() as u64;
            Ok(data.len())
        })?;
        transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
        transfer.perform()
    };

    if let Err(e) = performed {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        if let Some(io_err) = storage_err {
            return Err(FetchError::Storage(io_err));
        }
        if e.is_http_returned_error() {
            let code = easy.response_code().unwrap_or(0);
            return Err(FetchError::Http(code));
        }
        return Err(FetchError::Curl(e));
    }

    // file:// and similar report 0; anything in 3xx means redirects ran out.
    let code = easy.response_code()?;
    if code >= 300 {
        return Err(FetchError::Http(code));
    }

    out.flush()?;
    tracing::debug!(url, bytes = written, "transfer complete");
    Ok(Fetched {
        integrity: hasher.finalize(),
        bytes: written,
    })
}
