//! HEAD probing, used to learn artifact sizes before transfers start.

use std::str;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::FetchError;

/// Headers of interest from a HEAD response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadResult {
    /// `Content-Length` of the final response, if the server sent one.
    pub content_length: Option<u64>,
}

/// Performs a HEAD request against `url` and returns its `Content-Length`.
///
/// Redirects are followed. Blocking; run from `spawn_blocking` in async code.
/// A cancelled `cancel` aborts a pending request.
pub fn probe_content_length(
    url: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<HeadResult, FetchError> {
    if cancel.is_cancelled() {
        return Err(FetchError::Cancelled);
    }
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.nobody(true)?;
    easy.follow_location(true)?;
    easy.fail_on_error(true)?;
    easy.connect_timeout(timeout)?;
    easy.timeout(timeout)?;
    easy.progress(true)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                let line = s.trim_end();
                // A new status line starts the headers of the next hop.
                if line.starts_with("HTTP/") {
                    headers.clear();
                }
                headers.push(line.to_string());
            }
            true
        })?;
        transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
        transfer.perform()
    };

    if let Err(e) = performed {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        if e.is_http_returned_error() {
            return Err(FetchError::Http(easy.response_code().unwrap_or(0)));
        }
        return Err(FetchError::Curl(e));
    }

    Ok(parse_headers(&headers))
}

fn parse_headers(lines: &[String]) -> HeadResult {
    let mut content_length = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse::<u64>().ok();
            }
        }
    }
    HeadResult { content_length }
}
