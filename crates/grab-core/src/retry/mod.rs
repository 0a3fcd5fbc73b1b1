//! Per-mirror retry of transient transfer failures.
//!
//! A mirror is retried only for failures that look transient (timeouts,
//! dropped connections, throttling, 5xx). Anything else falls through to the
//! next mirror immediately.

mod classify;
mod policy;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
