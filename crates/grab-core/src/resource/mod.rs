//! A declared artifact and its fetch-verify-persist protocol.

mod fetch;
mod filename;

pub use filename::output_filename;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{GrabError, Result};
use crate::integrity::{Algorithm, Integrity};
use crate::transfer::TransferOptions;

/// One `[[Resource]]` entry of a lock file.
///
/// Resources are immutable once built; a lock file changes only by adding or
/// removing whole entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Mirrors in preference order; the first is primary.
    #[serde(rename = "Urls")]
    urls: Vec<String>,
    #[serde(rename = "Integrity")]
    integrity: Integrity,
    #[serde(rename = "Tags", default)]
    tags: Vec<String>,
    #[serde(
        rename = "Filename",
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    filename: Option<String>,
}

/// A verified artifact moved into place by [`Resource::download`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub bytes: u64,
    /// Mirror the content came from.
    pub url: String,
}

impl Resource {
    /// Builds a resource for a known integrity value, without touching the network.
    pub fn with_integrity(
        urls: Vec<String>,
        integrity: &str,
        tags: Vec<String>,
        filename: Option<String>,
    ) -> Result<Self> {
        check_urls(&urls)?;
        let integrity: Integrity = integrity.parse()?;
        Ok(Self::assemble(urls, integrity, tags, filename))
    }

    /// Builds a resource by fetching its content and digesting it with `algorithm`.
    ///
    /// Mirrors are tried in order; the first one that transfers successfully
    /// determines the recorded integrity. The content itself is discarded.
    pub async fn from_urls(
        urls: Vec<String>,
        algorithm: &str,
        tags: Vec<String>,
        filename: Option<String>,
        opts: &TransferOptions,
    ) -> Result<Self> {
        check_urls(&urls)?;
        let algorithm: Algorithm = algorithm.parse()?;

        let staged = fetch::fetch_from_mirrors(
            &urls,
            algorithm,
            &std::env::temp_dir(),
            opts,
            &CancellationToken::new(),
        )
        .await?;
        tracing::debug!(
            url = %staged.url,
            bytes = staged.fetched.bytes,
            integrity = %staged.fetched.integrity,
            "computed integrity"
        );
        Ok(Self::assemble(urls, staged.fetched.integrity, tags, filename))
    }

    fn assemble(
        urls: Vec<String>,
        integrity: Integrity,
        tags: Vec<String>,
        filename: Option<String>,
    ) -> Self {
        let mut unique_tags: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            if !unique_tags.contains(&tag) {
                unique_tags.push(tag);
            }
        }
        Self {
            urls,
            integrity,
            tags: unique_tags,
            filename: filename.filter(|f| !f.is_empty()),
        }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn primary_url(&self) -> &str {
        // Non-empty by construction and by load-time validation.
        self.urls.first().map(String::as_str).unwrap_or_default()
    }

    pub fn integrity(&self) -> &Integrity {
        &self.integrity
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Name the artifact is written under in the destination directory.
    pub fn output_filename(&self) -> String {
        output_filename(self.filename.as_deref(), self.primary_url())
    }

    /// True if `url` is one of this resource's mirrors (exact match).
    pub fn contains(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url)
    }

    /// True if `target` names one of the mirrors or the output filename.
    pub fn matches(&self, target: &str) -> bool {
        self.contains(target) || self.output_filename() == target
    }

    /// Fetches, verifies and persists this resource into `dest_dir`.
    ///
    /// The bytes are staged in a temp file inside `dest_dir`; only content
    /// whose digest equals the recorded integrity is renamed onto the output
    /// filename, with `mode` applied first when given. Cancellation is
    /// honoured at every read/write and again right before the rename.
    pub async fn download(
        &self,
        dest_dir: &Path,
        mode: Option<u32>,
        opts: &TransferOptions,
        cancel: &CancellationToken,
    ) -> Result<Artifact> {
        let staged = fetch::fetch_from_mirrors(
            &self.urls,
            self.integrity.algorithm(),
            dest_dir,
            opts,
            cancel,
        )
        .await?;

        if staged.fetched.integrity != self.integrity {
            return Err(GrabError::IntegrityMismatch {
                url: staged.url,
                expected: self.integrity.to_string(),
                actual: staged.fetched.integrity.to_string(),
            });
        }

        let final_path = dest_dir.join(self.output_filename());
        if cancel.is_cancelled() {
            return Err(GrabError::Cancelled);
        }

        let bytes = staged.fetched.bytes;
        let url = staged.url;
        let file = staged.file;
        let target = final_path.clone();
        tokio::task::spawn_blocking(move || file.finalize(&target, mode))
            .await
            .map_err(|e| {
                GrabError::io(
                    format!("finalize {}", final_path.display()),
                    std::io::Error::other(e.to_string()),
                )
            })?
            .map_err(|e| GrabError::io(format!("finalize {}", final_path.display()), e))?;

        tracing::info!(url = %url, path = %final_path.display(), bytes, "artifact verified");
        Ok(Artifact {
            path: final_path,
            bytes,
            url,
        })
    }
}

fn check_urls(urls: &[String]) -> Result<()> {
    if urls.is_empty() {
        return Err(GrabError::InvalidInput("empty url list".to_string()));
    }
    for (i, url) in urls.iter().enumerate() {
        if url.trim().is_empty() {
            return Err(GrabError::InvalidInput("empty url".to_string()));
        }
        if urls[..i].contains(url) {
            return Err(GrabError::InvalidInput(format!("url '{}' listed twice", url)));
        }
    }
    Ok(())
}

/// Older lock files write `Filename = ''` for "no explicit name".
fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
