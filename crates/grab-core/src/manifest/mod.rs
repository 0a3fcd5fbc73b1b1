//! The lock file: an ordered list of resources persisted as TOML.
//!
//! ```toml
//! [[Resource]]
//! Urls = ["https://primary/tool.tgz", "https://mirror/tool.tgz"]
//! Integrity = "sha256-..."
//! Tags = ["linux"]
//! Filename = "tool.tgz"
//! ```
//!
//! Mutations only touch memory; [`Manifest::save`] is the single point where
//! the file is rewritten.

mod filter;

pub use filter::TagFilter;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GrabError, Result};
use crate::resource::Resource;
use crate::transfer::TransferOptions;

/// On-disk document. Unknown keys are ignored.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LockDocument {
    #[serde(rename = "Resource", default, skip_serializing_if = "Vec::is_empty")]
    resources: Vec<Resource>,
}

#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    resources: Vec<Resource>,
}

impl Manifest {
    /// Loads the lock file at `path`.
    ///
    /// A missing file yields an empty manifest when `create_if_missing` is set
    /// (nothing is written until [`save`](Self::save)), and `NotFound` otherwise.
    pub fn load(path: impl AsRef<Path>, create_if_missing: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        match fs::metadata(&path) {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if create_if_missing {
                    tracing::debug!(path = %path.display(), "starting new lock file");
                    return Ok(Self {
                        path,
                        resources: Vec::new(),
                    });
                }
                return Err(GrabError::NotFound(path));
            }
            Err(e) => return Err(GrabError::io(format!("stat {}", path.display()), e)),
        }

        let data = fs::read_to_string(&path)
            .map_err(|e| GrabError::io(format!("read {}", path.display()), e))?;
        let doc: LockDocument = toml::from_str(&data).map_err(|e| GrabError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        if let Some(pos) = doc.resources.iter().position(|r| r.urls().is_empty()) {
            return Err(GrabError::Parse {
                path,
                message: format!("resource #{} has no urls", pos),
            });
        }

        tracing::debug!(path = %path.display(), resources = doc.resources.len(), "loaded lock file");
        Ok(Self {
            path,
            resources: doc.resources,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resources in file order.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// True if any resource lists `url` among its mirrors.
    pub fn contains(&self, url: &str) -> bool {
        self.resources.iter().any(|r| r.contains(url))
    }

    /// Appends an already-built resource, refusing any URL that is already recorded.
    pub fn insert(&mut self, resource: Resource) -> Result<&Resource> {
        self.check_unique(resource.urls())?;
        self.resources.push(resource);
        Ok(&self.resources[self.resources.len() - 1])
    }

    /// Declares a new artifact: fetches it from the first working mirror,
    /// records its integrity under `algorithm`, and appends it.
    ///
    /// URL collisions are rejected before any network access.
    pub async fn add_resource(
        &mut self,
        urls: Vec<String>,
        algorithm: &str,
        tags: Vec<String>,
        filename: Option<String>,
        opts: &TransferOptions,
    ) -> Result<&Resource> {
        self.check_unique(&urls)?;
        let resource = Resource::from_urls(urls, algorithm, tags, filename, opts).await?;
        self.insert(resource)
    }

    /// Removes every resource matching `target` (a mirror URL or an output
    /// filename). Returns how many were removed; zero is not an error.
    pub fn delete_resource(&mut self, target: &str) -> usize {
        let before = self.resources.len();
        self.resources.retain(|r| !r.matches(target));
        before - self.resources.len()
    }

    /// Resources passing `filter`, in file order.
    pub fn select(&self, filter: &TagFilter) -> Vec<&Resource> {
        self.resources.iter().filter(|r| filter.matches(r)).collect()
    }

    /// Writes the manifest to its path via a temp file and rename.
    pub fn save(&self) -> Result<()> {
        let doc = LockDocument {
            resources: self.resources.clone(),
        };
        let text = toml::to_string_pretty(&doc).map_err(|e| {
            GrabError::io(
                format!("serialize {}", self.path.display()),
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let write_err = |e: std::io::Error| GrabError::io(format!("write {}", self.path.display()), e);
        let mut tmp = lock_temp_file(&dir, &self.path).map_err(write_err)?;
        tmp.write_all(text.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        tracing::debug!(path = %self.path.display(), resources = self.resources.len(), "saved lock file");
        Ok(())
    }

    fn check_unique(&self, urls: &[String]) -> Result<()> {
        match urls.iter().find(|u| self.contains(u)) {
            Some(dup) => Err(GrabError::DuplicateResource(dup.clone())),
            None => Ok(()),
        }
    }
}

/// Temp file for a lock file rewrite. An existing lock file keeps its mode;
/// a new one gets `0o666` minus the umask like any freshly created file.
fn lock_temp_file(dir: &Path, target: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".grabit-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = match fs::metadata(target) {
            Ok(meta) => meta.permissions().mode() & 0o7777,
            Err(_) => 0o666,
        };
        builder.permissions(fs::Permissions::from_mode(mode));
    }
    #[cfg(not(unix))]
    let _ = target;
    builder.tempfile_in(dir)
}
