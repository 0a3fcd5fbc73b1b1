use std::path::PathBuf;
use std::time::Duration;

use crate::config::GrabConfig;
use crate::error::{GrabError, Result};
use crate::manifest::TagFilter;
use crate::transfer::TransferOptions;

/// Default number of resources in flight.
pub const DEFAULT_MAX_CONCURRENT: usize = 16;

/// Inputs of one `download` run.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Existing directory the artifacts are written into.
    pub dest_dir: PathBuf,
    pub filter: TagFilter,
    /// Octal permission string such as `"644"`; `None` leaves the umask default.
    pub permission: Option<String>,
    pub show_progress: bool,
    pub max_concurrent: usize,
    pub transfer: TransferOptions,
    pub probe_timeout: Duration,
}

impl DownloadOptions {
    pub fn new(dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            filter: TagFilter::default(),
            permission: None,
            show_progress: false,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            transfer: TransferOptions::default(),
            probe_timeout: Duration::from_secs(10),
        }
    }

    /// Network and concurrency knobs taken from the global config.
    pub fn from_config(dest_dir: impl Into<PathBuf>, cfg: &GrabConfig) -> Self {
        Self {
            max_concurrent: cfg.max_concurrent_downloads.max(1),
            transfer: cfg.transfer_options(),
            probe_timeout: cfg.probe_timeout(),
            ..Self::new(dest_dir)
        }
    }
}

/// Parses an octal permission string (`"644"`, `"0755"`).
///
/// Empty or absent means "no explicit mode". Anything that is not octal or
/// exceeds `0o7777` is rejected.
pub fn parse_permission(perm: Option<&str>) -> Result<Option<u32>> {
    let Some(raw) = perm else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match u32::from_str_radix(trimmed, 8) {
        Ok(mode) if mode <= 0o7777 => Ok(Some(mode)),
        _ => Err(GrabError::InvalidPermission(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_parsing() {
        assert_eq!(parse_permission(None).unwrap(), None);
        assert_eq!(parse_permission(Some("")).unwrap(), None);
        assert_eq!(parse_permission(Some("644")).unwrap(), Some(0o644));
        assert_eq!(parse_permission(Some("0755")).unwrap(), Some(0o755));
        assert_eq!(parse_permission(Some("4755")).unwrap(), Some(0o4755));
        for bad in ["abc", "999", "-1", "17777", "6 4 4"] {
            assert!(
                matches!(parse_permission(Some(bad)), Err(GrabError::InvalidPermission(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn options_from_config() {
        let mut cfg = GrabConfig::default();
        cfg.max_concurrent_downloads = 0;
        cfg.probe_timeout_secs = 3;
        let opts = DownloadOptions::from_config("/tmp", &cfg);
        assert_eq!(opts.max_concurrent, 1);
        assert_eq!(opts.probe_timeout, Duration::from_secs(3));
        assert!(opts.permission.is_none());
        assert!(!opts.show_progress);
    }
}
