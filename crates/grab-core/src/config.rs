use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::transfer::TransferOptions;

/// Per-mirror retry of transient failures (optional `[retry]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per mirror, including the first.
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/grab/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrabConfig {
    /// Resources transferred at once during `download`.
    pub max_concurrent_downloads: usize,
    pub connect_timeout_secs: u64,
    /// Upper bound for one whole transfer.
    pub transfer_timeout_secs: u64,
    /// Timeout of each HEAD request used to size the progress line.
    pub probe_timeout_secs: u64,
    /// Digest algorithm for new resources when none is given.
    pub default_algorithm: String,
    /// Optional retry policy; without it every mirror gets a single attempt.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: 16,
            connect_timeout_secs: 30,
            transfer_timeout_secs: 3600,
            probe_timeout_secs: 10,
            default_algorithm: crate::integrity::Algorithm::RECOMMENDED.name().to_string(),
            retry: None,
        }
    }
}

impl GrabConfig {
    pub fn transfer_options(&self) -> TransferOptions {
        TransferOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.transfer_timeout_secs),
            retry: self
                .retry
                .as_ref()
                .map(RetryConfig::policy)
                .unwrap_or_default(),
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("grab")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GrabConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GrabConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: GrabConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = GrabConfig::default();
        assert_eq!(cfg.max_concurrent_downloads, 16);
        assert_eq!(cfg.default_algorithm, "sha256");
        let opts = cfg.transfer_options();
        assert_eq!(opts.retry.max_attempts, 1);
        assert_eq!(opts.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = GrabConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: GrabConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.max_concurrent_downloads, cfg.max_concurrent_downloads);
        assert_eq!(parsed.transfer_timeout_secs, cfg.transfer_timeout_secs);
        assert_eq!(parsed.default_algorithm, cfg.default_algorithm);
        assert!(parsed.retry.is_none());
    }

    #[test]
    fn config_toml_with_retry() {
        let toml = r#"
            max_concurrent_downloads = 4
            connect_timeout_secs = 5
            transfer_timeout_secs = 60
            probe_timeout_secs = 2
            default_algorithm = "sha512"

            [retry]
            max_attempts = 4
            base_delay_secs = 0.5
            max_delay_secs = 8
        "#;
        let cfg: GrabConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.max_concurrent_downloads, 4);
        assert_eq!(cfg.probe_timeout(), Duration::from_secs(2));
        let policy = cfg.transfer_options().retry;
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(8));
    }
}
