//! `grab download` – fetch and verify the selected resources.

use anyhow::Result;
use grab_core::config::GrabConfig;
use grab_core::{DownloadOptions, Downloader, Manifest, TagFilter};
use std::path::{Path, PathBuf};

/// Flags of the `download` subcommand.
#[derive(Debug, Clone)]
pub struct DownloadArgs {
    pub dir: PathBuf,
    pub tags: Vec<String>,
    pub notags: Vec<String>,
    pub perm: Option<String>,
    pub status: bool,
}

pub async fn run_download(lock: &Path, cfg: &GrabConfig, args: DownloadArgs) -> Result<()> {
    let manifest = Manifest::load(lock, false)?;

    let mut opts = DownloadOptions::from_config(args.dir, cfg);
    opts.filter = TagFilter::new(args.tags, args.notags);
    opts.permission = args.perm;
    opts.show_progress = args.status;

    let downloader = Downloader::new(opts);
    let token = downloader.cancellation_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted; cancelling downloads");
            token.cancel();
        }
    });

    let outcome = downloader.run(&manifest).await;
    ctrl_c.abort();
    let report = outcome?;

    if !args.status {
        for artifact in &report.artifacts {
            println!("{}", artifact.path.display());
        }
    }
    tracing::info!(
        count = report.artifacts.len(),
        bytes = report.total_bytes(),
        "downloaded"
    );
    Ok(())
}
