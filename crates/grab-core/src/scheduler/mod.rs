//! Download orchestrator.
//!
//! Selects resources from a manifest, fans them out to a bounded worker pool
//! sharing one cancellation scope, optionally drives the progress line, and
//! reports the first failure by selection order once every task is done.

mod options;
mod pool;

pub use options::{parse_permission, DownloadOptions, DEFAULT_MAX_CONCURRENT};

use std::io::IsTerminal;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::{GrabError, Result};
use crate::manifest::Manifest;
use crate::progress::{ProgressReporter, ProgressSink, RenderOptions};
use crate::resource::{Artifact, Resource};

use pool::{run_pool, PoolJob};

/// Verified artifacts of a successful run, in selection order.
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    pub artifacts: Vec<Artifact>,
}

impl DownloadReport {
    pub fn total_bytes(&self) -> u64 {
        self.artifacts.iter().map(|a| a.bytes).sum()
    }
}

/// Downloads every resource selected by `opts.filter` into `opts.dest_dir`.
pub async fn download_all(manifest: &Manifest, opts: DownloadOptions) -> Result<DownloadReport> {
    Downloader::new(opts).run(manifest).await
}

/// One configured download run.
pub struct Downloader {
    opts: DownloadOptions,
    cancel: CancellationToken,
    sink: Option<ProgressSink>,
    colored: bool,
}

impl Downloader {
    /// Progress, when enabled, goes to stdout and is coloured if stdout is a terminal.
    pub fn new(opts: DownloadOptions) -> Self {
        Self {
            opts,
            cancel: CancellationToken::new(),
            sink: None,
            colored: std::io::stdout().is_terminal(),
        }
    }

    /// Runs under `token`; cancelling it aborts every outstanding fetch.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Draws the status line into `sink` instead of stdout. Implies progress.
    pub fn with_progress_sink(mut self, sink: ProgressSink, colored: bool) -> Self {
        self.opts.show_progress = true;
        self.sink = Some(sink);
        self.colored = colored;
        self
    }

    /// Token shared by all fetch tasks of this run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(self, manifest: &Manifest) -> Result<DownloadReport> {
        let Downloader {
            opts,
            cancel,
            sink,
            colored,
        } = self;

        if !opts.dest_dir.is_dir() {
            return Err(GrabError::InvalidDestination(opts.dest_dir.clone()));
        }
        let mode = parse_permission(opts.permission.as_deref())?;

        let selected: Vec<Resource> = manifest
            .select(&opts.filter)
            .into_iter()
            .cloned()
            .collect();
        if selected.is_empty() {
            return Err(GrabError::NothingToDownload);
        }
        tracing::info!(
            count = selected.len(),
            dest = %opts.dest_dir.display(),
            workers = opts.max_concurrent,
            "starting download"
        );

        // Any return path below closes the scope.
        let _scope = cancel.clone().drop_guard();

        let reporter = if opts.show_progress {
            let sink = sink.unwrap_or_else(|| Box::new(std::io::stdout()));
            let primaries = selected.iter().map(|r| r.primary_url().to_string()).collect();
            Some(
                ProgressReporter::start(
                    primaries,
                    opts.probe_timeout,
                    &cancel,
                    RenderOptions::new(sink, colored),
                )
                .await,
            )
        } else {
            None
        };

        let resources = Arc::new(selected);
        let job = PoolJob {
            resources: Arc::clone(&resources),
            dest_dir: opts.dest_dir.clone(),
            mode,
            transfer: opts.transfer,
            cancel: cancel.clone(),
            progress: reporter.as_ref().map(ProgressReporter::handle),
        };
        let outcomes = run_pool(job, opts.max_concurrent).await;

        if let Some(reporter) = reporter {
            reporter.finish().await;
        }

        let mut artifacts = Vec::with_capacity(outcomes.len());
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(artifact) => artifacts.push(artifact),
                Err(source) => {
                    return Err(GrabError::Resource {
                        index,
                        url: resources[index].primary_url().to_string(),
                        source: Box::new(source),
                    })
                }
            }
        }
        tracing::info!(count = artifacts.len(), "download finished");
        Ok(DownloadReport { artifacts })
    }
}
