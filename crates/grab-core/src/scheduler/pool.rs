//! Bounded pool of fetch workers over one selection.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::{GrabError, Result};
use crate::progress::ProgressHandle;
use crate::resource::{Artifact, Resource};
use crate::transfer::TransferOptions;

/// Shared, read-only inputs of every worker.
pub(crate) struct PoolJob {
    pub resources: Arc<Vec<Resource>>,
    pub dest_dir: PathBuf,
    pub mode: Option<u32>,
    pub transfer: TransferOptions,
    pub cancel: CancellationToken,
    pub progress: Option<ProgressHandle>,
}

/// Downloads every resource of `job` with at most `max_concurrent` in flight.
///
/// Returns one outcome per resource, indexed like `job.resources`, and only
/// after every worker has exited. A failing resource does not stop the others.
pub(crate) async fn run_pool(job: PoolJob, max_concurrent: usize) -> Vec<Result<Artifact>> {
    let count = job.resources.len();
    let work: Arc<Mutex<VecDeque<usize>>> = Arc::new(Mutex::new((0..count).collect()));
    let job = Arc::new(job);

    let num_workers = max_concurrent.max(1).min(count);
    let mut workers = JoinSet::new();
    for worker in 0..num_workers {
        let work = Arc::clone(&work);
        let job = Arc::clone(&job);
        workers.spawn(async move {
            let mut done = Vec::new();
            loop {
                let next = work.lock().await.pop_front();
                let Some(index) = next else { break };
                let resource = &job.resources[index];
                tracing::debug!(worker, index, url = %resource.primary_url(), "fetching");
                let res = resource
                    .download(&job.dest_dir, job.mode, &job.transfer, &job.cancel)
                    .await;
                if let Err(e) = &res {
                    tracing::warn!(index, url = %resource.primary_url(), error = %e, "resource failed");
                }
                if let Some(progress) = &job.progress {
                    progress.completed(index);
                }
                done.push((index, res));
            }
            done
        });
    }

    let mut slots: Vec<Option<Result<Artifact>>> = (0..count).map(|_| None).collect();
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(done) => {
                for (index, res) in done {
                    slots[index] = Some(res);
                }
            }
            Err(e) => tracing::error!("fetch worker panicked: {}", e),
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or_else(|| {
                Err(GrabError::io(
                    format!("resource #{} produced no result", index),
                    std::io::Error::other("fetch worker exited early"),
                ))
            })
        })
        .collect()
}
