//! Live status line for a download run.
//!
//! A single render task owns every counter. Fetch tasks report through a
//! [`ProgressHandle`], which only enqueues an event and never blocks. The
//! render task folds events and periodic ticks into a [`StatusLine`] and
//! redraws it in place until every resource has reported.

mod format;
mod status_line;

pub use format::{human_bytes, whole_seconds};
pub use status_line::{ProgressEvent, StatusLine, SIZES_UNAVAILABLE};

use std::io::Write;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::color::{paint, Color};
use crate::transfer;

/// Where the status line is drawn.
pub type ProgressSink = Box<dyn Write + Send>;

/// Redraw period for the spinner and clock.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Sender side given to fetch tasks.
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressHandle {
    /// Reports that the resource at `index` (selection order) has finished.
    pub fn completed(&self, index: usize) {
        // The render task may already have drawn its final line.
        let _ = self.tx.send(ProgressEvent::Completed { index });
    }
}

/// Options for drawing the status line.
pub struct RenderOptions {
    pub sink: ProgressSink,
    /// Yellow while running, green when done.
    pub colored: bool,
    pub tick: Duration,
}

impl RenderOptions {
    pub fn new(sink: ProgressSink, colored: bool) -> Self {
        Self {
            sink,
            colored,
            tick: TICK_INTERVAL,
        }
    }
}

/// A running status line.
pub struct ProgressReporter {
    handle: ProgressHandle,
    task: JoinHandle<()>,
}

impl ProgressReporter {
    /// Sizes every resource with a HEAD request against its primary URL, then
    /// starts the render task.
    ///
    /// Sizing failures degrade the byte display; they never fail the run.
    /// Cancelling `cancel` stops sizing at once and degrades as well.
    pub async fn start(
        primary_urls: Vec<String>,
        probe_timeout: Duration,
        cancel: &CancellationToken,
        mut render: RenderOptions,
    ) -> Self {
        let _ = write!(render.sink, "\rFetching resource sizes...");
        let _ = render.sink.flush();
        let total = primary_urls.len();
        let sizes = probe_sizes(primary_urls, probe_timeout, cancel).await;
        Self::with_line(StatusLine::new(total, sizes), render)
    }

    /// Starts the render task for an already-sized line.
    pub fn with_line(line: StatusLine, render: RenderOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(render_loop(line, rx, render));
        Self {
            handle: ProgressHandle { tx },
            task,
        }
    }

    pub fn handle(&self) -> ProgressHandle {
        self.handle.clone()
    }

    /// Waits for the final line. Returns early if every other handle is gone
    /// before all resources reported.
    pub async fn finish(self) {
        drop(self.handle);
        if let Err(e) = self.task.await {
            tracing::warn!("progress task failed: {}", e);
        }
    }
}

/// HEAD-probes each URL in order. `None` as soon as one size is unknown or
/// `cancel` fires.
pub async fn probe_sizes(
    urls: Vec<String>,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Option<Vec<u64>> {
    let cancel = cancel.clone();
    let probed = tokio::task::spawn_blocking(move || {
        let mut sizes = Vec::with_capacity(urls.len());
        for url in &urls {
            if cancel.is_cancelled() {
                tracing::debug!("size probing cancelled");
                return None;
            }
            match transfer::probe_content_length(url, timeout, &cancel) {
                Ok(head) => match head.content_length {
                    Some(len) => sizes.push(len),
                    None => {
                        tracing::warn!(url = %url, "no Content-Length; byte totals disabled");
                        return None;
                    }
                },
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "size probe failed; byte totals disabled");
                    return None;
                }
            }
        }
        Some(sizes)
    })
    .await;

    match probed {
        Ok(sizes) => sizes,
        Err(e) => {
            tracing::warn!("size probe task failed: {}", e);
            None
        }
    }
}

async fn render_loop(
    mut line: StatusLine,
    mut rx: mpsc::UnboundedReceiver<ProgressEvent>,
    mut render: RenderOptions,
) {
    let started = Instant::now();
    let mut ticker = tokio::time::interval(render.tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // First tick completes immediately.
    ticker.tick().await;

    draw(&mut render, &line, started.elapsed());
    while !line.is_done() {
        let event = tokio::select! {
            ev = rx.recv() => match ev {
                Some(ev) => ev,
                None => break,
            },
            _ = ticker.tick() => ProgressEvent::Tick,
        };
        line.apply(event);
        draw(&mut render, &line, started.elapsed());
    }
    let _ = writeln!(render.sink);
    let _ = render.sink.flush();
}

fn draw(render: &mut RenderOptions, line: &StatusLine, elapsed: Duration) {
    let text = line.render(elapsed);
    let text = if render.colored {
        let color = if line.is_done() { Color::Green } else { Color::Yellow };
        paint(&text, color)
    } else {
        text
    };
    let _ = write!(render.sink, "\r{}", text);
    let _ = render.sink.flush();
}
