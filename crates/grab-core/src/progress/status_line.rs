//! State and rendering of the single-line download status.

use std::time::Duration;

use super::format::{human_bytes, whole_seconds};

const SPINNER: [&str; 4] = ["-", "\\", "|", "/"];
const DONE_GLYPH: &str = "✔";
const BAR_WIDTH: usize = 20;
const PAD: &str = "  ";

/// Shown in place of the byte counters when sizing failed.
pub const SIZES_UNAVAILABLE: &str = "<sizes unavailable>";

/// Input to the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The resource at this selection index finished, successfully or not.
    Completed { index: usize },
    /// Periodic redraw; moves the spinner and clock only.
    Tick,
}

/// Counters behind the status line. Owned by exactly one task.
#[derive(Debug, Clone)]
pub struct StatusLine {
    total_resources: usize,
    /// Per-resource sizes; `None` when sizing failed (degraded mode).
    sizes: Option<Vec<u64>>,
    total_bytes: u64,
    seen: Vec<bool>,
    resources_done: usize,
    bytes_done: u64,
    spin: usize,
}

impl StatusLine {
    /// `sizes` must have one entry per resource; anything else degrades.
    pub fn new(total_resources: usize, sizes: Option<Vec<u64>>) -> Self {
        let sizes = sizes.filter(|s| s.len() == total_resources);
        let total_bytes = sizes.as_ref().map(|s| s.iter().sum::<u64>()).unwrap_or(0);
        Self {
            total_resources,
            sizes,
            total_bytes,
            seen: vec![false; total_resources],
            resources_done: 0,
            bytes_done: 0,
            spin: 0,
        }
    }

    /// Folds one event into the counters. Each index counts once; repeats
    /// and out-of-range indices only move the spinner.
    pub fn apply(&mut self, event: ProgressEvent) {
        if let ProgressEvent::Completed { index } = event {
            if let Some(seen) = self.seen.get_mut(index) {
                if !*seen {
                    *seen = true;
                    self.resources_done += 1;
                    if let Some(sizes) = &self.sizes {
                        self.bytes_done += sizes[index];
                    }
                }
            }
        }
        self.spin = (self.spin + 1) % SPINNER.len();
    }

    pub fn is_done(&self) -> bool {
        self.resources_done >= self.total_resources
    }

    pub fn is_degraded(&self) -> bool {
        self.sizes.is_none()
    }

    pub fn resources_done(&self) -> usize {
        self.resources_done
    }

    pub fn bytes_done(&self) -> u64 {
        self.bytes_done
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// The line as printed, without the leading `\r` and without colour.
    pub fn render(&self, elapsed: Duration) -> String {
        let spinner = if self.is_done() {
            DONE_GLYPH
        } else {
            SPINNER[self.spin]
        };
        let counts = format!("{}/{} Resources", self.resources_done, self.total_resources);
        let bytes = if self.is_degraded() {
            SIZES_UNAVAILABLE.to_string()
        } else {
            format!(
                "{} / {}",
                human_bytes(self.bytes_done),
                human_bytes(self.total_bytes)
            )
        };
        format!(
            "{spinner}{bar}{PAD}{counts}{PAD}{bytes}{PAD}{secs}s elapsed",
            bar = self.bar(),
            secs = whole_seconds(elapsed),
        )
    }

    /// Fixed-width bar filled by bytes, or by resource count when bytes are unknown.
    fn bar(&self) -> String {
        let filled = if !self.is_degraded() && self.total_bytes > 0 {
            let done = self.bytes_done.min(self.total_bytes) as u128;
            (done * BAR_WIDTH as u128 / self.total_bytes as u128) as usize
        } else {
            self.resources_done.min(self.total_resources) * BAR_WIDTH
                / self.total_resources.max(1)
        };
        format!("[{}{}]", "█".repeat(filled), " ".repeat(BAR_WIDTH - filled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO: Duration = Duration::ZERO;

    #[test]
    fn thousand_resources_track_exact_counts() {
        let mut line = StatusLine::new(1000, Some(vec![6; 1000]));
        assert_eq!(
            line.render(ZERO),
            "-[                    ]  0/1000 Resources  0 B / 6.0 kB  0s elapsed"
        );
        line.apply(ProgressEvent::Completed { index: 0 });
        assert_eq!(
            line.render(ZERO),
            "\\[                    ]  1/1000 Resources  6 B / 6.0 kB  0s elapsed"
        );
        line.apply(ProgressEvent::Completed { index: 1 });
        assert_eq!(
            line.render(ZERO),
            "|[                    ]  2/1000 Resources  12 B / 6.0 kB  0s elapsed"
        );
        line.apply(ProgressEvent::Completed { index: 2 });
        assert_eq!(
            line.render(ZERO),
            "/[                    ]  3/1000 Resources  18 B / 6.0 kB  0s elapsed"
        );
        line.apply(ProgressEvent::Completed { index: 3 });
        assert_eq!(
            line.render(ZERO),
            "-[                    ]  4/1000 Resources  24 B / 6.0 kB  0s elapsed"
        );

        // Completion order does not matter; each step adds exactly one size.
        for index in (4..1000).rev() {
            line.apply(ProgressEvent::Completed { index });
            let done = 1000 - index + 4;
            assert_eq!(line.resources_done(), done);
            assert_eq!(line.bytes_done(), done as u64 * 6);
        }
        assert!(line.is_done());
        assert_eq!(
            line.render(Duration::from_millis(3400)),
            "✔[████████████████████]  1000/1000 Resources  6.0 kB / 6.0 kB  3s elapsed"
        );
    }

    #[test]
    fn ticks_and_repeats_do_not_move_counters() {
        let mut line = StatusLine::new(2, Some(vec![10, 30]));
        line.apply(ProgressEvent::Tick);
        line.apply(ProgressEvent::Completed { index: 1 });
        line.apply(ProgressEvent::Completed { index: 1 });
        line.apply(ProgressEvent::Completed { index: 7 });
        assert_eq!(line.resources_done(), 1);
        assert_eq!(line.bytes_done(), 30);
        assert_eq!(
            line.render(Duration::from_secs(12)),
            "-[███████████████     ]  1/2 Resources  30 B / 40 B  12s elapsed"
        );
    }

    #[test]
    fn degraded_mode_uses_resource_counts() {
        let mut line = StatusLine::new(4, None);
        assert!(line.is_degraded());
        line.apply(ProgressEvent::Completed { index: 2 });
        assert_eq!(
            line.render(ZERO),
            "\\[█████               ]  1/4 Resources  <sizes unavailable>  0s elapsed"
        );
    }

    #[test]
    fn size_list_of_wrong_length_degrades() {
        let line = StatusLine::new(3, Some(vec![1, 2]));
        assert!(line.is_degraded());
        assert_eq!(line.total_bytes(), 0);
    }

    #[test]
    fn zero_byte_artifacts_fill_by_count() {
        let mut line = StatusLine::new(2, Some(vec![0, 0]));
        line.apply(ProgressEvent::Completed { index: 0 });
        assert!(line.render(ZERO).starts_with("\\[██████████          ]  1/2 Resources  0 B / 0 B"));
    }
}
