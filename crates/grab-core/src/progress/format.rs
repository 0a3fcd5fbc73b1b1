//! Human-readable byte counts and elapsed time.

use std::time::Duration;

const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

/// SI byte count: `0 B`, `12 B`, `6.0 kB`, `15 kB`, `1.2 MB`.
///
/// One decimal below 10 of a unit, none above.
pub fn human_bytes(n: u64) -> String {
    if n < 10 {
        return format!("{} B", n);
    }
    let mut scaled = n as f64;
    let mut unit = 0;
    while scaled >= 1000.0 && unit < UNITS.len() - 1 {
        scaled /= 1000.0;
        unit += 1;
    }
    let rounded = (scaled * 10.0 + 0.5).floor() / 10.0;
    if rounded < 10.0 {
        format!("{:.1} {}", rounded, UNITS[unit])
    } else {
        format!("{:.0} {}", rounded, UNITS[unit])
    }
}

/// Whole seconds, rounding half up.
pub fn whole_seconds(d: Duration) -> u64 {
    (d.as_millis() as u64 + 500) / 1000
}
