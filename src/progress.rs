//! Per-row progress reporting.
//!
//! [`RowProgress`] wraps an indicatif bar for the matching loop. Log lines
//! emitted while the bar is on screen go through [`RowProgress::log`] so they
//! don't tear the bar. In log-only mode the bar is hidden and a progress line
//! is logged every `interval` rows instead.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Global flag for log-only mode (set from args in main)
pub static LOG_ONLY: AtomicBool = AtomicBool::new(false);

const BAR_TEMPLATE: &str = "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})";

pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

pub fn is_log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// "1.5s" under a minute, "1.5m" above
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

/// Progress over a known number of chart rows.
pub struct RowProgress {
    bar: ProgressBar,
    phase: &'static str,
    total: u64,
    interval: u64,
}

impl RowProgress {
    pub fn new(phase: &'static str, total: u64, interval: u64) -> Self {
        let bar = ProgressBar::new(total);
        if is_log_only() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        } else {
            let style = ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> ");
            bar.set_style(style);
        }
        bar.set_message(phase);
        Self {
            bar,
            phase,
            total,
            interval,
        }
    }

    /// Run `f` (typically a tracing call) with the bar cleared from the terminal.
    pub fn log<R>(&self, f: impl FnOnce() -> R) -> R {
        self.bar.suspend(f)
    }

    /// Count one finished row.
    pub fn advance(&self) {
        self.bar.inc(1);
        let done = self.bar.position();
        if is_log_only() && is_log_point(done, self.total, self.interval) {
            let pct = 100.0 * done as f64 / self.total.max(1) as f64;
            tracing::info!("[{}] {}/{} ({:.1}%)", self.phase, done, self.total, pct);
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }

    /// Leave the bar where it stopped.
    pub fn abandon(&self, msg: String) {
        self.bar.abandon_with_message(msg);
    }
}

fn is_log_point(current: u64, total: u64, interval: u64) -> bool {
    interval > 0 && (current % interval == 0 || current == total)
}
