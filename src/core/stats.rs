//! Statistics tracking for multi-repository runs

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::outcome::Outcome;

/// Outcome counters shared by every task of a run
///
/// Atomic counters so tasks can record without taking a lock.
#[derive(Debug, Default)]
pub struct RunStatistics {
    pub done: AtomicU64,
    pub nothing: AtomicU64,
    pub failed: AtomicU64,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Done => &self.done,
            Outcome::Nothing => &self.nothing,
            Outcome::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
            + self.nothing.load(Ordering::Relaxed)
            + self.failed.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// One-line summary of the run
    pub fn generate_summary(&self, duration: Duration) -> String {
        let duration_secs = duration.as_secs_f64();
        let done = self.done.load(Ordering::Relaxed);
        let nothing = self.nothing.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);

        let mut summary = format!("✅ Completed in {duration_secs:.1}s • {done} done");
        if nothing > 0 {
            summary.push_str(&format!(" • {nothing} unchanged"));
        }
        summary.push_str(&format!(" • {failed} failed"));
        summary
    }
}
