//! Conversion statistics with atomic counters.
//!
//! This module provides [`ConvertStats`], updated by the per-file workers
//! while a run transforms files, and [`StatsSnapshot`] for a point-in-time
//! view of it.
//!
//! # Thread Safety
//!
//! All counters use [`AtomicU64`] with [`Relaxed`](std::sync::atomic::Ordering::Relaxed)
//! ordering. The counters are reported after the workers join, so no
//! ordering between them is needed.
//!
//! # Examples
//!
//! ```
//! use rn_convert::ConvertStats;
//!
//! let stats = ConvertStats::new();
//! stats.increment_scripts();
//! stats.record_converted(3);
//!
//! let snapshot = stats.snapshot();
//! assert_eq!(snapshot.converted, 1);
//! assert_eq!(snapshot.rewrite_actions, 3);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use rn_core::ConversionStats;
use serde::{Deserialize, Serialize};

/// Atomic counters for one conversion run.
#[derive(Debug, Default)]
pub struct ConvertStats {
    /// Files accepted by ingestion.
    total: AtomicU64,
    /// Script files handed to the rewrite passes.
    scripts: AtomicU64,
    /// Script files whose text changed.
    converted: AtomicU64,
    /// Edits applied across all files.
    rewrite_actions: AtomicU64,
    /// Script files kept as-is after a failure.
    failed: AtomicU64,
    /// Constructs flagged for manual review.
    flagged: AtomicU64,
    /// Script files not processed because the run was cancelled.
    skipped: AtomicU64,
}

impl ConvertStats {
    /// Creates a new [`ConvertStats`] with all counters at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of ingested files.
    #[inline]
    pub fn set_total(&self, total: usize) {
        self.total.store(to_u64(total), Ordering::Relaxed);
    }

    /// Increments the script files counter.
    #[inline]
    pub fn increment_scripts(&self) {
        self.scripts.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a file whose text changed through `actions` edits.
    #[inline]
    pub fn record_converted(&self, actions: usize) {
        self.converted.fetch_add(1, Ordering::Relaxed);
        self.rewrite_actions
            .fetch_add(to_u64(actions), Ordering::Relaxed);
    }

    /// Increments the failed files counter.
    #[inline]
    pub fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds to the flagged constructs counter.
    #[inline]
    pub fn add_flagged(&self, count: usize) {
        self.flagged.fetch_add(to_u64(count), Ordering::Relaxed);
    }

    /// Increments the skipped files counter.
    #[inline]
    pub fn increment_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total.load(Ordering::Relaxed),
            scripts: self.scripts.load(Ordering::Relaxed),
            converted: self.converted.load(Ordering::Relaxed),
            rewrite_actions: self.rewrite_actions.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            flagged: self.flagged.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.total.store(0, Ordering::Relaxed);
        self.scripts.store(0, Ordering::Relaxed);
        self.converted.store(0, Ordering::Relaxed);
        self.rewrite_actions.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.flagged.store(0, Ordering::Relaxed);
        self.skipped.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of [`ConvertStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Files accepted by ingestion.
    pub total: u64,
    /// Script files handed to the rewrite passes.
    pub scripts: u64,
    /// Script files whose text changed.
    pub converted: u64,
    /// Edits applied across all files.
    pub rewrite_actions: u64,
    /// Script files kept as-is after a failure.
    pub failed: u64,
    /// Constructs flagged for manual review.
    pub flagged: u64,
    /// Script files not processed because the run was cancelled.
    pub skipped: u64,
}

impl StatsSnapshot {
    /// Returns the percentage of script files that changed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn converted_percent(&self) -> f64 {
        if self.scripts == 0 {
            0.0
        } else {
            (self.converted as f64 / self.scripts as f64) * 100.0
        }
    }

    /// Converts the snapshot into the counters a result reports.
    #[must_use]
    pub fn to_conversion_stats(&self, elapsed_ms: u64) -> ConversionStats {
        ConversionStats {
            total_files: to_usize(self.total),
            converted_files: to_usize(self.converted),
            conversion_time: elapsed_ms,
            rewrite_actions: to_usize(self.rewrite_actions),
            failed_files: to_usize(self.failed),
        }
    }
}

fn to_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = ConvertStats::new();
        stats.set_total(10);
        stats.increment_scripts();
        stats.increment_scripts();
        stats.record_converted(4);
        stats.increment_failed();
        stats.add_flagged(2);

        let snap = stats.snapshot();
        assert_eq!(snap.total, 10);
        assert_eq!(snap.scripts, 2);
        assert_eq!(snap.converted, 1);
        assert_eq!(snap.rewrite_actions, 4);
        assert_eq!(snap.failed, 1);
        assert_eq!(snap.flagged, 2);
        assert!((snap.converted_percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset() {
        let stats = ConvertStats::new();
        stats.set_total(3);
        stats.increment_skipped();
        stats.reset();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_to_conversion_stats() {
        let snap = StatsSnapshot {
            total: 5,
            converted: 2,
            rewrite_actions: 7,
            failed: 1,
            ..StatsSnapshot::default()
        };
        let stats = snap.to_conversion_stats(42);
        assert_eq!(stats.total_files, 5);
        assert_eq!(stats.converted_files, 2);
        assert_eq!(stats.conversion_time, 42);
        assert_eq!(stats.rewrite_actions, 7);
        assert_eq!(stats.failed_files, 1);
    }

    #[test]
    fn test_concurrent_updates() {
        let stats = ConvertStats::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        stats.increment_scripts();
                    }
                });
            }
        });
        assert_eq!(stats.snapshot().scripts, 400);
    }
}
