//! Atomic counters for stream observability.
//!
//! All counters use relaxed ordering. They are advisory/diagnostic, not
//! synchronization primitives, and are shared by every stream in the process.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global stream operation counters.
pub struct StreamMetrics {
    /// Bytes appended or overwritten through any write path.
    pub bytes_written: AtomicU64,
    /// Values routed through the typed dispatch.
    pub values_written: AtomicU64,
    /// Owned-buffer reallocations.
    pub grows: AtomicU64,
    /// Calls into the printf engine.
    pub format_calls: AtomicU64,
    /// Second formatting attempts after the first guess was too small.
    pub format_retries: AtomicU64,
    pub flushes: AtomicU64,
    /// Linked-buffer writes refused for lack of room.
    pub capacity_violations: AtomicU64,
    /// Text writes refused for containing NUL.
    pub nul_rejections: AtomicU64,
}

impl StreamMetrics {
    /// Create a new zeroed metrics instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes_written: AtomicU64::new(0),
            values_written: AtomicU64::new(0),
            grows: AtomicU64::new(0),
            format_calls: AtomicU64::new(0),
            format_retries: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
            capacity_violations: AtomicU64::new(0),
            nul_rejections: AtomicU64::new(0),
        }
    }

    /// Increment a counter by 1.
    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment a counter by `n`.
    pub fn add(counter: &AtomicU64, n: usize) {
        counter.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Read a counter value.
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    /// Snapshot all counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bytes_written: Self::get(&self.bytes_written),
            values_written: Self::get(&self.values_written),
            grows: Self::get(&self.grows),
            format_calls: Self::get(&self.format_calls),
            format_retries: Self::get(&self.format_retries),
            flushes: Self::get(&self.flushes),
            capacity_violations: Self::get(&self.capacity_violations),
            nul_rejections: Self::get(&self.nul_rejections),
        }
    }
}

impl Default for StreamMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time snapshot of all stream counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub bytes_written: u64,
    pub values_written: u64,
    pub grows: u64,
    pub format_calls: u64,
    pub format_retries: u64,
    pub flushes: u64,
    pub capacity_violations: u64,
    pub nul_rejections: u64,
}

impl MetricsSnapshot {
    /// Counter-wise difference `self - earlier`, saturating at zero.
    #[must_use]
    pub fn since(&self, earlier: &MetricsSnapshot) -> MetricsSnapshot {
        MetricsSnapshot {
            bytes_written: self.bytes_written.saturating_sub(earlier.bytes_written),
            values_written: self.values_written.saturating_sub(earlier.values_written),
            grows: self.grows.saturating_sub(earlier.grows),
            format_calls: self.format_calls.saturating_sub(earlier.format_calls),
            format_retries: self.format_retries.saturating_sub(earlier.format_retries),
            flushes: self.flushes.saturating_sub(earlier.flushes),
            capacity_violations: self
                .capacity_violations
                .saturating_sub(earlier.capacity_violations),
            nul_rejections: self.nul_rejections.saturating_sub(earlier.nul_rejections),
        }
    }
}

/// Global metrics instance.
static GLOBAL_METRICS: StreamMetrics = StreamMetrics::new();

/// Access the global stream metrics.
#[must_use]
pub fn global_metrics() -> &'static StreamMetrics {
    &GLOBAL_METRICS
}
