//! Stream configuration.
//!
//! The buffer growth policy is set via the `TEXTSTREAM_GROWTH` environment
//! variable and read once per process:
//! - `double` (default): capacity at least doubles on every reallocation.
//! - `page`: capacity is rounded up to whole 4 KiB pages.
//!
//! Everything else on [`StreamConfig`] is per-stream and starts from
//! [`StreamConfig::default`].

use std::sync::OnceLock;

use crate::flags::FmtFlags;

/// Page size used by [`GrowthPolicy::PageAligned`].
pub const PAGE_SIZE: usize = 4096;

/// Smallest capacity an owned buffer grows to.
pub const MIN_GROWTH: usize = 64;

/// How an owned buffer picks its next capacity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrowthPolicy {
    /// `max(required, 2 * capacity, MIN_GROWTH)`.
    #[default]
    Doubling,
    /// `required` rounded up to a multiple of [`PAGE_SIZE`].
    PageAligned,
}

impl GrowthPolicy {
    /// Parse from string (case-insensitive). Unknown values select the default.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "double" | "doubling" | "geometric" => Self::Doubling,
            "page" | "paged" | "page-aligned" | "page_aligned" => Self::PageAligned,
            _ => Self::Doubling,
        }
    }

    /// Capacity to reserve when `required` bytes no longer fit in `current`.
    #[must_use]
    pub fn next_capacity(self, current: usize, required: usize) -> usize {
        match self {
            Self::Doubling => required.max(current.saturating_mul(2)).max(MIN_GROWTH),
            Self::PageAligned => required
                .max(1)
                .checked_next_multiple_of(PAGE_SIZE)
                .unwrap_or(required),
        }
    }
}

static GLOBAL_GROWTH: OnceLock<GrowthPolicy> = OnceLock::new();

/// Get the configured growth policy (reads env var on first call, caches thereafter).
#[must_use]
pub fn growth_policy() -> GrowthPolicy {
    *GLOBAL_GROWTH.get_or_init(|| {
        std::env::var("TEXTSTREAM_GROWTH")
            .map(|v| GrowthPolicy::from_str_loose(&v))
            .unwrap_or_default()
    })
}

/// Initial formatting state and buffer sizing for a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Numeric base, 2..=36.
    pub base: u8,
    /// Minimum field width for numbers; 0 disables padding.
    pub width: u16,
    /// Digits after the decimal separator.
    pub precision: u16,
    pub flags: FmtFlags,
    pub growth: GrowthPolicy,
    /// Bytes reserved up front by owned streams.
    pub initial_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            base: 10,
            width: 0,
            precision: 6,
            flags: FmtFlags::empty(),
            growth: growth_policy(),
            initial_capacity: 0,
        }
    }
}
