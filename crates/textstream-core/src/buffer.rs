//! Backing storage for output streams.
//!
//! Two variants sit behind [`TextBuffer`]:
//! - [`OwnedBuffer`] owns a `Vec<u8>` and grows it geometrically.
//! - [`LinkedBuffer`] borrows caller memory of a fixed size. It can never
//!   reallocate, so its `limit` equals its capacity and the stream refuses
//!   writes past it.
//!
//! Invariants (both variants):
//! - `len() <= capacity() <= limit()`
//! - bytes in `0..len()` are initialized; nothing outside the supplied
//!   memory is ever touched

use crate::config::GrowthPolicy;
use crate::metrics::{StreamMetrics, global_metrics};

/// Storage contract used by [`OutputStream`](crate::OutputStream).
pub trait TextBuffer {
    /// Logical contents, `0..len()`.
    fn as_bytes(&self) -> &[u8];

    fn as_bytes_mut(&mut self) -> &mut [u8];

    fn len(&self) -> usize {
        self.as_bytes().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes addressable without reallocating.
    fn capacity(&self) -> usize;

    /// Largest logical length this buffer can ever reach.
    fn limit(&self) -> usize;

    /// Make at least `total` bytes addressable. Callers keep `total <= limit()`.
    fn reserve(&mut self, total: usize);

    /// Set the logical length, filling newly exposed bytes with `fill`.
    /// Callers keep `len <= limit()`.
    fn resize(&mut self, len: usize, fill: u8);
}

/// Heap buffer owned by the stream.
#[derive(Debug, Clone, Default)]
pub struct OwnedBuffer {
    bytes: Vec<u8>,
    growth: GrowthPolicy,
}

impl OwnedBuffer {
    #[must_use]
    pub fn new(growth: GrowthPolicy) -> Self {
        Self {
            bytes: Vec::new(),
            growth,
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize, growth: GrowthPolicy) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            growth,
        }
    }

    /// Adopt existing bytes as the buffer's contents.
    #[must_use]
    pub fn from_vec(bytes: Vec<u8>, growth: GrowthPolicy) -> Self {
        Self { bytes, growth }
    }

    #[must_use]
    pub fn growth(&self) -> GrowthPolicy {
        self.growth
    }

    /// Replace the contents with `bytes`.
    pub fn assign(&mut self, bytes: &[u8]) {
        self.bytes.clear();
        self.reserve(bytes.len());
        self.bytes.extend_from_slice(bytes);
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl TextBuffer for OwnedBuffer {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    fn limit(&self) -> usize {
        isize::MAX as usize
    }

    fn reserve(&mut self, total: usize) {
        let current = self.bytes.capacity();
        if total <= current {
            return;
        }
        let target = self.growth.next_capacity(current, total);
        self.bytes.reserve_exact(target - self.bytes.len());
        StreamMetrics::inc(&global_metrics().grows);
    }

    fn resize(&mut self, len: usize, fill: u8) {
        self.reserve(len);
        self.bytes.resize(len, fill);
    }
}

/// Fixed-size caller memory the stream writes into but never reallocates.
///
/// The logical length starts at 0; whatever the memory held before is
/// overwritten as the stream advances.
#[derive(Debug)]
pub struct LinkedBuffer<'a> {
    mem: &'a mut [u8],
    len: usize,
}

impl<'a> LinkedBuffer<'a> {
    #[must_use]
    pub fn new(mem: &'a mut [u8]) -> Self {
        Self { mem, len: 0 }
    }

    /// Give the memory back to the caller.
    #[must_use]
    pub fn into_inner(self) -> &'a mut [u8] {
        self.mem
    }
}

impl TextBuffer for LinkedBuffer<'_> {
    fn as_bytes(&self) -> &[u8] {
        &self.mem[..self.len]
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.mem[..self.len]
    }

    fn capacity(&self) -> usize {
        self.mem.len()
    }

    fn limit(&self) -> usize {
        self.mem.len()
    }

    fn reserve(&mut self, _total: usize) {}

    fn resize(&mut self, len: usize, fill: u8) {
        let len = len.min(self.mem.len());
        if len > self.len {
            self.mem[self.len..len].fill(fill);
        }
        self.len = len;
    }
}
