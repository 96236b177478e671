//! Progress reporting.
//!
//! The engine signals one `inc` per consumed probe result and one `finish`
//! when the run is over; rendering is up to the implementation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Number of progress lines a known total is split into.
const STEPS: u64 = 20;

/// Stride used when the total is unknown or too large to step evenly.
const UNBOUNDED_STRIDE: u64 = 10_000;

/// Consumer of progress signals.
pub trait Progress: Send + Sync {
    /// One more probe result was consumed.
    fn inc(&self);

    /// The run is over.
    fn finish(&self);
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn inc(&self) {}

    fn finish(&self) {}
}

/// Reports progress as log lines at a bounded rate.
#[derive(Debug)]
pub struct LogProgress {
    total: u64,
    stride: u64,
    done: AtomicU64,
}

impl LogProgress {
    /// Creates a reporter for `total` items (0 = unknown).
    pub fn new(total: u64) -> Self {
        let stride = if total == 0 || total == u64::MAX {
            UNBOUNDED_STRIDE
        } else {
            (total / STEPS).max(1)
        };
        Self { total, stride, done: AtomicU64::new(0) }
    }

    /// Items consumed so far.
    pub fn done(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }

    /// Items between two log lines.
    pub fn stride(&self) -> u64 {
        self.stride
    }
}

impl Progress for LogProgress {
    fn inc(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if done % self.stride == 0 {
            if self.total == 0 {
                tracing::info!(done, "testing...");
            } else {
                tracing::info!(done, total = self.total, "testing... {}/{}", done, self.total);
            }
        }
    }

    fn finish(&self) {
        tracing::info!(done = self.done(), "testing finished");
    }
}
