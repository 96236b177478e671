//! Recording sinks.

use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use forge_core::{Progress, Record, RecordSink};

/// Keeps every emitted record.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Record>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records emitted so far, in order.
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl RecordSink for MemorySink {
    fn emit(&self, record: &Record) {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).push(record.clone());
    }
}

/// Counts progress signals.
#[derive(Debug, Default)]
pub struct CountingProgress {
    incs: AtomicU64,
    finished: AtomicBool,
}

impl CountingProgress {
    /// Creates a zeroed counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// `inc` calls so far.
    pub fn incs(&self) -> u64 {
        self.incs.load(Ordering::SeqCst)
    }

    /// Whether `finish` was called.
    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

impl Progress for CountingProgress {
    fn inc(&self) {
        self.incs.fetch_add(1, Ordering::SeqCst);
    }

    fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }
}
