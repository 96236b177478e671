//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples token generation and quota backoff from
//! system resources (wall clock, sleeping, randomness). Production code runs
//! on [`SystemEnv`](crate::SystemEnv); the harness substitutes a seeded RNG
//! and a virtual clock so generation and backoff are reproducible.
//!
//! # Invariants
//!
//! - `random_bytes()` always fills the whole buffer
//! - `random_index(len)` returns a value in `0..len` for any `len > 0`
//! - `sleep()` is only awaited outside the probe window

use std::{future::Future, time::Duration};

use chrono::{DateTime, Utc};

/// Abstract environment providing time, randomness, and sleeping.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Returns the current wall-clock time.
    ///
    /// Wall clock rather than a monotonic instant: quota reset times reported
    /// by the remote API are absolute timestamps.
    fn now(&self) -> DateTime<Utc>;

    /// Sleeps for the specified duration.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Security
    ///
    /// Production implementations MUST draw from the OS entropy pool and may
    /// fall back to a non-cryptographic generator only for the part of the
    /// buffer the secure source failed to fill. Token payloads come from
    /// here.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Picks an index in `0..len` for non-adversarial choices (which prefix,
    /// which payload width). Returns 0 when `len` is 0.
    fn random_index(&self, len: usize) -> usize;

    /// Picks one of the given values, or `None` when there are none.
    fn choose<'a, T>(&self, values: &'a [T]) -> Option<&'a T> {
        values.get(self.random_index(values.len()))
    }
}
