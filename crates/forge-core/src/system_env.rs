//! Production Environment implementation using system time and RNG.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::{Rng, RngCore};

use crate::env::Environment;

/// Bytes requested from the OS per `getrandom` call.
///
/// Filling in chunks lets a failure fall back for the unfilled tail only.
const SECURE_CHUNK: usize = 16;

/// Production environment using system time and OS randomness.
///
/// This implementation:
/// - Uses `chrono::Utc::now()` for time
/// - Uses `tokio::time::sleep()` for async sleeping
/// - Uses `getrandom` for token payload bytes
/// - Uses the thread-local `rand` generator for prefix/width choices
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        let requested = buffer.len();
        let mut filled = 0;
        while filled < requested {
            let end = (filled + SECURE_CHUNK).min(requested);
            if let Err(e) = getrandom::fill(&mut buffer[filled..end]) {
                tracing::error!(
                    filled,
                    requested,
                    "getrandom failed, filling the rest insecurely: {}",
                    e
                );
                rand::thread_rng().fill_bytes(&mut buffer[filled..]);
                return;
            }
            filled = end;
        }
    }

    fn random_index(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_env_time_advances() {
        let env = SystemEnv::new();

        let t1 = env.now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = env.now();

        assert!(t2 > t1, "Time should advance");
    }

    #[test]
    fn system_env_random_bytes_are_random() {
        let env = SystemEnv::new();

        let mut bytes1 = [0u8; 32];
        let mut bytes2 = [0u8; 32];

        env.random_bytes(&mut bytes1);
        env.random_bytes(&mut bytes2);

        // Extremely unlikely to be equal if random
        assert_ne!(bytes1, bytes2, "Random bytes should differ");
    }

    #[test]
    fn system_env_random_bytes_fills_odd_sized_buffer() {
        let env = SystemEnv::new();

        // Not a multiple of the chunk size
        let mut bytes = [0u8; 71];
        env.random_bytes(&mut bytes);

        let non_zero_count = bytes.iter().filter(|&&b| b != 0).count();
        assert!(non_zero_count > 40, "Most bytes should be non-zero");
    }

    #[test]
    fn random_index_stays_in_range() {
        let env = SystemEnv::new();

        for _ in 0..1000 {
            assert!(env.random_index(4) < 4);
        }
        assert_eq!(env.random_index(0), 0);
        assert_eq!(env.choose::<u8>(&[]), None);
    }

    #[tokio::test]
    async fn system_env_sleep_works() {
        let env = SystemEnv::new();

        let start = std::time::Instant::now();
        env.sleep(Duration::from_millis(50)).await;

        assert!(start.elapsed() >= Duration::from_millis(50), "Sleep should wait at least 50ms");
    }
}
