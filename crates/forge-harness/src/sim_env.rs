//! Simulated environment.

use std::{
    future::{Future, ready},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use chrono::{DateTime, TimeDelta, Utc};
use forge_core::Environment;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic environment: seeded RNG, virtual clock, instant sleeps.
///
/// Clones share state, so a clone handed to a generator draws from the same
/// stream as the original.
#[derive(Clone, Debug)]
pub struct SimEnv {
    state: Arc<Mutex<SimState>>,
}

#[derive(Debug)]
struct SimState {
    rng: ChaCha8Rng,
    now: DateTime<Utc>,
    sleeps: Vec<Duration>,
}

impl SimEnv {
    /// Creates an environment seeded with `seed`, starting at the Unix epoch.
    pub fn with_seed(seed: u64) -> Self {
        Self::starting_at(seed, DateTime::default())
    }

    /// Creates an environment seeded with `seed`, starting at `now`.
    pub fn starting_at(seed: u64, now: DateTime<Utc>) -> Self {
        let state = SimState { rng: ChaCha8Rng::seed_from_u64(seed), now, sleeps: Vec::new() };
        Self { state: Arc::new(Mutex::new(state)) }
    }

    /// Moves the virtual clock forward.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.state();
        let delta = TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX);
        state.now = state.now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC);
    }

    /// Every sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state().sleeps.clone()
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Environment for SimEnv {
    fn now(&self) -> DateTime<Utc> {
        self.state().now
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.state().sleeps.push(duration);
        self.advance(duration);
        ready(())
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.state().rng.fill_bytes(buffer);
    }

    fn random_index(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.state().rng.gen_range(0..len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_bytes() {
        let a = SimEnv::with_seed(42);
        let b = SimEnv::with_seed(42);

        let mut left = [0u8; 32];
        let mut right = [0u8; 32];
        a.random_bytes(&mut left);
        b.random_bytes(&mut right);

        assert_eq!(left, right);
    }

    #[test]
    fn clones_share_the_stream() {
        let a = SimEnv::with_seed(42);
        let b = a.clone();

        let mut first = [0u8; 16];
        let mut second = [0u8; 16];
        a.random_bytes(&mut first);
        b.random_bytes(&mut second);

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn sleep_advances_virtual_clock() {
        let env = SimEnv::with_seed(1);
        let before = env.now();

        env.sleep(Duration::from_secs(90)).await;

        assert_eq!((env.now() - before).num_seconds(), 90);
        assert_eq!(env.sleeps(), vec![Duration::from_secs(90)]);
    }

    #[test]
    fn random_index_stays_in_range() {
        let env = SimEnv::with_seed(3);
        assert_eq!(env.random_index(0), 0);
        for _ in 0..100 {
            assert!(env.random_index(4) < 4);
        }
    }
}
