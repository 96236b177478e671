//! Deterministic test support for token-forge.
//!
//! Substitutes for everything the core reaches outside the process for:
//!
//! - [`SimEnv`]: seeded randomness and a virtual clock whose sleeps return
//!   immediately and are recorded
//! - [`FakeClientFactory`]: per-token scripted API answers, with call counts
//! - [`MemorySink`] / [`CountingProgress`]: recorders for emitted records
//!   and progress signals
//!
//! Given the same seed, token generation and every oracle decision repeat
//! exactly, so the integration tests under `tests/` assert on exact values.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod fake_api;
mod recorder;
mod sim_env;

pub use fake_api::{ApiCalls, FakeClient, FakeClientFactory, Script, identity};
pub use recorder::{CountingProgress, MemorySink};
pub use sim_env::SimEnv;
