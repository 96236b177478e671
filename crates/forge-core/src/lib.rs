//! Token Forge core.
//!
//! Crafts, parses and validates tokens in the vendor's `prefix_payload`
//! format, and runs large batches of them against an oracle with a capped
//! number of probes in flight.
//!
//! ## Architecture
//!
//! ```text
//! forge-core
//!   ├─ Environment        (secure bytes, insecure choices, clock, sleep)
//!   ├─ base62 / checksum  (wire encoding of token segments)
//!   ├─ Token              (parse, generate, schema validation)
//!   ├─ TokenSource        (generated, static/file, null)
//!   ├─ ProbeEngine        (windowed dispatch over a TokenSource)
//!   ├─ CollisionOracle    (in-memory membership)
//!   └─ remote             (quota-based credential validity + enrichment)
//! ```
//!
//! The engine never touches the network itself; oracles do. Every per-token
//! failure is folded into that token's [`ProbeResult`], so only setup-time
//! errors ([`ForgeError`]) abort a run.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod base62;
pub mod checksum;
mod collision;
mod engine;
pub mod env;
mod error;
pub mod lines;
mod oracle;
pub mod output;
pub mod prefix;
mod progress;
pub mod remote;
mod source;
mod system_env;
mod token;

pub use base62::{Alphabet, Base62Error};
pub use collision::CollisionOracle;
pub use engine::{DEFAULT_WINDOW, EngineConfig, ProbeEngine, RunReport};
pub use env::Environment;
pub use error::ForgeError;
pub use oracle::{Oracle, ProbeError, ProbeResult};
pub use output::{IdentityRecord, JsonSink, Record, RecordSink};
pub use progress::{LogProgress, NoProgress, Progress};
pub use source::{GeneratedSource, NullSource, SourceError, StaticSource, TokenSource};
pub use system_env::SystemEnv;
pub use token::{
    CHECKSUM_LENGTH, INPUT_LENGTH, PAYLOAD_LENGTH, PREFIX_LENGTH, SEPARATOR, Token, TokenGenerator,
};
