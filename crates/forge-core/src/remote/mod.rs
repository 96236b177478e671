//! Remote validation against the vendor API.
//!
//! ```text
//! RemoteConfig ──► GithubClientFactory ──► GithubClient (per token)
//!                                               │
//! RemoteValidationOracle::probe ── rate_limits ─┘──► classify ──► ProbeResult
//! RemoteValidationOracle::enrich ── observe quota ──► current_user ──► Record
//! ```

mod api;
mod config;
mod github;
mod ip;
mod oracle;
mod proxy;

pub use api::{ApiClient, ApiError, ClientFactory, Identity, RateBucket, RateLimits};
pub use config::{DEFAULT_USER_AGENT, RemoteConfig};
pub use github::{Endpoints, GithubClient, GithubClientFactory, http_client};
pub use ip::{IP_CHECK_URLS, check_public_ip};
pub use oracle::{RemoteMeta, RemoteValidationOracle, UNAUTHENTICATED_LIMIT, Verdict, classify};
pub use proxy::ProxyConfig;
