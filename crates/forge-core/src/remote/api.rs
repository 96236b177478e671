//! Vendor API contract.
//!
//! Only two calls are consumed: quota introspection and current-identity
//! lookup. [`ApiClient`] is the seam between the oracle and the transport;
//! the harness scripts it, [`GithubClient`](super::GithubClient) speaks
//! HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{oracle::ProbeError, token::Token};

/// One quota bucket as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBucket {
    /// Requests allowed per window.
    pub limit: u64,
    /// Requests left in the current window.
    pub remaining: u64,
    /// Requests used in the current window.
    #[serde(default)]
    pub used: u64,
    /// When the window resets. Unix seconds on the wire, RFC 3339 in output.
    #[serde(deserialize_with = "chrono::serde::ts_seconds::deserialize")]
    pub reset: DateTime<Utc>,
}

/// Quota buckets returned by the introspection endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RateLimits {
    /// Core API quota.
    pub core: Option<RateBucket>,
    /// Search API quota.
    pub search: Option<RateBucket>,
}

/// Body of the introspection endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct RateLimitResponse {
    pub(crate) resources: RateLimits,
}

/// Identity the credentials resolve to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Account login.
    pub login: String,
    /// Numeric account id.
    pub id: u64,
    /// Account type ("User", "Bot", ...).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Public email.
    #[serde(default)]
    pub email: Option<String>,
    /// Every other field, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Failures of an API call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A response was received with a non-success status (or an unreadable
    /// body).
    #[error("{status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message reported by the API.
        message: String,
        /// Quota reported in the response headers, if any.
        rate: Option<RateBucket>,
    },

    /// No response was received.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// Whether the API rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }

    /// Quota reported alongside the error.
    pub fn rate(&self) -> Option<&RateBucket> {
        match self {
            Self::Status { rate, .. } => rate.as_ref(),
            Self::Transport(_) => None,
        }
    }
}

/// Client for the two consumed API calls, scoped to one credential.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Queries the quota introspection endpoint.
    async fn rate_limits(&self) -> Result<RateLimits, ApiError>;

    /// Looks up the identity the credentials resolve to.
    async fn current_user(&self) -> Result<Identity, ApiError>;
}

/// Builds per-token clients.
pub trait ClientFactory: Send + Sync + 'static {
    /// Builds a client for `token`, or an unauthenticated one for `None`.
    fn client(&self, token: Option<&Token>) -> Result<Arc<dyn ApiClient>, ProbeError>;
}
