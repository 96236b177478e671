//! Oracles and their per-token results.

use std::{fmt::Debug, future::Future};

use thiserror::Error;

use crate::token::Token;

/// Per-token failures carried inside a [`ProbeResult`].
///
/// These never abort a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// Client for this token could not be built.
    #[error("error instantiating client: {reason}")]
    Client {
        /// Why construction failed.
        reason: String,
    },

    /// Oracle response could not be classified at all.
    #[error("unclassifiable oracle response: {reason}")]
    Unclassified {
        /// What was missing.
        reason: String,
    },
}

/// Outcome of probing one token.
#[derive(Debug, Clone)]
pub struct ProbeResult<M> {
    /// Token that was probed (`None` for count-only sources).
    pub token: Option<Token>,
    /// Human-readable outcome.
    pub message: String,
    /// Fatal per-token error, if any.
    pub error: Option<ProbeError>,
    /// Whether the oracle flagged the token (collision or validity signal).
    pub flagged: bool,
    /// Oracle-specific metadata.
    pub meta: M,
}

impl<M> ProbeResult<M> {
    /// A result with no error.
    pub fn new(token: Option<Token>, message: impl Into<String>, flagged: bool, meta: M) -> Self {
        Self { token, message: message.into(), error: None, flagged, meta }
    }

    /// A non-flagged result carrying a fatal per-token error.
    pub fn failed(token: Option<Token>, error: ProbeError, meta: M) -> Self {
        Self { token, message: error.to_string(), error: Some(error), flagged: false, meta }
    }

    /// Full text of the probed token, or `"<none>"`.
    pub fn token_text(&self) -> &str {
        self.token.as_ref().map_or("<none>", Token::full_text)
    }
}

/// Classifies tokens.
///
/// Probes run concurrently on the runtime's worker threads; implementations
/// must keep any shared-state critical section to a single operation and
/// never hold a lock across I/O.
pub trait Oracle: Send + Sync + 'static {
    /// Oracle-specific metadata attached to each result.
    type Meta: Debug + Send + 'static;

    /// Probes one token (`None` when the source only counts).
    fn probe(&self, token: Option<Token>) -> impl Future<Output = ProbeResult<Self::Meta>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_result_is_not_flagged() {
        let err = ProbeError::Client { reason: "bad header".to_string() };
        let result = ProbeResult::failed(Some(Token::parse("ghp_x")), err.clone(), ());

        assert!(!result.flagged);
        assert_eq!(result.error, Some(err));
        assert_eq!(result.message, "error instantiating client: bad header");
        assert_eq!(result.token_text(), "ghp_x");
    }

    #[test]
    fn token_text_without_token() {
        let result = ProbeResult::new(None, "no token", false, ());
        assert_eq!(result.token_text(), "<none>");
    }
}
