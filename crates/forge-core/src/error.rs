//! Setup-time error types.
//!
//! Everything here aborts a run before any probing starts. Per-token failures
//! never surface as `ForgeError`; they travel inside
//! [`ProbeResult`](crate::ProbeResult).

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a requested operation.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// Caller asked for a prefix outside the known set.
    #[error("prefix '{prefix}' is not a valid token prefix")]
    InvalidPrefix {
        /// The rejected prefix.
        prefix: String,
    },

    /// Token text could not be used at all.
    #[error("token '{text}' is malformed")]
    MalformedToken {
        /// The rejected text, as given.
        text: String,
    },

    /// Proxy URL did not parse or was rejected by the HTTP client.
    #[error("invalid proxy url '{url}': {reason}")]
    InvalidProxy {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Enterprise host did not form a valid API URL.
    #[error("invalid api host '{host}': {reason}")]
    InvalidHost {
        /// The rejected host.
        host: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Probe window must allow at least one probe in flight.
    #[error("must specify a batch size of 1 or greater")]
    InvalidWindow,

    /// Reading a token file failed.
    #[error("failed to read tokens from '{}': {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Shared HTTP client could not be built.
    #[error("http client error: {0}")]
    Http(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ForgeError::InvalidPrefix { prefix: "abc".to_string() };
        assert_eq!(err.to_string(), "prefix 'abc' is not a valid token prefix");

        let err = ForgeError::Io {
            path: PathBuf::from("tokens.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "failed to read tokens from 'tokens.txt': missing");
    }
}
