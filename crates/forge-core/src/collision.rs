//! In-memory collision oracle.
//!
//! Holds a set of known token texts and flags every probed token whose full
//! text is already in the set. The set lock is held for one insert or one
//! lookup at a time.

use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
    oracle::{Oracle, ProbeResult},
    token::Token,
};

/// Membership oracle over a preloaded set of tokens.
#[derive(Debug, Default)]
pub struct CollisionOracle {
    known: Mutex<HashSet<String>>,
}

impl CollisionOracle {
    /// Creates an empty oracle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates `count` tokens into the known set.
    ///
    /// A generated token that is already known is logged and dropped; it is
    /// not an error. Returns the number of tokens actually inserted.
    pub fn preload(&self, count: u64, mut generate: impl FnMut() -> Token) -> u64 {
        let mut inserted = 0;
        for _ in 0..count {
            let token = generate();
            if self.insert(&token) {
                inserted += 1;
            } else {
                tracing::warn!(
                    "observed token collision while generating test set for token: {}",
                    token.full_text()
                );
            }
        }
        inserted
    }

    /// Adds a token to the known set. Returns false if it was already known.
    pub fn insert(&self, token: &Token) -> bool {
        self.known().insert(token.full_text().to_string())
    }

    /// Whether the token's full text is known.
    pub fn contains(&self, token: &Token) -> bool {
        self.known().contains(token.full_text())
    }

    /// Number of known tokens.
    pub fn len(&self) -> usize {
        self.known().len()
    }

    /// Whether no tokens are known.
    pub fn is_empty(&self) -> bool {
        self.known().is_empty()
    }

    fn known(&self) -> MutexGuard<'_, HashSet<String>> {
        self.known.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Oracle for CollisionOracle {
    type Meta = ();

    async fn probe(&self, token: Option<Token>) -> ProbeResult<()> {
        let Some(token) = token else {
            return ProbeResult::new(None, "no token to test", false, ());
        };

        if self.contains(&token) {
            tracing::info!("!!! collision: {}", token.full_text());
            let message = format!("collision: {}", token.full_text());
            ProbeResult::new(Some(token), message, true, ())
        } else {
            ProbeResult::new(Some(token), "no collision", false, ())
        }
    }
}
