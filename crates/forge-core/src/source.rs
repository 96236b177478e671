//! Token sources.
//!
//! A [`TokenSource`] hands out tokens one at a time to concurrent probe
//! dispatch. Every variant guards its state with a mutex held for exactly one
//! operation, so each `pop` is an atomically checked decrement. `remaining`
//! is advisory: another caller may pop between a `remaining` and a `pop`.

use std::{
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use thiserror::Error;

use crate::{
    env::Environment,
    error::ForgeError,
    lines,
    token::{Token, TokenGenerator},
};

/// Errors from [`TokenSource::pop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Source has nothing left to hand out.
    #[error("token source has been drained")]
    Drained,
}

/// A supplier of tokens, safe for concurrent draining.
pub trait TokenSource: Send + Sync {
    /// Removes and returns one token.
    ///
    /// `Ok(None)` is a valid result for sources that only count (see
    /// [`NullSource`]). Popping a drained source fails with
    /// [`SourceError::Drained`].
    fn pop(&self) -> Result<Option<Token>, SourceError>;

    /// Number of tokens left.
    fn remaining(&self) -> u64;

    /// Whether the source has been exhausted.
    fn done(&self) -> bool {
        self.remaining() == 0
    }
}

/// Locks a mutex whose critical sections are single operations.
///
/// A panic cannot leave such state half-updated, so poisoning is ignored.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Decrements a counter, failing if it is already zero.
fn take_one(counter: &Mutex<u64>) -> Result<(), SourceError> {
    let mut remaining = lock(counter);
    if *remaining == 0 {
        return Err(SourceError::Drained);
    }
    *remaining -= 1;
    Ok(())
}

/// Supplies freshly generated tokens, up to a limit.
///
/// Only the counter is ever exhausted; the generator is invoked outside the
/// lock once a slot has been claimed.
pub struct GeneratedSource {
    remaining: Mutex<u64>,
    generate: Box<dyn Fn() -> Token + Send + Sync>,
}

impl GeneratedSource {
    /// Creates a source that calls `generate` up to `limit` times.
    pub fn new(limit: u64, generate: impl Fn() -> Token + Send + Sync + 'static) -> Self {
        Self { remaining: Mutex::new(limit), generate: Box::new(generate) }
    }

    /// Creates a source backed by a [`TokenGenerator`].
    pub fn from_generator<E: Environment>(generator: TokenGenerator<E>, limit: u64) -> Self {
        Self::new(limit, move || generator.generate())
    }
}

impl TokenSource for GeneratedSource {
    fn pop(&self) -> Result<Option<Token>, SourceError> {
        take_one(&self.remaining)?;
        Ok(Some((self.generate)()))
    }

    fn remaining(&self) -> u64 {
        *lock(&self.remaining)
    }
}

impl std::fmt::Debug for GeneratedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedSource").field("remaining", &self.remaining()).finish_non_exhaustive()
    }
}

/// Supplies tokens from a pre-loaded collection.
///
/// Tokens are unordered candidates; `pop` takes from the back.
#[derive(Debug, Default)]
pub struct StaticSource {
    tokens: Mutex<Vec<Token>>,
}

impl StaticSource {
    /// Creates a source over the given tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens: Mutex::new(tokens) }
    }

    /// Creates a source holding a single token.
    pub fn single(token: Token) -> Self {
        Self::new(vec![token])
    }

    /// Loads up to `limit` tokens from a file (0 = no limit).
    ///
    /// See [`lines::load_tokens`] for the comment and malformed-line rules.
    pub fn from_file(path: impl AsRef<Path>, limit: u64) -> Result<Self, ForgeError> {
        Ok(Self::new(lines::load_tokens(path, limit)?))
    }
}

impl TokenSource for StaticSource {
    fn pop(&self) -> Result<Option<Token>, SourceError> {
        lock(&self.tokens).pop().map(Some).ok_or(SourceError::Drained)
    }

    fn remaining(&self) -> u64 {
        lock(&self.tokens).len() as u64
    }
}

/// Hands out "no token" a fixed number of times.
///
/// Drives the probe loop without data, e.g. to exercise an unauthenticated
/// client against the quota endpoint.
#[derive(Debug)]
pub struct NullSource {
    remaining: Mutex<u64>,
}

impl NullSource {
    /// Creates a source that yields `None` `limit` times.
    pub fn new(limit: u64) -> Self {
        Self { remaining: Mutex::new(limit) }
    }
}

impl TokenSource for NullSource {
    fn pop(&self) -> Result<Option<Token>, SourceError> {
        take_one(&self.remaining)?;
        Ok(None)
    }

    fn remaining(&self) -> u64 {
        *lock(&self.remaining)
    }
}
