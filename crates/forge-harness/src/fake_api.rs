//! Scripted API client.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forge_core::{
    ProbeError, Token,
    remote::{ApiClient, ApiError, ClientFactory, Identity, RateBucket, RateLimits},
};

/// Builds a minimal identity.
pub fn identity(login: &str, id: u64) -> Identity {
    Identity {
        login: login.to_string(),
        id,
        kind: "User".to_string(),
        name: None,
        email: None,
        extra: serde_json::Map::new(),
    }
}

/// Canned answers for one credential.
#[derive(Debug, Clone)]
pub struct Script {
    /// Answer to the quota query.
    pub rate_limits: Result<RateLimits, ApiError>,
    /// Answer to the identity lookup.
    pub current_user: Result<Identity, ApiError>,
}

impl Script {
    /// Credentials the API accepts, with the given core quota.
    pub fn accepted(limit: u64, remaining: u64, reset: DateTime<Utc>, login: &str) -> Self {
        let core = RateBucket { limit, remaining, used: limit.saturating_sub(remaining), reset };
        Self {
            rate_limits: Ok(RateLimits { core: Some(core), search: None }),
            current_user: Ok(identity(login, 1)),
        }
    }

    /// Credentials the API rejects with 401, reporting `rate` in headers.
    pub fn rejected(rate: Option<RateBucket>) -> Self {
        let denied = ApiError::Status { status: 401, message: "Bad credentials".to_string(), rate };
        Self { rate_limits: Err(denied.clone()), current_user: Err(denied) }
    }

    /// Any other status on the quota query.
    pub fn failing(status: u16, rate: Option<RateBucket>) -> Self {
        let error = ApiError::Status { status, message: "scripted failure".to_string(), rate };
        Self { rate_limits: Err(error.clone()), current_user: Err(error) }
    }

    /// No response at all.
    pub fn unreachable() -> Self {
        let error = ApiError::Transport("connection refused".to_string());
        Self { rate_limits: Err(error.clone()), current_user: Err(error) }
    }

    /// Replaces the identity lookup answer.
    pub fn with_user(mut self, current_user: Result<Identity, ApiError>) -> Self {
        self.current_user = current_user;
        self
    }
}

/// Calls observed across every client of a factory.
#[derive(Debug, Default)]
pub struct ApiCalls {
    clients: AtomicUsize,
    rate_limits: AtomicUsize,
    current_user: AtomicUsize,
}

impl ApiCalls {
    /// Clients built.
    pub fn clients(&self) -> usize {
        self.clients.load(Ordering::SeqCst)
    }

    /// Quota queries made.
    pub fn rate_limits(&self) -> usize {
        self.rate_limits.load(Ordering::SeqCst)
    }

    /// Identity lookups made.
    pub fn current_user(&self) -> usize {
        self.current_user.load(Ordering::SeqCst)
    }
}

/// Client answering from a [`Script`].
#[derive(Debug)]
pub struct FakeClient {
    script: Script,
    calls: Arc<ApiCalls>,
}

#[async_trait]
impl ApiClient for FakeClient {
    async fn rate_limits(&self) -> Result<RateLimits, ApiError> {
        self.calls.rate_limits.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.script.rate_limits.clone()
    }

    async fn current_user(&self) -> Result<Identity, ApiError> {
        self.calls.current_user.fetch_add(1, Ordering::SeqCst);
        self.script.current_user.clone()
    }
}

/// Hands out [`FakeClient`]s scripted per token text.
///
/// Tokens without a script of their own (and unauthenticated clients) get
/// the default script; tokens marked broken fail client construction.
#[derive(Debug)]
pub struct FakeClientFactory {
    default: Script,
    scripts: HashMap<String, Script>,
    broken: HashSet<String>,
    calls: Arc<ApiCalls>,
}

impl FakeClientFactory {
    /// Creates a factory answering `default` for every credential.
    pub fn new(default: Script) -> Self {
        Self {
            default,
            scripts: HashMap::new(),
            broken: HashSet::new(),
            calls: Arc::new(ApiCalls::default()),
        }
    }

    /// Scripts the answers for one token text.
    pub fn with_script(mut self, token: &str, script: Script) -> Self {
        self.scripts.insert(token.to_string(), script);
        self
    }

    /// Makes client construction fail for one token text.
    pub fn with_broken(mut self, token: &str) -> Self {
        self.broken.insert(token.to_string());
        self
    }

    /// Shared call counters.
    pub fn calls(&self) -> Arc<ApiCalls> {
        Arc::clone(&self.calls)
    }
}

impl ClientFactory for FakeClientFactory {
    fn client(&self, token: Option<&Token>) -> Result<Arc<dyn ApiClient>, ProbeError> {
        let text = token.map(Token::full_text);
        if text.is_some_and(|t| self.broken.contains(t)) {
            return Err(ProbeError::Client { reason: "scripted construction failure".to_string() });
        }

        self.calls.clients.fetch_add(1, Ordering::SeqCst);
        let script = text.and_then(|t| self.scripts.get(t)).unwrap_or(&self.default).clone();
        Ok(Arc::new(FakeClient { script, calls: Arc::clone(&self.calls) }))
    }
}
