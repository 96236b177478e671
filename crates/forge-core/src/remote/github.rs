//! HTTP implementation of the API client.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{
    Response, Url,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;

use super::{
    RemoteConfig,
    api::{ApiClient, ApiError, ClientFactory, Identity, RateBucket, RateLimitResponse, RateLimits},
};
use crate::{error::ForgeError, oracle::ProbeError, token::Token};

/// Media type requested from the API.
const MEDIA_TYPE: &str = "application/vnd.github+json";

/// Public API base.
const PUBLIC_BASE: &str = "https://api.github.com/";

/// Public upload base.
const PUBLIC_UPLOAD: &str = "https://uploads.github.com/";

/// API base and upload endpoints for one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Base URL every API path is joined onto.
    pub base: Url,
    /// Upload URL.
    pub upload: Url,
}

impl Endpoints {
    /// Endpoints for a host; empty selects the public API, anything else an
    /// enterprise install at `https://<host>/api/v3/`.
    pub fn for_host(host: &str) -> Result<Self, ForgeError> {
        let host = host.trim();
        let (base, upload) = if host.is_empty() {
            (PUBLIC_BASE.to_string(), PUBLIC_UPLOAD.to_string())
        } else {
            (format!("https://{host}/api/v3/"), format!("https://{host}/api/uploads/"))
        };

        let parse = |text: &str| {
            Url::parse(text).map_err(|e| ForgeError::InvalidHost {
                host: host.to_string(),
                reason: e.to_string(),
            })
        };
        Ok(Self { base: parse(&base)?, upload: parse(&upload)? })
    }
}

/// Builds the shared HTTP client.
///
/// Connection pools are shared by every per-token client built from it.
pub fn http_client(config: &RemoteConfig) -> Result<reqwest::Client, ForgeError> {
    let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(proxy.to_proxy()?);
    }
    builder.build().map_err(|e| ForgeError::Http(e.to_string()))
}

/// API client bound to one credential (or none).
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    auth: Option<HeaderValue>,
}

impl GithubClient {
    /// Creates a client; `token` is sent as a bearer credential.
    pub fn new(
        http: reqwest::Client,
        endpoints: Endpoints,
        token: Option<&Token>,
    ) -> Result<Self, ProbeError> {
        let auth = token
            .map(|t| {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", t.full_text()))
                    .map_err(|e| ProbeError::Client { reason: e.to_string() })?;
                value.set_sensitive(true);
                Ok(value)
            })
            .transpose()?;
        Ok(Self { http, endpoints, auth })
    }

    /// Whether requests carry credentials.
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self
            .endpoints
            .base
            .join(path)
            .map_err(|e| ApiError::Transport(format!("bad request url: {e}")))?;

        let mut request = self.http.get(url).header(ACCEPT, MEDIA_TYPE);
        if let Some(auth) = &self.auth {
            request = request.header(AUTHORIZATION, auth.clone());
        }

        let response = request.send().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        decode(response).await
    }
}

#[async_trait]
impl ApiClient for GithubClient {
    async fn rate_limits(&self) -> Result<RateLimits, ApiError> {
        let response: RateLimitResponse = self.get("rate_limit").await?;
        Ok(response.resources)
    }

    async fn current_user(&self) -> Result<Identity, ApiError> {
        self.get("user").await
    }
}

/// Builds [`GithubClient`]s sharing one connection pool.
#[derive(Debug, Clone)]
pub struct GithubClientFactory {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl GithubClientFactory {
    /// Resolves the host and builds the shared HTTP client.
    pub fn new(config: &RemoteConfig) -> Result<Self, ForgeError> {
        let endpoints = Endpoints::for_host(&config.host)?;
        let http = http_client(config)?;
        tracing::debug!(base = %endpoints.base, upload = %endpoints.upload, "api endpoints");
        Ok(Self { http, endpoints })
    }

    /// The resolved endpoints.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

impl ClientFactory for GithubClientFactory {
    fn client(&self, token: Option<&Token>) -> Result<Arc<dyn ApiClient>, ProbeError> {
        let client = GithubClient::new(self.http.clone(), self.endpoints.clone(), token)?;
        Ok(Arc::new(client))
    }
}

/// Turns a response into a value or a status error carrying its quota.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let rate = rate_from_headers(response.headers());

    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("unexpected status");
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or_else(|| reason.to_string());
        return Err(ApiError::Status { status: status.as_u16(), message, rate });
    }

    response.json::<T>().await.map_err(|e| ApiError::Status {
        status: status.as_u16(),
        message: format!("undecodable response: {e}"),
        rate,
    })
}

/// Reads the quota headers every response carries.
fn rate_from_headers(headers: &HeaderMap) -> Option<RateBucket> {
    let number = |name: &str| headers.get(name)?.to_str().ok()?.trim().parse::<u64>().ok();

    let limit = number("x-ratelimit-limit")?;
    let remaining = number("x-ratelimit-remaining")?;
    let reset = DateTime::from_timestamp(i64::try_from(number("x-ratelimit-reset")?).ok()?, 0)?;
    let used = number("x-ratelimit-used").unwrap_or_else(|| limit.saturating_sub(remaining));
    Some(RateBucket { limit, remaining, used, reset })
}
