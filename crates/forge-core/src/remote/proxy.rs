//! Proxy configuration.
//!
//! A proxy URL is validated once, before any probing starts, and then applied
//! to every HTTP client as an all-scheme proxy. An explicit proxy replaces
//! whatever `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` say, so the process
//! environment is never touched.

use reqwest::Url;

use crate::error::ForgeError;

/// A validated proxy URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    url: Url,
}

impl ProxyConfig {
    /// Parses a proxy URL. Blank text means "no proxy".
    pub fn parse(text: &str) -> Result<Option<Self>, ForgeError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let invalid = |reason: String| ForgeError::InvalidProxy { url: text.to_string(), reason };
        let url = Url::parse(text).map_err(|e| invalid(e.to_string()))?;
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }

        let config = Self { url };
        config.to_proxy()?;
        tracing::info!(proxy = %config.url, "using proxy");
        Ok(Some(config))
    }

    /// The proxy URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Builds the client-side proxy for every scheme.
    pub fn to_proxy(&self) -> Result<reqwest::Proxy, ForgeError> {
        reqwest::Proxy::all(self.url.clone()).map_err(|e| ForgeError::InvalidProxy {
            url: self.url.to_string(),
            reason: e.to_string(),
        })
    }
}
