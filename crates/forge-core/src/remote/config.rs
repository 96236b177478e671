//! Remote oracle configuration.

use super::ProxyConfig;

/// User agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("token-forge/", env!("CARGO_PKG_VERSION"));

/// Settings for talking to the vendor API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Enterprise host; empty for the public API.
    pub host: String,
    /// Proxy for every request.
    pub proxy: Option<ProxyConfig>,
    /// Look up the identity of every probed token, consuming quota.
    pub force_check: bool,
    /// User agent header.
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            proxy: None,
            force_check: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
