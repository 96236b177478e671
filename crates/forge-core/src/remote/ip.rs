//! Public address check.
//!
//! Asks a handful of echo services which address our requests come from,
//! which shows whether a configured proxy is actually in the path.

use std::collections::BTreeMap;

use tokio::task::JoinSet;

/// Services that answer with the caller's address as plain text.
pub const IP_CHECK_URLS: [&str; 3] =
    ["https://ipinfo.tw/ip", "https://icanhazip.com", "https://check.torproject.org/api/ip"];

/// Queries every service concurrently.
///
/// Returns the answer of each service that responded, keyed by URL. Failures
/// are logged and left out.
pub async fn check_public_ip(http: &reqwest::Client, urls: &[&str]) -> BTreeMap<String, String> {
    tracing::info!("checking public ip...");
    let mut checks = JoinSet::new();
    for url in urls {
        let http = http.clone();
        let url = (*url).to_string();
        checks.spawn(async move {
            let answer = fetch(&http, &url).await;
            (url, answer)
        });
    }

    let mut answers = BTreeMap::new();
    while let Some(joined) = checks.join_next().await {
        match joined {
            Ok((url, Ok(address))) => {
                tracing::info!("--- '{}' reports ip as: {}", url, address);
                answers.insert(url, address);
            },
            Ok((url, Err(e))) => tracing::warn!("error checking public ip via '{}': {}; continuing...", url, e),
            Err(e) => tracing::error!("ip check task failed: {}", e),
        }
    }
    answers
}

async fn fetch(http: &reqwest::Client, url: &str) -> Result<String, reqwest::Error> {
    let body = http.get(url).send().await?.error_for_status()?.text().await?;
    Ok(body.trim().to_string())
}
