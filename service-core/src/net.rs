//! Best-effort public IP lookup for audit attribution.

use crate::config::IpLookupConfig;
use std::time::Duration;
use tracing::warn;

/// Resolve the caller's public IP address.
///
/// Every failure mode (disabled lookup, timeout, non-success status,
/// unreadable body) degrades to `None`; this never blocks or fails the
/// governed operation.
pub async fn public_ip(client: &reqwest::Client, config: &IpLookupConfig) -> Option<String> {
    if !config.enabled {
        return None;
    }

    let response = client
        .get(&config.url)
        .timeout(Duration::from_millis(config.timeout_ms))
        .send()
        .await;

    let response = match response {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            warn!(status = %r.status(), "IP lookup returned non-success status");
            return None;
        }
        Err(e) => {
            warn!(error = %e, "IP lookup request failed");
            return None;
        }
    };

    match response.text().await {
        Ok(body) => {
            let ip = body.trim().to_string();
            if ip.is_empty() {
                None
            } else {
                Some(ip)
            }
        }
        Err(e) => {
            warn!(error = %e, "Failed to read IP lookup response");
            None
        }
    }
}
