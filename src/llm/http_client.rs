use reqwest::Client;
use std::time::Duration;

/// Shared client settings for model endpoints. `timeout_secs` bounds a whole
/// request; the rewrite invoker applies its own deadline on top.
pub fn build_provider_client_with_timeout(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|_| Client::new())
}
