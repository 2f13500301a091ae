use reqwest::Client;
use std::time::Duration;
use crate::config::Config;
use crate::error::Result;

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

pub fn create_http_client(config: &Config) -> Result<Client> {
    let client = Client::builder()
        .tcp_nodelay(true)
        .https_only(config.https_only)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(10)
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .build()?;

    Ok(client)
}
