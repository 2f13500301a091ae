use std::sync::Arc;
use std::time::{Duration, Instant};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::analytics::stats::SubmitStats;
use crate::api::submitter::DocumentSubmitter;
use crate::config::Config;
use crate::document::{Document, DocumentPayload};
use crate::error::{AppError, Result};
use crate::http::pool::create_http_client;
use crate::http::rate_limiter::RateLimiter;

const BASE_RETRY_DELAY_MS: u64 = 50;
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Client for the document-creation endpoint.
///
/// Clones share the rate limiter and the stats, so one limit applies to all of them.
#[derive(Debug, Clone)]
pub struct CrptClient {
    client: Client,
    api_url: String,
    auth_token: Option<String>,
    retries: u32,
    limiter: Arc<RateLimiter>,
    stats: Arc<SubmitStats>,
}

impl CrptClient {
    pub fn new(config: &Config) -> Result<Self> {
        let limiter = RateLimiter::new(config.window_unit, config.request_limit)?;
        Self::with_limiter(config, Arc::new(limiter))
    }

    pub fn with_limiter(config: &Config, limiter: Arc<RateLimiter>) -> Result<Self> {
        let client = create_http_client(config)?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            auth_token: config.auth_token.clone(),
            retries: config.submit_retries,
            limiter,
            stats: Arc::new(SubmitStats::new()),
        })
    }

    pub fn stats(&self) -> &SubmitStats {
        &self.stats
    }

    /// Send one document.
    ///
    /// The payload is built before taking quota, so a document that fails
    /// validation never uses up a request.
    pub async fn create_document(&self, document: &Document) -> Result<()> {
        let payload = match DocumentPayload::build(document) {
            Ok(payload) => payload,
            Err(e) => {
                self.stats.inc_rejected();
                return Err(e);
            }
        };

        let waited = self.limiter.acquire().await;
        if !waited.is_zero() {
            self.stats.inc_throttled();
        }

        let start = Instant::now();
        let mut request = self.client.post(&self.api_url).json(&payload);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                self.stats.inc_failed();
                return Err(AppError::Http(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.stats.inc_failed();
            let body = response.text().await.unwrap_or_else(|e| {
                warn!("Failed to read error body for document {}: {}", document.doc_id, e);
                String::new()
            });
            return Err(AppError::Api { status, body });
        }

        let elapsed = start.elapsed().as_millis() as u64;
        self.stats.inc_submitted();
        self.stats.update_submit_latency(elapsed);
        debug!("Document {} accepted in {}ms", document.doc_id, elapsed);

        Ok(())
    }

    /// Like [`CrptClient::create_document`], repeating transport and 5xx failures
    /// up to `retries` more times. Every attempt waits for quota of its own.
    pub async fn create_document_with_retry(&self, document: &Document, retries: u32) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.create_document(document).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    if !e.is_retryable() || attempt >= retries {
                        return Err(e);
                    }
                    attempt += 1;
                    warn!("Submitting document {} failed, retrying ({}/{}): {}", document.doc_id, attempt, retries, e);
                    tokio::time::sleep(retry_delay(attempt)).await;
                }
            }
        }
    }
}

/// Exponential backoff: 50ms, 100ms, 200ms... capped at `MAX_RETRY_DELAY`.
fn retry_delay(attempt: u32) -> Duration {
    let factor = 2u64.checked_pow(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    Duration::from_millis(BASE_RETRY_DELAY_MS.saturating_mul(factor)).min(MAX_RETRY_DELAY)
}

#[async_trait]
impl DocumentSubmitter for CrptClient {
    async fn submit(&self, document: &Document) -> Result<()> {
        self.create_document_with_retry(document, self.retries).await
    }
}
