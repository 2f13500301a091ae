use async_trait::async_trait;
use crate::document::Document;
use crate::error::Result;

#[async_trait]
pub trait DocumentSubmitter: Send + Sync {
    /// Validate and send one document, waiting for rate-limit quota before the request
    async fn submit(&self, document: &Document) -> Result<()>;
}
