use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::{bail, Context};
use futures_util::future::join_all;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crpt_document_client::api::{CrptClient, DocumentSubmitter};
use crpt_document_client::config::Config;
use crpt_document_client::document::Document;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load Config
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging, RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        bail!("usage: crpt-submit <document.json>...");
    }

    info!("Submitting {} document(s) to {}", paths.len(), config.api_url);
    info!("Rate limit: {} request(s) per {:?}", config.request_limit, config.window_unit);

    // One client for all files so they share a single limit
    let client = CrptClient::new(&config)?;
    let submitter: Arc<dyn DocumentSubmitter> = Arc::new(client.clone());

    let tasks = paths.into_iter().map(|path| {
        let submitter = submitter.clone();
        tokio::spawn(async move {
            let result = submit_file(submitter.as_ref(), &path).await;
            (path, result)
        })
    });

    let mut failures = 0;
    for joined in join_all(tasks).await {
        let (path, result) = joined.context("submission task panicked")?;
        match result {
            Ok(doc_id) => info!("{}: document {} submitted", path.display(), doc_id),
            Err(e) => {
                failures += 1;
                error!("{}: {:#}", path.display(), e);
            }
        }
    }

    client.stats().log_stats();

    if failures > 0 {
        bail!("{} document(s) were not submitted", failures);
    }
    Ok(())
}

async fn submit_file(submitter: &dyn DocumentSubmitter, path: &Path) -> anyhow::Result<String> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let document: Document = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    submitter.submit(&document).await?;
    Ok(document.doc_id)
}
