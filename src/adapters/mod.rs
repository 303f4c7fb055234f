pub mod youtrack;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Url;
use scraper::Html;

use crate::client::ClientFactory;
use crate::config::AppConfig;
use crate::model::ticket::TicketRecord;

/// A tracker-specific recognizer. Returns no tickets when the page does not
/// belong to its tracker, and an error only when the tracker itself failed.
#[async_trait(?Send)]
pub trait Adapter: Send + Sync {
    fn name(&self) -> &str;
    async fn scan(&self, url: &Url, document: &Html) -> Result<Vec<TicketRecord>>;
}


pub fn create_adapters(
    config: &AppConfig,
    factory: Arc<dyn ClientFactory>,
) -> Vec<Box<dyn Adapter>> {
    let mut adapters: Vec<Box<dyn Adapter>> = Vec::new();

    if config.youtrack_enabled() {
        adapters.push(Box::new(youtrack::YouTrackAdapter::new(factory)));
    }

    adapters
}

/// Runs every adapter against the same page and concatenates their results
/// in adapter order. The first adapter failure is returned as-is.
pub async fn scan_all(
    adapters: &[Box<dyn Adapter>],
    url: &Url,
    document: &Html,
) -> Result<Vec<TicketRecord>> {
    let scans = adapters.iter().map(|adapter| async move {
        adapter.scan(url, document).await.inspect_err(|e| {
            log::warn!("{} adapter failed on {url}: {e:#}", adapter.name());
        })
    });
    let results = futures::future::try_join_all(scans).await?;
    Ok(results.into_iter().flatten().collect())
}
