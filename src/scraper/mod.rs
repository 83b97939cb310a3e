//! Scraper module for fetching profiles through rotating proxies
//!
//! This module provides functionality for:
//! - Fetching one profile with retries over randomly drawn proxies
//! - Classifying responses into success, not-found, rate-limited and proxy errors
//! - Running a batch of consecutive ids through a bounded worker pool

pub mod coordinator;
pub mod retry;
pub mod transport;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{ScrapeCoordinator, ScrapeReport};
pub use retry::{Backoff, RetryPolicy};
pub use transport::{RawResponse, ReqwestTransport, Transport};
pub use worker::{FetchOutcome, FetchWorker, DEFAULT_BASE_URL};

use crate::config::{AppConfig, ScrapeSettings};
use crate::database::{ProfileDatabase, ProfileStore};
use crate::proxy::ProxyCatalog;
use crate::Result;
use anyhow::Context;
use log::info;

/// Validate the proxy list, open the database and scrape one batch
pub async fn run_scrape(config: &AppConfig, settings: &ScrapeSettings) -> Result<ScrapeReport> {
    let catalog = ProxyCatalog::new(&settings.proxies_file);
    if catalog.ensure_exists()? {
        info!("Created empty proxy list at {}", catalog.path().display());
    }
    let proxy_count = catalog.validate_file()?;
    info!(
        "Proxy list {} is valid ({} proxies)",
        catalog.path().display(),
        proxy_count
    );

    let db = ProfileDatabase::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    db.ensure_unique_index().await?;

    let transport = ReqwestTransport::new().with_timeout(settings.request_timeout);
    let worker = FetchWorker::new(catalog, transport)
        .with_base_url(settings.base_url.clone())
        .with_policy(settings.retry.clone());

    let coordinator =
        ScrapeCoordinator::new(worker, db, config.max_workers, config.max_generations);
    Ok(coordinator.run().await?)
}
