//! Scrape coordinator: one batch of consecutive ids through a bounded worker pool

use crate::database::ProfileStore;
use crate::error::{FetchError, StoreError};
use crate::scraper::transport::Transport;
use crate::scraper::worker::{FetchOutcome, FetchWorker};
use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use std::fmt;
use std::ops::RangeInclusive;

/// Counters for one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    /// Highest stored id before the batch
    pub last_persisted_id: i64,
    pub succeeded: usize,
    pub failed: usize,
    /// Successes that wrote a new row, duplicates excluded
    pub inserted: usize,
}

impl ScrapeReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

impl fmt::Display for ScrapeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scraped: {} | Failed: {} | Total: {} | Inserted: {}",
            self.succeeded,
            self.failed,
            self.total(),
            self.inserted
        )
    }
}

/// Dispatches fetch workers over the next batch of ids and stores the successes
pub struct ScrapeCoordinator<T, S> {
    worker: FetchWorker<T>,
    store: S,
    max_workers: usize,
    max_generations: usize,
}

impl<T: Transport, S: ProfileStore> ScrapeCoordinator<T, S> {
    pub fn new(worker: FetchWorker<T>, store: S, max_workers: usize, max_generations: usize) -> Self {
        Self {
            worker,
            store,
            max_workers: max_workers.max(1),
            max_generations,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ids to scan next, starting right after the highest stored id
    pub async fn next_batch(&self) -> Result<RangeInclusive<i64>, StoreError> {
        let last = self.store.find_highest_id().await?.unwrap_or(0);
        let size = i64::try_from(self.max_generations).unwrap_or(i64::MAX);
        Ok(last + 1..=last.saturating_add(size))
    }

    /// Scrape one batch, processing results in completion order
    pub async fn run(&self) -> Result<ScrapeReport, StoreError> {
        let batch = self.next_batch().await?;
        let mut report = ScrapeReport {
            last_persisted_id: batch.start() - 1,
            ..Default::default()
        };

        info!("Last user id : {}", report.last_persisted_id);
        info!(
            "Starting scraping of ids {}..={} with {} workers",
            batch.start(),
            batch.end(),
            self.max_workers
        );

        let worker = &self.worker;
        let mut results = stream::iter(batch)
            .map(|id| async move { (id, worker.fetch(id).await) })
            .buffer_unordered(self.max_workers);

        while let Some((id, result)) = results.next().await {
            let (worked, summary) = self.settle(id, result, &mut report).await;
            print_status(&report, &summary, worked);
        }

        info!("Batch finished. {}", report);
        Ok(report)
    }

    /// Store a finished fetch and count it, returning whether it worked and its status summary
    async fn settle(
        &self,
        id: i64,
        result: Result<FetchOutcome, FetchError>,
        report: &mut ScrapeReport,
    ) -> (bool, String) {
        let (worked, summary) = match result {
            Ok(outcome) => {
                let summary = outcome.summary();
                match outcome {
                    FetchOutcome::Success { profile, .. } => {
                        match self.store.insert_if_absent(&profile).await {
                            Ok(true) => {
                                report.inserted += 1;
                                (true, summary)
                            }
                            Ok(false) => {
                                debug!("Profile {} already stored", profile.id);
                                (true, summary)
                            }
                            Err(e) => {
                                error!("Failed to store profile {}: {}", profile.id, e);
                                (false, format!("id {}: {}", id, e))
                            }
                        }
                    }
                    _ => (false, format!("id {}: {}", id, summary)),
                }
            }
            Err(e) => (false, format!("id {}: {}", id, e)),
        };

        if worked {
            report.succeeded += 1;
        } else {
            report.failed += 1;
        }
        (worked, summary)
    }
}

fn print_status(report: &ScrapeReport, summary: &str, worked: bool) {
    info!(
        "Scraped: {} | Failed: {} | Total: {}",
        report.succeeded,
        report.failed,
        report.total()
    );
    if worked {
        info!("Worked: {}", summary);
    } else {
        warn!("Failed: {}", summary);
    }
}
