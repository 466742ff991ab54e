//! Crawl worker
//!
//! A worker repeatedly takes a task from the scheduler, fetches the page,
//! extracts its links and reports the outcome. It stops on `Task::Done`.

use crate::crawler::extractor::LinkExtractor;
use crate::crawler::fetcher::ContentFetcher;
use crate::crawler::scheduler::Scheduler;
use crate::state::Task;
use crate::CrawlError;
use std::sync::Arc;

/// Pages handled by one worker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Pages fetched and reported with their links
    pub pages_crawled: usize,

    /// Pages whose fetch failed
    pub pages_failed: usize,
}

/// One member of the worker pool
pub struct Worker {
    id: usize,
    scheduler: Arc<Scheduler>,
    fetcher: Arc<dyn ContentFetcher>,
    extractor: Arc<dyn LinkExtractor>,
}

impl Worker {
    pub fn new(
        id: usize,
        scheduler: Arc<Scheduler>,
        fetcher: Arc<dyn ContentFetcher>,
        extractor: Arc<dyn LinkExtractor>,
    ) -> Self {
        Self {
            id,
            scheduler,
            fetcher,
            extractor,
        }
    }

    /// Processes tasks until the scheduler signals `Done`
    ///
    /// Fetch failures are logged and reported as failed pages. Only scheduler
    /// invariant violations end the loop early.
    pub async fn run(self) -> Result<WorkerStats, CrawlError> {
        let mut stats = WorkerStats::default();
        tracing::debug!("Worker {} started", self.id);

        loop {
            match self.scheduler.next_task().await {
                Task::Crawl(url) => {
                    if self.crawl_page(&url).await? {
                        stats.pages_crawled += 1;
                    } else {
                        stats.pages_failed += 1;
                    }
                }
                Task::Done => break,
            }
        }

        tracing::debug!(
            "Worker {} finished: {} crawled, {} failed",
            self.id,
            stats.pages_crawled,
            stats.pages_failed
        );
        Ok(stats)
    }

    /// Crawls one page and reports it; returns false if the fetch failed
    async fn crawl_page(&self, url: &str) -> Result<bool, CrawlError> {
        match self.fetcher.fetch(url).await {
            Ok(content) => {
                let outcome = self
                    .extractor
                    .extract(self.scheduler.seed_url(), url, &content);
                tracing::info!(
                    "Crawled {} ({} internal, {} external, {} images)",
                    url,
                    outcome.internal_links.len(),
                    outcome.external_links.len(),
                    outcome.images.len()
                );
                self.scheduler.submit_result(url, outcome)?;
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Failed to crawl {}: {}", url, e);
                self.scheduler.submit_failure(url)?;
                Ok(false)
            }
        }
    }
}
