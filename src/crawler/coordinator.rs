//! Crawler coordinator - runs a crawl from seed to site tree
//!
//! This module wires the pieces of a crawl together:
//! - Creating the scheduler seeded with the starting URL
//! - Spawning the worker pool and joining every worker
//! - Aborting the remaining workers if one of them fails
//! - Building the site tree once all work is accounted for

use crate::config::{validate_seed_url, validate_worker_count, Config};
use crate::crawler::extractor::{HtmlLinkExtractor, LinkExtractor};
use crate::crawler::fetcher::{ContentFetcher, HttpFetcher};
use crate::crawler::scheduler::Scheduler;
use crate::crawler::sitemap::PageNode;
use crate::crawler::worker::{Worker, WorkerStats};
use crate::CrawlError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Result of a completed crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// The site tree rooted at the seed URL
    pub root: PageNode,

    /// Pages fetched and reported with their links
    pub pages_crawled: usize,

    /// Pages whose fetch failed
    pub pages_failed: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Wall-clock time the crawl took
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Total number of distinct pages scheduled
    pub fn pages_total(&self) -> usize {
        self.pages_crawled + self.pages_failed
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    scheduler: Arc<Scheduler>,
    fetcher: Arc<dyn ContentFetcher>,
    extractor: Arc<dyn LinkExtractor>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `seed_url` - The normalized starting URL (see `validate_seed_url`)
    /// * `workers` - Number of concurrent workers
    /// * `fetcher` - Reads page content
    /// * `extractor` - Classifies the links of fetched content
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - The worker count is out of range
    pub fn new(
        seed_url: &str,
        workers: usize,
        fetcher: Arc<dyn ContentFetcher>,
        extractor: Arc<dyn LinkExtractor>,
    ) -> Result<Self, CrawlError> {
        validate_worker_count(workers)?;

        Ok(Self {
            scheduler: Arc::new(Scheduler::new(seed_url, workers)),
            fetcher,
            extractor,
        })
    }

    /// Creates a coordinator that crawls over HTTP with the configured client
    ///
    /// The seed is validated and normalized first.
    pub fn from_config(seed: &str, config: &Config) -> Result<Self, CrawlError> {
        let seed_url = validate_seed_url(seed)?;
        let fetcher = HttpFetcher::from_config(config)?;

        Self::new(
            &seed_url,
            config.crawler.workers,
            Arc::new(fetcher),
            Arc::new(HtmlLinkExtractor),
        )
    }

    /// The scheduler shared by this coordinator's workers
    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    /// Runs the crawl to completion
    ///
    /// Spawns one task per worker, waits for all of them and builds the site
    /// tree. If any worker fails, the others are aborted and the first error
    /// is returned.
    pub async fn run(self) -> Result<CrawlReport, CrawlError> {
        let started_at = Utc::now();
        let worker_count = self.scheduler.worker_count();
        tracing::info!(
            "Starting crawl of {} with {} worker(s)",
            self.scheduler.seed_url(),
            worker_count
        );

        let mut workers = JoinSet::new();
        for id in 0..worker_count {
            let worker = Worker::new(
                id,
                Arc::clone(&self.scheduler),
                Arc::clone(&self.fetcher),
                Arc::clone(&self.extractor),
            );
            workers.spawn(worker.run());
        }

        let mut totals = WorkerStats::default();
        while let Some(joined) = workers.join_next().await {
            match joined.map_err(CrawlError::from).and_then(|result| result) {
                Ok(stats) => {
                    totals.pages_crawled += stats.pages_crawled;
                    totals.pages_failed += stats.pages_failed;
                }
                Err(e) => {
                    tracing::error!("Crawl aborted: {}", e);
                    workers.abort_all();
                    return Err(e);
                }
            }
        }

        let root = self.scheduler.build_site_tree()?;
        let finished_at = Utc::now();

        let report = CrawlReport {
            root,
            pages_crawled: totals.pages_crawled,
            pages_failed: totals.pages_failed,
            started_at,
            finished_at,
        };

        tracing::info!(
            "Crawl completed: {} pages crawled, {} failed in {}ms",
            report.pages_crawled,
            report.pages_failed,
            report.duration().num_milliseconds()
        );

        Ok(report)
    }
}

/// Runs a crawl of `seed` over HTTP using `config`
///
/// # Example
///
/// ```no_run
/// use site_tree::config::Config;
/// use site_tree::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl("https://example.com", &Config::default()).await?;
/// println!("{} pages", report.pages_total());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(seed: &str, config: &Config) -> Result<CrawlReport, CrawlError> {
    Coordinator::from_config(seed, config)?.run().await
}
