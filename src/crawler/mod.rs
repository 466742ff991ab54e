//! Crawler module for concurrent site mapping
//!
//! This module contains the core crawling logic, including:
//! - The scheduler: task queue, result store and termination detection
//! - Workers that fetch pages and report their links
//! - HTTP fetching and HTML link extraction
//! - Site tree construction with cycle removal
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod scheduler;
mod sitemap;
mod worker;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use extractor::{HtmlLinkExtractor, LinkExtractor};
pub use fetcher::{build_http_client, ContentFetcher, HttpFetcher};
pub use scheduler::Scheduler;
pub use sitemap::{build_site_tree, PageNode};
pub use worker::{Worker, WorkerStats};

use crate::config::Config;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate and normalize the seed URL
/// 2. Build the HTTP client
/// 3. Run the worker pool until every discovered page is accounted for
/// 4. Build the site tree
///
/// # Arguments
///
/// * `seed` - The starting URL, as given by the user
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed successfully
/// * `Err(CrawlError)` - Crawl failed
pub async fn crawl(seed: &str, config: &Config) -> Result<CrawlReport, CrawlError> {
    run_crawl(seed, config).await
}
