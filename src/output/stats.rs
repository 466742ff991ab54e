//! Statistics about a site tree
//!
//! This module provides functionality for summarizing a finished site tree
//! and displaying the summary alongside the crawl report.

use crate::crawler::{CrawlReport, PageNode};
use std::collections::HashSet;

/// Site tree statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStatistics {
    /// Nodes in the tree, counting duplicated pages once per occurrence
    pub nodes: usize,

    /// Distinct page URLs in the tree
    pub distinct_pages: usize,

    /// Distinct external links across all pages
    pub external_links: usize,

    /// Distinct image sources across all pages
    pub images: usize,

    /// Depth of the deepest page; the root is at depth 0
    pub max_depth: usize,
}

impl TreeStatistics {
    /// Walks the tree rooted at `root` and collects its statistics
    pub fn from_tree(root: &PageNode) -> Self {
        let mut pages = HashSet::new();
        let mut external_links = HashSet::new();
        let mut images = HashSet::new();
        let mut nodes = 0;
        let mut max_depth = 0;

        let mut stack = vec![(root, 0)];
        while let Some((page, depth)) = stack.pop() {
            nodes += 1;
            max_depth = max_depth.max(depth);
            pages.insert(page.name.as_str());
            external_links.extend(page.external_links.iter().map(String::as_str));
            images.extend(page.images.iter().map(String::as_str));
            stack.extend(page.children.iter().map(|child| (child, depth + 1)));
        }

        Self {
            nodes,
            distinct_pages: pages.len(),
            external_links: external_links.len(),
            images: images.len(),
            max_depth,
        }
    }
}

/// Prints crawl and tree statistics to stdout
///
/// # Arguments
///
/// * `report` - The finished crawl
pub fn print_statistics(report: &CrawlReport) {
    let stats = TreeStatistics::from_tree(&report.root);

    println!("=== Crawl Statistics ===\n");

    println!("Crawl:");
    println!("  Site: {}", report.root.name);
    println!("  Started: {}", report.started_at.to_rfc3339());
    println!("  Finished: {}", report.finished_at.to_rfc3339());
    println!(
        "  Duration: {:.2}s",
        report.duration().num_milliseconds() as f64 / 1000.0
    );
    println!("  Pages crawled: {}", report.pages_crawled);
    println!("  Pages failed: {}", report.pages_failed);
    println!();

    println!("Site Tree:");
    println!("  Nodes: {}", stats.nodes);
    println!("  Distinct pages: {}", stats.distinct_pages);
    println!("  External links: {}", stats.external_links);
    println!("  Images: {}", stats.images);
    println!("  Max depth: {}", stats.max_depth);
    println!();

    let success_rate = if report.pages_total() > 0 {
        (report.pages_crawled as f64 / report.pages_total() as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully crawled)",
        success_rate,
        report.pages_crawled,
        report.pages_total()
    );
}
