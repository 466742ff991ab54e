//! Link extraction from HTML pages
//!
//! This module handles parsing page content to collect:
//! - Links to follow (from `<a href>` tags), split into internal and external
//! - Image sources (from `<img src>` tags)

use crate::state::CrawlOutcome;
use crate::url::{LinkKind, LinkResolver};
use scraper::{Html, Selector};

/// Classifies the links and images of a fetched page
///
/// Extraction never fails: malformed markup yields fewer links, not an error.
pub trait LinkExtractor: Send + Sync {
    /// # Arguments
    ///
    /// * `base_url` - The site's base URL
    /// * `page_url` - The URL the content was fetched from
    /// * `content` - The raw page content
    fn extract(&self, base_url: &str, page_url: &str, content: &str) -> CrawlOutcome;
}

/// Extracts links from HTML with CSS selectors
///
/// # Extraction Rules
///
/// **Include:**
/// - `<a href="...">` as internal or external links
/// - `<img src="...">` as images
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` and `data:` values
/// - anchor-only and query-only links, and links back to the page itself
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract(&self, base_url: &str, page_url: &str, content: &str) -> CrawlOutcome {
        let resolver = LinkResolver::new(base_url);
        let document = Html::parse_document(content);
        let mut outcome = CrawlOutcome::empty();

        if let Ok(a_selector) = Selector::parse("a[href]") {
            for element in document.select(&a_selector) {
                if element.value().attr("download").is_some() {
                    continue;
                }

                let Some(href) = element.value().attr("href") else {
                    continue;
                };

                match resolver.resolve_link(page_url, href) {
                    Some((link, LinkKind::Internal)) => {
                        outcome.internal_links.insert(link);
                    }
                    Some((link, LinkKind::External)) => {
                        outcome.external_links.insert(link);
                    }
                    None => {}
                }
            }
        }

        if let Ok(img_selector) = Selector::parse("img[src]") {
            for element in document.select(&img_selector) {
                if let Some(image) = element
                    .value()
                    .attr("src")
                    .and_then(|src| resolver.resolve_image(page_url, src))
                {
                    outcome.images.insert(image);
                }
            }
        }

        outcome
    }
}
