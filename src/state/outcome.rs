//! Crawl outcome for a single page

use std::collections::BTreeSet;

/// Classified links and images found on one crawled page
///
/// All three sets hold normalized absolute URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Links to pages on the same site
    pub internal_links: BTreeSet<String>,

    /// Links to other sites
    pub external_links: BTreeSet<String>,

    /// Image sources
    pub images: BTreeSet<String>,
}

impl CrawlOutcome {
    /// The outcome of a page that was crawled but had no links or images
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if no links or images were recorded
    pub fn is_empty(&self) -> bool {
        self.internal_links.is_empty() && self.external_links.is_empty() && self.images.is_empty()
    }

    /// Adds internal links
    pub fn with_internal_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.internal_links.extend(links.into_iter().map(Into::into));
        self
    }

    /// Adds external links
    pub fn with_external_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.external_links.extend(links.into_iter().map(Into::into));
        self
    }

    /// Adds image sources
    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images.extend(images.into_iter().map(Into::into));
        self
    }
}
