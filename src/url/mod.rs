//! URL handling module for Site-Tree
//!
//! This module turns raw attribute values found in a page into normalized
//! absolute URLs and classifies them as internal (same site) or external.

mod normalize;

pub use normalize::{is_relative, sanitize_link};

use normalize::{absolutize, has_ignored_scheme, trim_attribute};

/// Where a discovered link points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Same site as the crawl's base URL - will be crawled
    Internal,
    /// Any other site - recorded but never visited
    External,
}

/// Resolves links relative to the site being crawled
///
/// All resolution is string based: a link is internal when its normalized form
/// starts with the base URL, or when it was relative before resolution.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    base_url: String,
}

impl LinkResolver {
    /// Creates a resolver for the site rooted at `base_url`
    ///
    /// A trailing `/` on the base URL is ignored.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The base URL every relative link is resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Normalizes and classifies a link found on `page_url`
    ///
    /// Returns `None` when the link should not be recorded at all:
    /// - `javascript:`, `mailto:`, `tel:` and `data:` links
    /// - links that only carry a query string or anchor
    /// - links that resolve back to `page_url` itself
    ///
    /// # Examples
    ///
    /// ```
    /// use site_tree::url::{LinkKind, LinkResolver};
    ///
    /// let resolver = LinkResolver::new("http://example.com");
    /// let link = resolver.resolve_link("http://example.com/team", "/about?x=1#y");
    /// assert_eq!(link, Some(("http://example.com/about".to_string(), LinkKind::Internal)));
    /// ```
    pub fn resolve_link(&self, page_url: &str, raw: &str) -> Option<(String, LinkKind)> {
        let resolved = self.resolve(page_url, raw)?;

        if resolved.url == page_url {
            return None;
        }

        let kind = if resolved.was_relative || self.is_within_site(&resolved.url) {
            LinkKind::Internal
        } else {
            LinkKind::External
        };

        Some((resolved.url, kind))
    }

    /// Normalizes an image source found on `page_url`
    ///
    /// Images are not classified and may point at the page URL itself.
    pub fn resolve_image(&self, page_url: &str, raw: &str) -> Option<String> {
        self.resolve(page_url, raw).map(|resolved| resolved.url)
    }

    /// Returns true when `url` lives under the base URL
    ///
    /// The match must end on a path boundary, so `http://example.com.evil.org`
    /// is not inside `http://example.com`.
    pub fn is_within_site(&self, url: &str) -> bool {
        match url.strip_prefix(&self.base_url) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    fn resolve(&self, page_url: &str, raw: &str) -> Option<Resolved> {
        let trimmed = trim_attribute(raw);
        if trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.starts_with('?')
            || has_ignored_scheme(trimmed)
        {
            return None;
        }

        let sanitized = sanitize_link(trimmed);
        if is_relative(&sanitized) {
            // Protocol-relative links name their own host
            Some(Resolved {
                url: absolutize(&self.base_url, page_url, &sanitized),
                was_relative: !sanitized.starts_with("//"),
            })
        } else {
            Some(Resolved {
                url: sanitized,
                was_relative: false,
            })
        }
    }
}

struct Resolved {
    url: String,
    was_relative: bool,
}
