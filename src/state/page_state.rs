//! Result store entry definitions
//!
//! Every URL the crawl has scheduled owns exactly one entry. It starts out
//! `Pending` and is overwritten once a worker reports on it.

use crate::state::CrawlOutcome;
use std::fmt;

/// Represents what the crawl knows about one scheduled URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEntry {
    /// Queued or being crawled, no outcome yet
    Pending,

    /// Crawled successfully
    Resolved(CrawlOutcome),

    /// Fetch failed; contributes an empty outcome to the site tree
    Failed,
}

impl PageEntry {
    /// Returns true if the page still awaits an outcome
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true if the page could not be fetched
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Returns the outcome as seen by the site tree
    ///
    /// Failed pages yield an empty outcome; pending pages yield `None`.
    pub fn outcome(&self) -> Option<CrawlOutcome> {
        match self {
            Self::Pending => None,
            Self::Resolved(outcome) => Some(outcome.clone()),
            Self::Failed => Some(CrawlOutcome::empty()),
        }
    }
}

impl fmt::Display for PageEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Resolved(_) => "resolved",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}
