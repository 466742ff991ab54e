/// Work items handed to crawl workers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// A URL awaiting crawl
    Crawl(String),

    /// No more work will ever arrive; the receiving worker should stop
    Done,
}

