//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlOutcome`: Links and images found on one page
//! - `PageEntry`: Result store entry for a scheduled URL (pending, resolved or failed)
//! - `Task`: Item on the work queue (a URL, or the terminal `Done` signal)

mod outcome;
mod page_state;
mod task;

// Re-export main types
pub use outcome::CrawlOutcome;
pub use page_state::PageEntry;
pub use task::Task;
