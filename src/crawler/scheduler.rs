//! Scheduler: the crawl orchestrator
//!
//! This module handles:
//! - The shared task queue workers pull URLs from
//! - The deduplicated result store (normalized URL -> page entry)
//! - Termination detection via a pending-work counter
//! - Building the final site tree from the result store
//!
//! # Termination
//!
//! The pending-work counter holds the number of scheduled URLs without a final
//! outcome. Every submission first schedules the newly discovered URLs (one
//! increment each) and only then decrements for the page it reports, so the
//! counter cannot touch zero while a worker still holds unreported work. When it
//! does reach zero, one `Task::Done` per worker is queued, exactly once.

use crate::crawler::sitemap::{build_site_tree, PageNode};
use crate::state::{CrawlOutcome, PageEntry, Task};
use crate::CrawlError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{mpsc, Mutex};

/// Owns the task queue, the result store and the pending-work counter
///
/// Shared between workers behind an `Arc`. Submissions never block; only
/// [`Scheduler::next_task`] waits.
pub struct Scheduler {
    /// The starting URL, also the root of the site tree
    seed_url: String,

    /// Number of workers that must each receive a `Done`
    worker_count: usize,

    /// Result store keyed by normalized URL; a key exists iff the URL was scheduled
    results: DashMap<String, PageEntry>,

    /// Scheduled URLs still lacking a final outcome
    pending: AtomicUsize,

    /// Set once the `Done` signals have been queued
    finished: AtomicBool,

    /// Producer side of the task queue
    sender: mpsc::UnboundedSender<Task>,

    /// Consumer side of the task queue, shared by all workers
    receiver: Mutex<mpsc::UnboundedReceiver<Task>>,
}

impl Scheduler {
    /// Creates a scheduler seeded with `seed_url`
    ///
    /// The seed is marked pending and queued, so the pending-work counter starts at 1.
    ///
    /// # Arguments
    ///
    /// * `seed_url` - The normalized starting URL
    /// * `worker_count` - Number of workers that will pull from this scheduler
    pub fn new(seed_url: &str, worker_count: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        let scheduler = Self {
            seed_url: seed_url.to_string(),
            worker_count,
            results: DashMap::new(),
            pending: AtomicUsize::new(0),
            finished: AtomicBool::new(false),
            sender,
            receiver: Mutex::new(receiver),
        };
        scheduler.enqueue_seed();
        scheduler
    }

    fn enqueue_seed(&self) {
        self.results
            .insert(self.seed_url.clone(), PageEntry::Pending);
        self.pending.store(1, Ordering::SeqCst);
        // The scheduler owns the receiver, so the queue cannot be closed yet
        let _ = self.sender.send(Task::Crawl(self.seed_url.clone()));
        tracing::debug!("Seeded task queue with {}", self.seed_url);
    }

    /// Waits for the next task
    ///
    /// Returns a URL to crawl, or `Task::Done` once every scheduled URL has a
    /// final outcome. Each worker receives exactly one `Done`.
    pub async fn next_task(&self) -> Task {
        let mut receiver = self.receiver.lock().await;
        // recv only yields None once every sender is dropped, and we hold one
        receiver.recv().await.unwrap_or(Task::Done)
    }

    /// Records the outcome for a crawled page and schedules its new internal links
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::InvariantViolation` if `url` is not currently pending
    /// or the pending-work counter would go negative.
    pub fn submit_result(&self, url: &str, outcome: CrawlOutcome) -> Result<(), CrawlError> {
        let links: Vec<String> = outcome.internal_links.iter().cloned().collect();
        self.record(url, PageEntry::Resolved(outcome))?;

        let mut discovered = 0;
        for link in links {
            if self.schedule(&link)? {
                discovered += 1;
            }
        }

        if discovered > 0 {
            tracing::debug!("{} discovered {} new page(s)", url, discovered);
        }

        self.complete(url)
    }

    /// Records that a page could not be crawled
    ///
    /// The page keeps an empty outcome and counts as completed, so a failed fetch
    /// never stalls termination.
    pub fn submit_failure(&self, url: &str) -> Result<(), CrawlError> {
        self.record(url, PageEntry::Failed)?;
        self.complete(url)
    }

    /// Builds the site tree rooted at the seed URL
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::InvariantViolation` if a page reachable from the seed
    /// is still pending.
    pub fn build_site_tree(&self) -> Result<PageNode, CrawlError> {
        build_site_tree(&self.seed_url, |url| {
            self.results.get(url).map(|entry| entry.value().clone())
        })
    }

    /// Marks `url` pending and queues it, unless it is already known
    ///
    /// Returns true when the URL was newly scheduled. The entry lock is held
    /// across the check and the insert, so concurrent submissions of the same
    /// link schedule it once.
    fn schedule(&self, url: &str) -> Result<bool, CrawlError> {
        match self.results.entry(url.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(vacant) => {
                vacant.insert(PageEntry::Pending);
                // Count before queueing: a fast worker may finish it right away
                self.pending.fetch_add(1, Ordering::SeqCst);
                self.sender
                    .send(Task::Crawl(url.to_string()))
                    .map_err(|_| {
                        CrawlError::InvariantViolation(format!(
                            "task queue closed while scheduling {}",
                            url
                        ))
                    })?;
                tracing::trace!("Queued {}", url);
                Ok(true)
            }
        }
    }

    /// Replaces the pending marker for `url` with its final entry
    fn record(&self, url: &str, entry: PageEntry) -> Result<(), CrawlError> {
        match self.results.get_mut(url) {
            Some(mut current) if current.is_pending() => {
                *current = entry;
                Ok(())
            }
            Some(current) => {
                let message = format!("{} reported again after it was {}", url, current.value());
                tracing::error!("{}", message);
                Err(CrawlError::InvariantViolation(message))
            }
            None => {
                let message = format!("{} reported but never scheduled", url);
                tracing::error!("{}", message);
                Err(CrawlError::InvariantViolation(message))
            }
        }
    }

    /// Decrements the pending-work counter and signals termination at zero
    fn complete(&self, url: &str) -> Result<(), CrawlError> {
        let previous = self
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map_err(|_| {
                let message = format!("pending-work counter underflow completing {}", url);
                tracing::error!("{}", message);
                CrawlError::InvariantViolation(message)
            })?;

        if previous == 1 {
            self.signal_done()?;
        }
        Ok(())
    }

    fn signal_done(&self) -> Result<(), CrawlError> {
        if self
            .finished
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CrawlError::InvariantViolation(
                "pending-work counter reached zero twice".to_string(),
            ));
        }

        tracing::info!(
            "All {} page(s) accounted for, stopping {} worker(s)",
            self.results.len(),
            self.worker_count
        );

        for _ in 0..self.worker_count {
            self.sender.send(Task::Done).map_err(|_| {
                CrawlError::InvariantViolation("task queue closed before shutdown".to_string())
            })?;
        }
        Ok(())
    }

    /// The starting URL
    pub fn seed_url(&self) -> &str {
        &self.seed_url
    }

    /// Number of workers this scheduler signals on termination
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Scheduled URLs still lacking a final outcome
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Returns true once the `Done` signals have been queued
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Number of URLs ever scheduled
    pub fn page_count(&self) -> usize {
        self.results.len()
    }

    /// Number of pages whose fetch failed
    pub fn failed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|entry| entry.value().is_failed())
            .count()
    }

    /// Returns a copy of the result store entry for `url`
    pub fn entry(&self, url: &str) -> Option<PageEntry> {
        self.results.get(url).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    const BASE_URL: &str = "http://www.someurl.com";

    fn internal(links: &[&str]) -> CrawlOutcome {
        CrawlOutcome::empty().with_internal_links(links.iter().copied())
    }

    async fn next_url(scheduler: &Scheduler) -> String {
        match scheduler.next_task().await {
            Task::Crawl(url) => url,
            Task::Done => panic!("expected a URL, got Done"),
        }
    }

    async fn assert_queue_blocks(scheduler: &Scheduler) {
        let result = tokio::time::timeout(Duration::from_millis(50), scheduler.next_task()).await;
        assert!(result.is_err(), "queue should be empty, got {:?}", result);
    }

    #[tokio::test]
    async fn test_seed_is_first_task() {
        let scheduler = Scheduler::new(BASE_URL, 1);

        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(scheduler.entry(BASE_URL), Some(PageEntry::Pending));
        assert_eq!(next_url(&scheduler).await, BASE_URL);
    }

    #[tokio::test]
    async fn test_counter_tracks_discoveries_and_completions() {
        let scheduler = Scheduler::new(BASE_URL, 1);
        let first = next_url(&scheduler).await;

        let a = format!("{}/a", BASE_URL);
        let b = format!("{}/b", BASE_URL);
        scheduler
            .submit_result(&first, internal(&[&a, &b]))
            .unwrap();

        // +2 discovered, -1 completed
        assert_eq!(scheduler.pending_count(), 2);
        assert!(!scheduler.is_finished());

        let next = next_url(&scheduler).await;
        scheduler.submit_result(&next, CrawlOutcome::empty()).unwrap();
        assert_eq!(scheduler.pending_count(), 1);

        let last = next_url(&scheduler).await;
        scheduler.submit_failure(&last).unwrap();
        assert_eq!(scheduler.pending_count(), 0);
        assert!(scheduler.is_finished());
        assert_eq!(scheduler.next_task().await, Task::Done);
    }

    #[tokio::test]
    async fn test_known_links_are_not_rescheduled() {
        let scheduler = Scheduler::new(BASE_URL, 1);
        let first = next_url(&scheduler).await;
        let a = format!("{}/a", BASE_URL);

        scheduler.submit_result(&first, internal(&[&a])).unwrap();
        let a_task = next_url(&scheduler).await;
        assert_eq!(a_task, a);

        // Links back to the seed and to itself are already keys
        scheduler
            .submit_result(&a_task, internal(&[BASE_URL, &a]))
            .unwrap();

        assert_eq!(scheduler.page_count(), 2);
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(scheduler.next_task().await, Task::Done);
    }

    #[tokio::test]
    async fn test_exactly_one_done_per_worker() {
        let scheduler = Scheduler::new(BASE_URL, 3);
        let first = next_url(&scheduler).await;
        scheduler.submit_result(&first, CrawlOutcome::empty()).unwrap();

        for _ in 0..3 {
            assert_eq!(scheduler.next_task().await, Task::Done);
        }
        assert_queue_blocks(&scheduler).await;
    }

    #[tokio::test]
    async fn test_no_done_while_work_remains() {
        let scheduler = Scheduler::new(BASE_URL, 2);
        let first = next_url(&scheduler).await;
        let a = format!("{}/a", BASE_URL);
        scheduler.submit_result(&first, internal(&[&a])).unwrap();

        assert_eq!(next_url(&scheduler).await, a);
        assert!(!scheduler.is_finished());
        assert_queue_blocks(&scheduler).await;
    }

    #[tokio::test]
    async fn test_failure_records_empty_entry() {
        let scheduler = Scheduler::new(BASE_URL, 1);
        let first = next_url(&scheduler).await;
        scheduler.submit_failure(&first).unwrap();

        assert_eq!(scheduler.entry(BASE_URL), Some(PageEntry::Failed));
        assert_eq!(scheduler.failed_count(), 1);
        assert_eq!(scheduler.next_task().await, Task::Done);

        let tree = scheduler.build_site_tree().unwrap();
        assert_eq!(tree, PageNode::new(BASE_URL));
    }

    #[tokio::test]
    async fn test_double_submission_is_invariant_violation() {
        let scheduler = Scheduler::new(BASE_URL, 1);
        let first = next_url(&scheduler).await;
        let a = format!("{}/a", BASE_URL);
        scheduler.submit_result(&first, internal(&[&a])).unwrap();

        let result = scheduler.submit_result(&first, CrawlOutcome::empty());
        assert!(matches!(result, Err(CrawlError::InvariantViolation(_))));
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_url_is_invariant_violation() {
        let scheduler = Scheduler::new(BASE_URL, 1);
        let result = scheduler.submit_failure("http://elsewhere.com");
        assert!(matches!(result, Err(CrawlError::InvariantViolation(_))));
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_tree_with_pending_page_is_invariant_violation() {
        let scheduler = Scheduler::new(BASE_URL, 1);
        let first = next_url(&scheduler).await;
        scheduler
            .submit_result(&first, internal(&["http://www.someurl.com/a"]))
            .unwrap();

        assert!(matches!(
            scheduler.build_site_tree(),
            Err(CrawlError::InvariantViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_circular_references_removed_from_site_map() {
        let scheduler = Scheduler::new(BASE_URL, 1);
        let first_link = format!("{}/first", BASE_URL);
        let second_link = format!("{}/second", BASE_URL);

        let url = next_url(&scheduler).await;
        scheduler.submit_result(&url, internal(&[&first_link])).unwrap();
        let url = next_url(&scheduler).await;
        scheduler.submit_result(&url, internal(&[&second_link])).unwrap();
        let url = next_url(&scheduler).await;
        scheduler.submit_result(&url, internal(&[&first_link])).unwrap();

        assert_eq!(scheduler.next_task().await, Task::Done);

        let expected = PageNode::new(BASE_URL).with_children([PageNode::new(&first_link)
            .with_children([PageNode::new(&second_link)])]);
        assert_eq!(scheduler.build_site_tree().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_schedule_shared_link_once() {
        let scheduler = Arc::new(Scheduler::new(BASE_URL, 1));
        let first = next_url(&scheduler).await;

        let children: Vec<String> = (0..16).map(|i| format!("{}/p{}", BASE_URL, i)).collect();
        let refs: Vec<&str> = children.iter().map(String::as_str).collect();
        scheduler.submit_result(&first, internal(&refs)).unwrap();

        let mut urls = Vec::new();
        for _ in 0..children.len() {
            urls.push(next_url(&scheduler).await);
        }

        let shared = format!("{}/shared", BASE_URL);
        let mut handles = Vec::new();
        for url in urls {
            let scheduler = Arc::clone(&scheduler);
            let shared = shared.clone();
            handles.push(tokio::spawn(async move {
                scheduler.submit_result(&url, internal(&[&shared]))
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(next_url(&scheduler).await, shared);
        scheduler.submit_result(&shared, CrawlOutcome::empty()).unwrap();
        assert_eq!(scheduler.next_task().await, Task::Done);
        assert_queue_blocks(&scheduler).await;
    }
}
