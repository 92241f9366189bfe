use crate::url::Link;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Concurrency-safe set of links keyed by canonical URL
///
/// A crawl session owns three of these: `visited` (links scheduled for
/// crawling), `checked` (links whose liveness has been accounted for) and
/// `crawled` (documents already parsed). Entries are never removed.
#[derive(Debug, Default)]
pub struct DedupSet {
    links: Mutex<HashMap<String, Link>>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the link if its URL is not yet present
    ///
    /// The membership check and the insertion happen under one lock, so of
    /// any number of concurrent callers offering the same URL exactly one
    /// gets `true`. The first stored link wins; a later link with the same
    /// URL but a different kind is rejected.
    ///
    /// # Returns
    ///
    /// * `true` - This call inserted the link and owns acting on it
    /// * `false` - The URL was already present
    pub fn try_add(&self, link: &Link) -> bool {
        let mut links = self.lock();
        if links.contains_key(&link.url) {
            return false;
        }
        links.insert(link.url.clone(), link.clone());
        true
    }

    /// Returns true if the URL has been added
    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains_key(url)
    }

    /// Returns the number of distinct URLs
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of every stored link, sorted by URL
    pub fn links(&self) -> Vec<Link> {
        let mut links: Vec<Link> = self.lock().values().cloned().collect();
        links.sort_by(|a, b| a.url.cmp(&b.url));
        links
    }

    // A poisoned map is still consistent: every mutation is a single insert.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Link>> {
        self.links.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
