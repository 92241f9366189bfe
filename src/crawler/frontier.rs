//! Crawl frontier and termination detection
//!
//! This module handles:
//! - The job channel that distributes links to the worker pool
//! - The pending-work counter used to detect that the crawl is finished
//! - Closing the channel once no work remains
//!
//! # Ordering
//!
//! A job is counted before it is sent, and the job a worker is processing
//! stays counted until every child it discovered has been counted and sent.
//! The counter therefore reads zero only when no job is queued and no
//! worker holds one, and at that point nothing can enqueue again.

use crate::url::Link;
use async_channel::{Receiver, Sender};
use tokio::sync::watch;

/// Counter of outstanding jobs
///
/// Incremented once per enqueued job and decremented once per finished job.
#[derive(Debug)]
pub struct TaskTracker {
    pending: watch::Sender<usize>,
}

impl TaskTracker {
    pub fn new() -> Self {
        let (pending, _) = watch::channel(0);
        Self { pending }
    }

    /// Counts one more outstanding job
    pub fn add(&self) {
        self.pending.send_modify(|pending| *pending += 1);
    }

    /// Marks one outstanding job as finished
    pub fn done(&self) {
        self.pending.send_modify(|pending| {
            debug_assert!(*pending > 0, "task completed more often than added");
            *pending = pending.saturating_sub(1);
        });
    }

    /// Number of outstanding jobs
    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Waits until the counter is observed at zero
    pub async fn wait_idle(&self) {
        let mut pending = self.pending.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = pending.wait_for(|count| *count == 0).await;
    }
}

impl Default for TaskTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Queue of links waiting to be crawled
///
/// Multi-consumer: every worker receives from the same channel. The channel
/// is unbounded; each URL passes the visited set at most once, so the
/// backlog never exceeds the number of distinct internal links, and a worker
/// never blocks while enqueuing children.
#[derive(Debug)]
pub struct Frontier {
    sender: Sender<Link>,
    receiver: Receiver<Link>,
    tracker: TaskTracker,
}

impl Frontier {
    pub fn new() -> Self {
        let (sender, receiver) = async_channel::unbounded();
        Self {
            sender,
            receiver,
            tracker: TaskTracker::new(),
        }
    }

    /// Counts the job and places it on the queue
    ///
    /// # Returns
    ///
    /// * `true` - The job was queued
    /// * `false` - The frontier was already closed; the job is dropped
    pub fn enqueue(&self, link: Link) -> bool {
        self.tracker.add();

        match self.sender.try_send(link) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Frontier closed, dropping job {}", e.into_inner().url);
                self.tracker.done();
                false
            }
        }
    }

    /// Waits for the next job
    ///
    /// Returns `None` once the frontier is closed and drained.
    pub async fn next_job(&self) -> Option<Link> {
        self.receiver.recv().await.ok()
    }

    /// Starts processing a received job
    ///
    /// The job stays counted as pending until the returned guard is dropped,
    /// so the guard must outlive every `enqueue` of the job's children.
    pub fn begin_job(&self) -> JobGuard<'_> {
        JobGuard {
            tracker: &self.tracker,
        }
    }

    /// Closes the frontier once no job is pending
    ///
    /// This is the only place the channel is closed.
    pub async fn close_when_idle(&self) {
        self.tracker.wait_idle().await;
        self.sender.close();
        tracing::debug!("No pending jobs left, frontier closed");
    }

    /// Number of outstanding jobs (queued or in progress)
    pub fn pending(&self) -> usize {
        self.tracker.pending()
    }

    /// Number of jobs queued but not yet received
    pub fn queued(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks a job finished when dropped
///
/// Dropping also happens on early return and on panic, so every received job
/// is decremented exactly once.
#[must_use = "dropping the guard immediately finishes the job"]
pub struct JobGuard<'a> {
    tracker: &'a TaskTracker,
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        self.tracker.done();
    }
}
