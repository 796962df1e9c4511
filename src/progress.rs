//! Batch state aggregation and progress reporting
//!
//! [`BatchState`] is owned by the scheduler for one run and updated once per
//! resolved item. After every update the scheduler derives a [`ProgressSnapshot`]
//! and hands it to a [`ProgressSink`], the only way the core talks to a UI.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{Event, ProcessingOutcome, SourceUrl};

/// Mutable per-run counters
///
/// Invariant: `success_count + failure_count <= total`, with equality once every
/// item has resolved, and `failed_urls.len() == failure_count`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchState {
    /// Items that produced an image
    pub success_count: usize,
    /// Items that failed
    pub failure_count: usize,
    /// Failed source URLs in completion order
    pub failed_urls: Vec<SourceUrl>,
    /// Items in the batch, fixed at start
    pub total: usize,
}

impl BatchState {
    /// Fresh state for a batch of `total` items
    pub fn new(total: usize) -> Self {
        Self {
            success_count: 0,
            failure_count: 0,
            failed_urls: Vec::new(),
            total,
        }
    }

    /// Items not yet resolved
    pub fn pending(&self) -> usize {
        self.total - self.resolved()
    }

    /// Items resolved either way
    pub fn resolved(&self) -> usize {
        self.success_count + self.failure_count
    }

    /// Whether every item has resolved
    pub fn is_complete(&self) -> bool {
        self.resolved() == self.total
    }

    /// Fold one outcome into the counters
    pub fn record(&mut self, url: &SourceUrl, outcome: &ProcessingOutcome) {
        match outcome {
            ProcessingOutcome::Success(_) => self.record_success(),
            ProcessingOutcome::Failure(_) => self.record_failure(url.clone()),
        }
    }

    /// Count a success
    pub fn record_success(&mut self) {
        debug_assert!(self.resolved() < self.total, "more outcomes than items");
        self.success_count += 1;
    }

    /// Count a failure and remember its URL
    pub fn record_failure(&mut self, url: SourceUrl) {
        debug_assert!(self.resolved() < self.total, "more outcomes than items");
        self.failure_count += 1;
        self.failed_urls.push(url);
    }

    /// Failed URLs joined one per line, as shown in the failed-links box
    pub fn failed_urls_text(&self) -> String {
        self.failed_urls
            .iter()
            .map(SourceUrl::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Point-in-time view of a batch, derived purely from [`BatchState`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// `success_count / total`
    pub success_fraction: f64,
    /// `failure_count / total`
    pub failure_fraction: f64,
    /// `pending / total`
    pub pending_fraction: f64,
    /// Items that produced an image
    pub success_count: usize,
    /// Items that failed
    pub failure_count: usize,
    /// Items in the batch
    pub total: usize,
}

impl ProgressSnapshot {
    /// Human-readable counts line
    pub fn counts_text(&self) -> String {
        format!(
            "success: {} | failure: {} | total: {}",
            self.success_count, self.failure_count, self.total
        )
    }
}

/// Compute the three fill fractions and counts for the current state
///
/// Callers guarantee `total > 0`; an empty batch reports everything pending
/// rather than dividing by zero.
pub fn report_progress(state: &BatchState) -> ProgressSnapshot {
    if state.total == 0 {
        return ProgressSnapshot {
            success_fraction: 0.0,
            failure_fraction: 0.0,
            pending_fraction: 1.0,
            success_count: 0,
            failure_count: 0,
            total: 0,
        };
    }

    let total = state.total as f64;
    ProgressSnapshot {
        success_fraction: state.success_count as f64 / total,
        failure_fraction: state.failure_count as f64 / total,
        pending_fraction: state.pending() as f64 / total,
        success_count: state.success_count,
        failure_count: state.failure_count,
        total: state.total,
    }
}

/// Receiver of progress updates (the UI collaborator)
///
/// Called from the scheduler's completion path, one item at a time.
pub trait ProgressSink: Send + Sync {
    /// Called after every resolved item with the new snapshot and failed URLs so far
    fn on_progress(&self, snapshot: &ProgressSnapshot, failed_urls: &[SourceUrl]);

    /// Called right before an item is handed to the processor
    fn on_dispatched(&self, _index: usize, _url: &SourceUrl) {}

    /// Called when an item resolves, before the progress update for it
    fn on_completed(&self, _index: usize, _url: &SourceUrl, _outcome: &ProcessingOutcome) {}
}

/// Sink that only logs
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn on_progress(&self, snapshot: &ProgressSnapshot, failed_urls: &[SourceUrl]) {
        tracing::info!(
            success = snapshot.success_count,
            failure = snapshot.failure_count,
            total = snapshot.total,
            failed_urls = failed_urls.len(),
            "Batch progress"
        );
    }
}

/// Sink that forwards everything onto the downloader's event channel
#[derive(Clone, Debug)]
pub struct EventProgressSink {
    event_tx: broadcast::Sender<Event>,
}

impl EventProgressSink {
    /// Wrap a broadcast sender
    pub fn new(event_tx: broadcast::Sender<Event>) -> Self {
        Self { event_tx }
    }

    fn emit(&self, event: Event) {
        // send() only fails when nobody is subscribed
        self.event_tx.send(event).ok();
    }
}

impl ProgressSink for EventProgressSink {
    fn on_progress(&self, snapshot: &ProgressSnapshot, failed_urls: &[SourceUrl]) {
        tracing::debug!(counts = %snapshot.counts_text(), "Batch progress");
        self.emit(Event::Progress {
            snapshot: snapshot.clone(),
            failed_urls: failed_urls.to_vec(),
        });
    }

    fn on_dispatched(&self, index: usize, url: &SourceUrl) {
        self.emit(Event::ItemDispatched {
            index,
            url: url.clone(),
        });
    }

    fn on_completed(&self, index: usize, url: &SourceUrl, outcome: &ProcessingOutcome) {
        let (name, error) = match outcome {
            ProcessingOutcome::Success(image) => (Some(image.name.clone()), None),
            ProcessingOutcome::Failure(e) => (None, Some(e.to_string())),
        };
        self.emit(Event::ItemCompleted {
            index,
            url: url.clone(),
            success: outcome.is_success(),
            name,
            error,
        });
    }
}
