//! Bounded-concurrency batch scheduler.
//!
//! Source URLs are dispatched in input order. Before each dispatch the scheduler
//! waits for a free slot (at most `concurrency_limit` unsettled tasks in the
//! in-flight set) and then for the pacing interval since the previous dispatch.
//! Items complete in any order.
//!
//! While waiting, completed items are drained from the in-flight set and folded
//! into the [`BatchState`] and [`ArchiveBuilder`] one at a time, each followed by
//! a progress update. An item failure never stops the batch; only a fault of the
//! dispatch machinery itself (a panicked or cancelled item task) does, in which
//! case every unresolved item is marked failed.

mod pacer;


pub use pacer::Pacer;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinError, JoinSet};

use crate::archive::ArchiveBuilder;
use crate::config::BatchConfig;
use crate::processor::ItemProcessor;
use crate::progress::{BatchState, ProgressSink, report_progress};
use crate::types::{ProcessingOutcome, SourceUrl};

/// Everything a finished run produced
#[derive(Debug)]
pub struct BatchRun {
    /// Final counts; complete (`success + failure == total`) on every path
    pub state: BatchState,
    /// Images retrieved, keyed by entry name
    pub archive: ArchiveBuilder,
    /// Set when the dispatch loop itself failed
    pub aborted: Option<String>,
}

/// Drives a list of source URLs through an [`ItemProcessor`]
#[derive(Clone)]
pub struct BatchScheduler {
    processor: Arc<ItemProcessor>,
    concurrency_limit: usize,
    dispatch_interval: Duration,
}

impl BatchScheduler {
    /// Create a scheduler; a zero limit is raised to one
    pub fn new(
        processor: Arc<ItemProcessor>,
        concurrency_limit: usize,
        dispatch_interval: Duration,
    ) -> Self {
        Self {
            processor,
            concurrency_limit: concurrency_limit.max(1),
            dispatch_interval,
        }
    }

    /// Create a scheduler from the batch configuration
    pub fn from_config(processor: Arc<ItemProcessor>, config: &BatchConfig) -> Self {
        Self::new(processor, config.concurrency_limit, config.dispatch_interval)
    }

    /// Maximum items in flight
    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Run one batch to completion
    ///
    /// Every URL resolves exactly once and `sink` sees one progress update per
    /// resolution (an abort folds the remaining items into a single final update).
    pub async fn run_batch(&self, urls: &[SourceUrl], sink: &dyn ProgressSink) -> BatchRun {
        tracing::info!(
            total = urls.len(),
            concurrency_limit = self.concurrency_limit,
            dispatch_interval_ms = self.dispatch_interval.as_millis() as u64,
            "Starting batch"
        );

        let mut dispatcher = Dispatcher::new(urls, sink);
        let aborted = match self.dispatch_all(&mut dispatcher).await {
            Ok(()) => None,
            Err(reason) => {
                tracing::error!(error = %reason, "Batch dispatch failed, abandoning remaining items");
                dispatcher.abort();
                Some(reason)
            }
        };

        let run = dispatcher.finish(aborted);
        tracing::info!(
            success = run.state.success_count,
            failure = run.state.failure_count,
            total = run.state.total,
            "Batch finished"
        );
        run
    }

    async fn dispatch_all(&self, dispatcher: &mut Dispatcher<'_>) -> Result<(), String> {
        let mut pacer = Pacer::new(self.dispatch_interval);
        let urls = dispatcher.urls;

        for (index, url) in urls.iter().enumerate() {
            while dispatcher.in_flight.len() >= self.concurrency_limit {
                match dispatcher.in_flight.join_next().await {
                    Some(joined) => dispatcher.settle(joined)?,
                    None => break,
                }
            }

            dispatcher.wait_for(pacer.ready()).await?;
            pacer.mark_dispatched();

            tracing::debug!(
                index,
                url = %url,
                in_flight = dispatcher.in_flight.len() + 1,
                "Dispatching item"
            );
            dispatcher.sink.on_dispatched(index, url);

            let processor = Arc::clone(&self.processor);
            let url = url.clone();
            dispatcher.in_flight.spawn(async move {
                let outcome = processor.process_item(&url).await;
                (index, outcome)
            });
        }

        while let Some(joined) = dispatcher.in_flight.join_next().await {
            dispatcher.settle(joined)?;
        }
        Ok(())
    }
}

/// Per-run bookkeeping: the in-flight set and the state it feeds
struct Dispatcher<'a> {
    urls: &'a [SourceUrl],
    sink: &'a dyn ProgressSink,
    in_flight: JoinSet<(usize, ProcessingOutcome)>,
    resolved: Vec<bool>,
    state: BatchState,
    archive: ArchiveBuilder,
}

impl<'a> Dispatcher<'a> {
    fn new(urls: &'a [SourceUrl], sink: &'a dyn ProgressSink) -> Self {
        Self {
            urls,
            sink,
            in_flight: JoinSet::new(),
            resolved: vec![false; urls.len()],
            state: BatchState::new(urls.len()),
            archive: ArchiveBuilder::new(),
        }
    }

    /// Await `fut`, settling any items that complete in the meantime
    async fn wait_for<F: Future>(&mut self, fut: F) -> Result<F::Output, String> {
        tokio::pin!(fut);
        loop {
            tokio::select! {
                biased;
                Some(joined) = self.in_flight.join_next() => self.settle(joined)?,
                output = &mut fut => return Ok(output),
            }
        }
    }

    /// Fold one completed item into the state, then report progress
    fn settle(
        &mut self,
        joined: Result<(usize, ProcessingOutcome), JoinError>,
    ) -> Result<(), String> {
        let (index, outcome) = joined.map_err(|e| format!("item task failed: {}", e))?;
        let url = &self.urls[index];

        self.sink.on_completed(index, url, &outcome);
        self.state.record(url, &outcome);
        self.resolved[index] = true;
        if let ProcessingOutcome::Success(image) = outcome {
            self.archive.add(image.name, image.bytes);
        }

        self.sink
            .on_progress(&report_progress(&self.state), &self.state.failed_urls);
        Ok(())
    }

    /// Stop all in-flight work and mark every unresolved item failed
    fn abort(&mut self) {
        self.in_flight.abort_all();
        for (index, url) in self.urls.iter().enumerate() {
            if !self.resolved[index] {
                self.resolved[index] = true;
                self.state.record_failure(url.clone());
            }
        }
        self.sink
            .on_progress(&report_progress(&self.state), &self.state.failed_urls);
    }

    fn finish(self, aborted: Option<String>) -> BatchRun {
        BatchRun {
            state: self.state,
            archive: self.archive,
            aborted,
        }
    }
}
