//! One download invocation: parse input, run the batch, save the archive.

use crate::archive;
use crate::error::{Error, Result};
use crate::progress::EventProgressSink;
use crate::scheduler::{BatchRun, BatchScheduler};
use crate::types::{BatchSummary, Event, SourceUrl};
use crate::utils::parse_source_urls;

use super::ImageBatchDownloader;
use super::lifecycle::RunGuard;

impl ImageBatchDownloader {
    /// Download the image linked by every non-blank line of `input`
    ///
    /// Lines are trimmed; blank lines are skipped. On success the archive has
    /// been saved and the returned summary names it.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyInput`] when `input` has no non-blank line (nothing is fetched)
    /// - [`Error::AlreadyRunning`] when another batch is in progress
    /// - [`Error::NoImagesRetrieved`] when every item failed (nothing is saved)
    /// - [`Error::BatchDispatch`] when the dispatch loop itself failed
    /// - [`Error::Archive`] / [`Error::Io`] when encoding or saving the archive failed
    pub async fn download(&self, input: &str) -> Result<BatchSummary> {
        self.download_urls(parse_source_urls(input)).await
    }

    /// Download the image linked by each source URL, in input order
    pub async fn download_urls(&self, urls: Vec<SourceUrl>) -> Result<BatchSummary> {
        if urls.is_empty() {
            tracing::warn!("Download requested with no source URLs");
            return Err(Error::EmptyInput);
        }

        let _guard = RunGuard::acquire(&self.running)?;
        self.emit_event(Event::BatchStarted { total: urls.len() });

        let scheduler = BatchScheduler::from_config(self.processor.clone(), &self.config.batch);
        let sink = EventProgressSink::new(self.event_tx.clone());
        let run = scheduler.run_batch(&urls, &sink).await;

        match self.complete_batch(run).await {
            Ok((summary, archive_path)) => {
                tracing::info!(
                    success = summary.success,
                    failure = summary.failure,
                    total = summary.total,
                    archive = %archive_path.display(),
                    "Batch complete"
                );
                self.emit_event(Event::BatchComplete {
                    summary: summary.clone(),
                    archive_path,
                });
                Ok(summary)
            }
            Err((summary, e)) => {
                tracing::warn!(
                    success = summary.success,
                    failure = summary.failure,
                    total = summary.total,
                    error = %e,
                    "Batch produced no archive"
                );
                self.emit_event(Event::BatchFailed {
                    summary,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Turn a finished run into a saved archive
    ///
    /// The summary is handed back on both paths so the caller can attach it to
    /// the terminal event.
    async fn complete_batch(
        &self,
        run: BatchRun,
    ) -> std::result::Result<(BatchSummary, std::path::PathBuf), (BatchSummary, Error)> {
        let BatchRun {
            state,
            archive: builder,
            aborted,
        } = run;

        let mut summary = BatchSummary {
            success: state.success_count,
            failure: state.failure_count,
            total: state.total,
            failed_urls: state.failed_urls.clone(),
            archive_name: None,
        };

        if let Some(reason) = aborted {
            return Err((summary, Error::BatchDispatch(reason)));
        }

        let finished = match archive::finalize(builder, &state, &self.config.archive) {
            Ok(Some(finished)) => finished,
            Ok(None) => {
                let e = Error::NoImagesRetrieved {
                    failed: state.failure_count,
                    total: state.total,
                };
                return Err((summary, e));
            }
            Err(e) => return Err((summary, e)),
        };

        match self.saver.save(&finished).await {
            Ok(path) => {
                summary.archive_name = Some(finished.name);
                Ok((summary, path))
            }
            Err(e) => Err((summary, e)),
        }
    }
}
