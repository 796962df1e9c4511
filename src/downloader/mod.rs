//! Batch downloader entry point.
//!
//! The `ImageBatchDownloader` struct and its methods are organized by domain:
//! - [`batch`] - One download invocation: input parsing, scheduling, archive finalization
//! - [`lifecycle`] - Run flag that keeps a second batch from starting concurrently

mod batch;
mod lifecycle;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::archive::{ArchiveSaver, DirectorySaver};
use crate::config::Config;
use crate::error::Result;
use crate::extractor::{ImageSrcExtractor, ImageUrlExtractor};
use crate::processor::ItemProcessor;
use crate::transport::{HttpTransport, Transport};
use crate::types::Event;

/// Buffer size of the event channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct ImageBatchDownloader {
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Page/image processor shared by every item task
    pub(crate) processor: Arc<ItemProcessor>,
    /// Receiver of finished archives
    pub(crate) saver: Arc<dyn ArchiveSaver>,
    /// Set while a batch is running
    pub(crate) running: Arc<AtomicBool>,
}

impl ImageBatchDownloader {
    /// Create a downloader with the HTTP transport, the image_src extractor and
    /// a saver writing into `config.archive.output_dir`
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(HttpTransport::new(&config.transport)?);
        let saver = Arc::new(DirectorySaver::new(config.archive.output_dir.clone()));

        tracing::debug!(
            proxy_base = %config.transport.proxy_base,
            output_dir = %config.archive.output_dir.display(),
            "Downloader initialized"
        );

        Self::with_components(
            config,
            transport,
            Arc::new(ImageSrcExtractor::default()),
            saver,
        )
    }

    /// Create a downloader from explicit collaborators
    pub fn with_components(
        config: Config,
        transport: Arc<dyn Transport>,
        extractor: Arc<dyn ImageUrlExtractor>,
        saver: Arc<dyn ArchiveSaver>,
    ) -> Result<Self> {
        config.validate()?;
        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            event_tx,
            config: Arc::new(config),
            processor: Arc::new(ItemProcessor::new(transport, extractor)),
            saver,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Subscribe to download events
    ///
    /// Each subscriber receives all events independently. A subscriber that falls
    /// behind by more than the channel capacity receives `RecvError::Lagged`.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Whether a batch is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Emit an event to all subscribers; dropped when nobody listens
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
