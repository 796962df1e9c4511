//! # imgsrc-dl
//!
//! Batch image downloader: give it a list of page URLs, get back one ZIP
//! archive holding the image each page advertises through its `image_src` link.
//!
//! ## Design Philosophy
//!
//! imgsrc-dl is designed to be:
//! - **Failure tolerant** - A bad page or image fails only its own item, never the batch
//! - **Polite** - Bounded concurrency plus a minimum interval between dispatches
//! - **Library-first** - The UI is a [`ProgressSink`] or an event subscriber
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use imgsrc_dl::{Config, Event, ImageBatchDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.archive.output_dir = "downloads".into();
//!
//!     let downloader = ImageBatchDownloader::new(config)?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             if let Event::Progress { snapshot, .. } = event {
//!                 println!("{}", snapshot.counts_text());
//!             }
//!         }
//!     });
//!
//!     let summary = downloader
//!         .download("https://example.com/photo/1\nhttps://example.com/photo/2")
//!         .await?;
//!     println!("saved {:?}", summary.archive_name);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Archive assembly and saving
pub mod archive;
/// Configuration types
pub mod config;
/// Top-level batch downloader
pub mod downloader;
/// Error types
pub mod error;
/// Image URL extraction from page text
pub mod extractor;
/// Single-item pipeline: page, image link, image bytes
pub mod processor;
/// Batch state and progress reporting
pub mod progress;
/// Bounded-concurrency batch scheduler
pub mod scheduler;
/// HTTP fetching with proxy fallback
pub mod transport;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use archive::{ArchiveSaver, DirectorySaver, FinishedArchive};
pub use config::{ArchiveCompression, ArchiveConfig, BatchConfig, Config, TransportConfig};
pub use downloader::ImageBatchDownloader;
pub use error::{AttemptFailure, Error, ItemError, Result, TransportError};
pub use extractor::{ImageSrcExtractor, ImageUrlExtractor};
pub use progress::{
    BatchState, EventProgressSink, ProgressSink, ProgressSnapshot, TracingProgressSink,
    report_progress,
};
pub use transport::{HttpTransport, Transport};
pub use types::{BatchSummary, Event, ProcessingOutcome, RetrievedImage, SourceUrl};
