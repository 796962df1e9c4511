//! Core types for imgsrc-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ItemError;
use crate::progress::ProgressSnapshot;

/// One line of user input naming a page that should link an image
///
/// Opaque until processing: the only check applied on construction is that the
/// caller dropped blank lines (see [`crate::utils::parse_source_urls`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceUrl(pub String);

impl SourceUrl {
    /// Create a new SourceUrl
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Borrow the raw string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SourceUrl {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

impl From<String> for SourceUrl {
    fn from(url: String) -> Self {
        Self(url)
    }
}

impl std::fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An image fetched for one source URL
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetrievedImage {
    /// Archive entry name derived from the image URL
    pub name: String,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

/// Result of processing one source URL. Produced exactly once per item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessingOutcome {
    /// The image was retrieved
    Success(RetrievedImage),
    /// Validation, transport or extraction failed
    Failure(ItemError),
}

impl ProcessingOutcome {
    /// Whether this outcome is a success
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingOutcome::Success(_))
    }
}

/// Final counts of a batch run, returned to the caller and attached to events
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Items that produced an image
    pub success: usize,
    /// Items that failed
    pub failure: usize,
    /// Items in the batch
    pub total: usize,
    /// Failed source URLs in completion order
    pub failed_urls: Vec<SourceUrl>,
    /// Filename of the produced archive (None when nothing succeeded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_name: Option<String>,
}

/// Events emitted by the downloader
///
/// Delivered over a broadcast channel, see
/// [`ImageBatchDownloader::subscribe`](crate::ImageBatchDownloader::subscribe).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A batch started
    BatchStarted {
        /// Number of source URLs
        total: usize,
    },

    /// An item left the queue and is now in flight
    ItemDispatched {
        /// Position in the input
        index: usize,
        /// Source URL
        url: SourceUrl,
    },

    /// An item resolved
    ItemCompleted {
        /// Position in the input
        index: usize,
        /// Source URL
        url: SourceUrl,
        /// Whether an image was retrieved
        success: bool,
        /// Archive entry name on success
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Failure reason
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Progress after an item resolved
    Progress {
        /// Current counts and fill fractions
        snapshot: ProgressSnapshot,
        /// Failed source URLs so far, in completion order
        failed_urls: Vec<SourceUrl>,
    },

    /// The archive was produced and saved
    BatchComplete {
        /// Final counts
        summary: BatchSummary,
        /// Where the archive was written
        archive_path: PathBuf,
    },

    /// The batch produced no archive
    BatchFailed {
        /// Final counts
        summary: BatchSummary,
        /// Reason shown to the user
        error: String,
    },
}
