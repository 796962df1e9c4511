//! Error types for imgsrc-dl
//!
//! Errors are split by the level at which they are allowed to surface:
//! - [`TransportError`] and [`ItemError`] describe why a single source URL failed.
//!   They are caught inside the item processor and never abort a batch.
//! - [`Error`] is the batch-level error returned to the caller of a download run.

use thiserror::Error;

/// Result type alias for imgsrc-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for imgsrc-dl
///
/// Only batch-level conditions reach the caller as an `Error`. Individual item
/// failures are reflected in the batch counts instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "concurrency_limit")
        key: Option<String>,
    },

    /// The input contained no non-blank lines
    #[error("no source URLs supplied")]
    EmptyInput,

    /// Every item in the batch failed, so no archive was produced
    #[error("no images retrieved: {failed} of {total} source URLs failed")]
    NoImagesRetrieved {
        /// Number of failed items
        failed: usize,
        /// Number of items in the batch
        total: usize,
    },

    /// The dispatch loop itself failed; all unresolved items were marked failed
    #[error("batch dispatch failed: {0}")]
    BatchDispatch(String),

    /// A batch is already running on this downloader
    #[error("a batch download is already running")]
    AlreadyRunning,

    /// Archive encoding failed
    #[error("archive error: {0}")]
    Archive(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error (client construction)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Archive(e.to_string())
    }
}

/// Why a single fetch attempt (direct or proxied) did not produce a usable response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    /// A response arrived but its status was not 2xx
    #[error("status {0}")]
    Status(u16),

    /// The request never produced a response (connect, DNS, timeout, ...)
    #[error("request failed: {0}")]
    Request(String),
}

/// Fetch failure after both the direct and the proxied attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Both attempts failed
    #[error("fetching {url} failed (direct: {direct}; proxy: {fallback})")]
    Exhausted {
        /// Target URL
        url: String,
        /// Failure of the direct attempt
        direct: AttemptFailure,
        /// Failure of the proxied attempt
        fallback: AttemptFailure,
    },

    /// A response was accepted but its body could not be read
    #[error("reading body of {url} failed: {reason}")]
    Body {
        /// Target URL
        url: String,
        /// Underlying reason
        reason: String,
    },
}

/// Why processing one source URL ended in failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    /// The source URL is not a well-formed absolute URL
    #[error("invalid source URL {url}: {reason}")]
    Validation {
        /// The offending input
        url: String,
        /// Parser message
        reason: String,
    },

    /// Page or image fetch failed on both transports
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The page text has no image_src link
    #[error("no image_src link found in {url}")]
    Extraction {
        /// Page URL that was searched
        url: String,
    },

    /// The image_src link was found but is not a usable URL
    #[error("image_src link {link} in {page} is not a valid URL: {reason}")]
    InvalidImageLink {
        /// Page URL the link was found on
        page: String,
        /// Extracted link text
        link: String,
        /// Parser message
        reason: String,
    },
}
