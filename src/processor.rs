//! Item processor: turns one source URL into a [`ProcessingOutcome`].
//!
//! Steps: validate the URL, fetch the page, extract the image URL, fetch the
//! image, derive an entry name. Any failure along the way becomes
//! [`ProcessingOutcome::Failure`]; nothing escapes as an error or panic.

use std::sync::Arc;

use url::Url;

use crate::error::ItemError;
use crate::extractor::ImageUrlExtractor;
use crate::transport::Transport;
use crate::types::{ProcessingOutcome, RetrievedImage, SourceUrl};

/// Entry name used when the image URL ends with a `/`
const FALLBACK_ENTRY_NAME: &str = "image";

/// Derive the archive entry name from an image URL
///
/// Everything after the last `/`, or the whole string when there is none.
pub fn derive_filename(image_url: &str) -> String {
    let name = match image_url.rfind('/') {
        Some(pos) => &image_url[pos + 1..],
        None => image_url,
    };
    if name.is_empty() {
        FALLBACK_ENTRY_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Processes single source URLs using a transport and an extractor
#[derive(Clone)]
pub struct ItemProcessor {
    transport: Arc<dyn Transport>,
    extractor: Arc<dyn ImageUrlExtractor>,
}

impl ItemProcessor {
    /// Create a processor from its two capabilities
    pub fn new(transport: Arc<dyn Transport>, extractor: Arc<dyn ImageUrlExtractor>) -> Self {
        Self {
            transport,
            extractor,
        }
    }

    /// Process one source URL. Never fails; failures are folded into the outcome.
    pub async fn process_item(&self, url: &SourceUrl) -> ProcessingOutcome {
        match self.try_process(url).await {
            Ok(image) => {
                tracing::debug!(
                    url = %url,
                    name = %image.name,
                    size = image.bytes.len(),
                    "Image retrieved"
                );
                ProcessingOutcome::Success(image)
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Item failed");
                ProcessingOutcome::Failure(e)
            }
        }
    }

    async fn try_process(&self, url: &SourceUrl) -> Result<RetrievedImage, ItemError> {
        let page_url = Url::parse(url.as_str().trim()).map_err(|e| ItemError::Validation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let page_text = self.transport.fetch_text(page_url.as_str()).await?;
        tracing::trace!(url = %page_url, length = page_text.len(), "Page fetched");

        let image_url = self
            .extractor
            .extract(&page_text)
            .ok_or_else(|| ItemError::Extraction {
                url: page_url.to_string(),
            })?;

        // Relative links resolve against the page they were found on
        let resolved = page_url
            .join(&image_url)
            .map_err(|e| ItemError::InvalidImageLink {
                page: page_url.to_string(),
                link: image_url.clone(),
                reason: e.to_string(),
            })?;

        let bytes = self.transport.fetch_bytes(resolved.as_str()).await?;

        Ok(RetrievedImage {
            name: derive_filename(&image_url),
            bytes,
        })
    }
}
