//! Shared test helpers: an in-memory transport and a recording progress sink.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{AttemptFailure, TransportError};
use crate::progress::{ProgressSink, ProgressSnapshot};
use crate::transport::Transport;
use crate::types::{ProcessingOutcome, SourceUrl};

/// Page body linking `image_url` the way real pages do
pub(crate) fn image_page(image_url: &str) -> String {
    format!(
        "<html><head>\n<link rel=\"image_src\" href=\"{}\">\n</head><body></body></html>",
        image_url
    )
}

#[derive(Default)]
struct FakeState {
    pages: HashMap<String, String>,
    images: HashMap<String, Vec<u8>>,
    panics: Vec<String>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

/// In-memory [`Transport`]: unknown URLs fail on both attempts with 404.
#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    state: Arc<FakeState>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn state_mut(&mut self) -> &mut FakeState {
        Arc::get_mut(&mut self.state).unwrap()
    }

    pub(crate) fn page(mut self, url: &str, body: &str) -> Self {
        self.state_mut()
            .pages
            .insert(url.to_string(), body.to_string());
        self
    }

    pub(crate) fn image(mut self, url: &str, bytes: &[u8]) -> Self {
        self.state_mut()
            .images
            .insert(url.to_string(), bytes.to_vec());
        self
    }

    /// Fetching this URL panics inside the item task
    pub(crate) fn panicking(mut self, url: &str) -> Self {
        self.state_mut().panics.push(url.to_string());
        self
    }

    /// Latency applied to every fetch without an explicit delay
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.state_mut().default_delay = delay;
        self
    }

    /// Latency for one URL
    pub(crate) fn delay_for(mut self, url: &str, delay: Duration) -> Self {
        self.state_mut().delays.insert(url.to_string(), delay);
        self
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Highest number of simultaneous fetches observed
    pub(crate) fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }

    async fn fetch<T: Clone>(
        &self,
        url: &str,
        table: &HashMap<String, T>,
    ) -> Result<T, TransportError> {
        self.state.requests.lock().unwrap().push(url.to_string());
        let now = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .state
            .delays
            .get(url)
            .copied()
            .unwrap_or(self.state.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.state.panics.iter().any(|p| p == url) {
            panic!("fake transport asked to fail hard for {url}");
        }

        table
            .get(url)
            .cloned()
            .ok_or_else(|| TransportError::Exhausted {
                url: url.to_string(),
                direct: AttemptFailure::Status(404),
                fallback: AttemptFailure::Status(404),
            })
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn fetch_text(&self, url: &str) -> Result<String, TransportError> {
        self.fetch(url, &self.state.pages).await
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        self.fetch(url, &self.state.images).await
    }
}

/// Progress sink that remembers everything it was told
#[derive(Default)]
pub(crate) struct RecordingSink {
    pub(crate) snapshots: Mutex<Vec<ProgressSnapshot>>,
    pub(crate) failed_lists: Mutex<Vec<Vec<SourceUrl>>>,
    pub(crate) dispatches: Mutex<Vec<(usize, Instant)>>,
    pub(crate) completions: Mutex<Vec<(usize, bool, Instant)>>,
}

impl RecordingSink {
    pub(crate) fn snapshots(&self) -> Vec<ProgressSnapshot> {
        self.snapshots.lock().unwrap().clone()
    }

    pub(crate) fn dispatches(&self) -> Vec<(usize, Instant)> {
        self.dispatches.lock().unwrap().clone()
    }

    pub(crate) fn completions(&self) -> Vec<(usize, bool, Instant)> {
        self.completions.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn on_progress(&self, snapshot: &ProgressSnapshot, failed_urls: &[SourceUrl]) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
        self.failed_lists.lock().unwrap().push(failed_urls.to_vec());
    }

    fn on_dispatched(&self, index: usize, _url: &SourceUrl) {
        self.dispatches.lock().unwrap().push((index, Instant::now()));
    }

    fn on_completed(&self, index: usize, _url: &SourceUrl, outcome: &ProcessingOutcome) {
        self.completions
            .lock()
            .unwrap()
            .push((index, outcome.is_success(), Instant::now()));
    }
}
