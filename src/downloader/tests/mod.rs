use super::*;
use crate::error::Error;
use crate::test_helpers::{FakeTransport, image_page};
use crate::types::SourceUrl;
use super::test_helpers::{MemorySaver, create_test_downloader, create_test_downloader_with_saver};


/// Drain every event currently buffered on the receiver
fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Transport serving a single page that links `image_url`
fn single_image(page_url: &str, image_url: &str, bytes: &[u8]) -> FakeTransport {
    FakeTransport::new()
        .page(page_url, &image_page(image_url))
        .image(image_url, bytes)
}
