//! Custom test assertions for end-to-end tests

use imgsrc_dl::Event;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tokio::sync::broadcast;

/// Collect events until a terminal batch event arrives (or the timeout elapses)
pub async fn collect_until_terminal(
    events: &mut broadcast::Receiver<Event>,
    timeout: Duration,
) -> Vec<Event> {
    let mut collected = Vec::new();
    let _ = tokio::time::timeout(timeout, async {
        while let Ok(event) = events.recv().await {
            let terminal = matches!(
                event,
                Event::BatchComplete { .. } | Event::BatchFailed { .. }
            );
            collected.push(event);
            if terminal {
                break;
            }
        }
    })
    .await;
    collected
}

/// Read every `(name, bytes)` entry of a ZIP file
pub fn zip_entries(archive: &Path) -> Vec<(String, Vec<u8>)> {
    let file = std::fs::File::open(archive).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    let mut entries: Vec<(String, Vec<u8>)> = (0..zip.len())
        .map(|i| {
            let mut entry = zip.by_index(i).unwrap();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            (entry.name().to_string(), content)
        })
        .collect();
    entries.sort();
    entries
}

/// Names of all files in `dir`, sorted
pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
