//! Batch download example
//!
//! Reads a file with one page URL per line, downloads the image each page links
//! through `image_src`, and writes `images_<ok>_<failed>_<total>.zip` into the
//! current directory.
//!
//! ```bash
//! cargo run --example batch_download -- urls.txt
//! ```

use imgsrc_dl::{Config, Error, Event, ImageBatchDownloader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let Some(list_path) = std::env::args().nth(1) else {
        eprintln!("usage: batch_download <url-list-file>");
        std::process::exit(2);
    };
    let input = tokio::fs::read_to_string(&list_path).await?;

    let mut config = Config::default();
    config.batch.concurrency_limit = 5;
    config.archive.output_dir = ".".into();

    let downloader = ImageBatchDownloader::new(config)?;

    // Subscribe to events
    let mut events = downloader.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::BatchStarted { total } => {
                    println!("Downloading {} pages", total);
                }
                Event::ItemCompleted {
                    url,
                    success: false,
                    error,
                    ..
                } => {
                    println!("✗ {}: {}", url, error.unwrap_or_default());
                }
                Event::Progress { snapshot, .. } => {
                    println!(
                        "{} ({:.0}% done)",
                        snapshot.counts_text(),
                        (1.0 - snapshot.pending_fraction) * 100.0
                    );
                }
                Event::BatchComplete { archive_path, .. } => {
                    println!("✓ Saved {}", archive_path.display());
                    break;
                }
                Event::BatchFailed { summary, error } => {
                    println!("✗ {}", error);
                    for url in summary.failed_urls {
                        println!("  {}", url);
                    }
                    break;
                }
                _ => {}
            }
        }
    });

    let result = downloader.download(&input).await;
    // Closing the channel ends the printer even when no terminal event was sent
    drop(downloader);
    printer.await.ok();

    match result {
        Ok(summary) => {
            println!(
                "success: {} | failure: {} | total: {}",
                summary.success, summary.failure, summary.total
            );
            Ok(())
        }
        Err(Error::EmptyInput) => {
            eprintln!("{} contains no URLs", list_path);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
