//! Archive assembly and saving
//!
//! [`ArchiveBuilder`] collects `(name, bytes)` entries as items resolve. Names
//! are keys: adding an entry under an existing name replaces it (last write
//! wins). [`finalize`] turns the builder into one ZIP blob unless nothing
//! succeeded, and an [`ArchiveSaver`] hands the blob to the outside world.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use crate::config::{ArchiveCompression, ArchiveConfig};
use crate::error::Result;
use crate::progress::BatchState;

/// Extension of produced archives
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Accumulates archive entries for one batch run
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Vec<(String, Vec<u8>)>,
    index: HashMap<String, usize>,
}

impl ArchiveBuilder {
    /// Empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; returns true when it replaced an earlier entry of the same name
    pub fn add(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> bool {
        let name = name.into();
        match self.index.get(&name) {
            Some(&pos) => {
                tracing::debug!(name = %name, "Archive entry replaced by later image");
                self.entries[pos].1 = bytes;
                true
            }
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, bytes));
                false
            }
        }
    }

    /// Number of distinct entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry was added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Encode all entries into a ZIP archive
    pub fn finish(self, compression: ArchiveCompression) -> Result<Vec<u8>> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default().compression_method(compression.into());

        for (name, bytes) in self.entries {
            writer.start_file(name, options)?;
            writer.write_all(&bytes)?;
        }

        Ok(writer.finish()?.into_inner())
    }
}

/// Archive filename encoding the batch counts, e.g. `images_3_1_4.zip`
pub fn archive_file_name(prefix: &str, success: usize, failure: usize, total: usize) -> String {
    format!(
        "{}_{}_{}_{}.{}",
        prefix, success, failure, total, ARCHIVE_EXTENSION
    )
}

/// A finished archive ready to be saved
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinishedArchive {
    /// Output filename
    pub name: String,
    /// Encoded archive
    pub bytes: Vec<u8>,
}

/// Package the successful entries of a batch
///
/// Returns `Ok(None)` when no item succeeded: no archive is built in that case.
pub fn finalize(
    builder: ArchiveBuilder,
    state: &BatchState,
    config: &ArchiveConfig,
) -> Result<Option<FinishedArchive>> {
    if state.success_count == 0 {
        tracing::info!(total = state.total, "No images retrieved, skipping archive");
        return Ok(None);
    }

    let entries = builder.len();
    let bytes = builder.finish(config.compression)?;
    let name = archive_file_name(
        &config.file_prefix,
        state.success_count,
        state.failure_count,
        state.total,
    );
    tracing::debug!(name = %name, entries, size = bytes.len(), "Archive encoded");

    Ok(Some(FinishedArchive { name, bytes }))
}

/// Receiver of finished archives (the save collaborator)
#[async_trait]
pub trait ArchiveSaver: Send + Sync {
    /// Persist the archive and return where it went
    async fn save(&self, archive: &FinishedArchive) -> Result<PathBuf>;
}

/// Saves archives as files in a directory
#[derive(Clone, Debug)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    /// Save into `dir`, created on first save if missing
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ArchiveSaver for DirectorySaver {
    async fn save(&self, archive: &FinishedArchive) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create output directory '{}': {}",
                    self.dir.display(),
                    e
                ),
            )
        })?;

        let path = self.dir.join(&archive.name);
        tokio::fs::write(&path, &archive.bytes).await?;
        tracing::info!(path = %path.display(), size = archive.bytes.len(), "Archive saved");
        Ok(path)
    }
}
