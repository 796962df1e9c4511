//! Run flag handling: at most one batch per downloader at a time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// Holds the downloader's run flag for the duration of one batch.
///
/// The flag is cleared on drop, whatever way the batch ended.
pub(crate) struct RunGuard {
    flag: Arc<AtomicBool>,
}

impl RunGuard {
    /// Claim the flag, or fail if another batch holds it
    pub(crate) fn acquire(flag: &Arc<AtomicBool>) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| Error::AlreadyRunning)?;
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        tracing::debug!("Downloader ready for next batch");
    }
}
