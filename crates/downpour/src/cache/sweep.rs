//! Age-based eviction of cache entries and purge of stale temp files.

use std::path::Path;
use std::time::{Duration, SystemTime};

use tokio::fs;
use tracing::{debug, info, warn};

use crate::cache::CacheLayout;
use crate::error::Result;

/// What a sweep removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Cache entries older than the maximum age
    pub expired_entries: usize,
    /// Leftover files from interrupted downloads
    pub temp_files: usize,
}

/// Delete entries last modified more than `max_age` ago and every file under `temp/`.
///
/// Failing to delete a single file is logged and skipped.
pub async fn sweep(layout: &CacheLayout, max_age: Duration) -> Result<SweepReport> {
    let mut report = SweepReport::default();

    // A max age reaching back before the epoch can never expire anything
    if let Some(cutoff) = SystemTime::now().checked_sub(max_age) {
        report.expired_entries = sweep_entries(layout, cutoff).await?;
    }

    let mut temps = fs::read_dir(layout.temp_dir()).await?;
    while let Some(entry) = temps.next_entry().await? {
        if entry.file_type().await?.is_file() && remove(&entry.path()).await {
            report.temp_files += 1;
        }
    }

    info!(
        expired_entries = report.expired_entries,
        temp_files = report.temp_files,
        "Cache sweep finished"
    );
    Ok(report)
}

async fn sweep_entries(layout: &CacheLayout, cutoff: SystemTime) -> Result<usize> {
    let mut removed = 0;
    let mut entries = fs::read_dir(layout.root()).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if !name.to_str().is_some_and(|name| layout.is_entry_name(name)) {
            continue;
        }

        let modified = match entry.metadata().await.and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                warn!(path = ?entry.path(), error = %e, "Failed to read cache entry metadata");
                continue;
            }
        };

        if modified < cutoff && remove(&entry.path()).await {
            removed += 1;
        }
    }
    Ok(removed)
}

async fn remove(path: &Path) -> bool {
    match fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = ?path, "Removed cache file");
            true
        }
        Err(e) => {
            warn!(path = ?path, error = %e, "Failed to remove cache file");
            false
        }
    }
}
