//! Storage quota estimation for the forum data directory.

use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageEstimate {
    pub usage: u64,
    pub quota: u64,
}

impl StorageEstimate {
    pub fn available(&self) -> u64 {
        self.quota.saturating_sub(self.usage)
    }
}

/// Source of storage estimates. Returning `None` means no estimate is
/// available and writes are attempted without a pre-check.
pub trait QuotaEstimator {
    fn estimate(&self, root: &Path) -> Option<StorageEstimate>;
}

/// Measures the data directory against a configured byte limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryQuota {
    limit: Option<u64>,
}

impl DirectoryQuota {
    pub fn new(limit: Option<u64>) -> Self {
        Self { limit }
    }

    pub fn unlimited() -> Self {
        Self { limit: None }
    }
}

impl QuotaEstimator for DirectoryQuota {
    fn estimate(&self, root: &Path) -> Option<StorageEstimate> {
        let quota = self.limit?;
        match directory_size(root) {
            Ok(usage) => Some(StorageEstimate { usage, quota }),
            Err(err) => {
                tracing::warn!(error = %err, root = %root.display(), "storage estimate failed");
                None
            }
        }
    }
}

/// Always reports the same estimate.
#[derive(Debug, Clone, Copy)]
pub struct FixedQuota(pub StorageEstimate);

impl QuotaEstimator for FixedQuota {
    fn estimate(&self, _root: &Path) -> Option<StorageEstimate> {
        Some(self.0)
    }
}

fn directory_size(root: &Path) -> io::Result<u64> {
    let mut total = 0u64;
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err),
        };
        for entry in entries {
            let entry = entry?;
            let meta = entry.metadata()?;
            if meta.is_dir() {
                pending.push(entry.path());
            } else {
                total = total.saturating_add(meta.len());
            }
        }
    }
    Ok(total)
}
