//! Per-event discussion forums with arbitrarily nested replies.

pub mod model;
pub mod quota;
pub mod store;

use std::io;

use thiserror::Error;

pub use model::{Image, NewPost, PostArena, PostId, PostPatch, PostRecord, Thread};
pub use quota::{DirectoryQuota, FixedQuota, QuotaEstimator, StorageEstimate};
pub use store::ForumStore;

#[derive(Debug, Error)]
pub enum ForumError {
    #[error("forum store is not initialized")]
    NotInitialized,
    #[error("post {0} not found")]
    NotFound(String),
    #[error("storage quota exceeded: need {needed} bytes, {available} available")]
    QuotaExceeded { needed: u64, available: u64 },
    #[error("i/o error: {0}")]
    Io(io::Error),
    #[error("corrupt forum data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to persist forum data: {0}")]
    Persist(#[from] tempfile::PersistError),
}

impl From<io::Error> for ForumError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::StorageFull {
            ForumError::QuotaExceeded {
                needed: 0,
                available: 0,
            }
        } else {
            ForumError::Io(err)
        }
    }
}

impl ForumError {
    pub fn is_quota(&self) -> bool {
        match self {
            ForumError::QuotaExceeded { .. } => true,
            ForumError::Persist(err) => err.error.kind() == io::ErrorKind::StorageFull,
            _ => false,
        }
    }
}

pub type ForumResult<T> = Result<T, ForumError>;
