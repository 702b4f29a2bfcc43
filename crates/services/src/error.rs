//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by `ProgressStore`.
///
/// Corrupt stored records and rejected imports are not errors; they are
/// absorbed into the documented return values.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors emitted by `AudioUploadClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AudioUploadError {
    #[error("upload endpoint is not configured")]
    Disabled,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
