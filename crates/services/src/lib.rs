#![forbid(unsafe_code)]

pub mod audio_upload;
pub mod error;
pub mod progress_store;

pub use progress_core::Clock;

pub use audio_upload::{AudioUploadClient, AudioUploadConfig};
pub use error::{AudioUploadError, ProgressError};
pub use progress_store::{DEFAULT_STORAGE_KEY, ProgressStore};
