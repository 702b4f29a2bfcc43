#![forbid(unsafe_code)]

pub mod record;
pub mod repository;
pub mod sqlite;

pub use record::{RecordError, SessionRecord};
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
