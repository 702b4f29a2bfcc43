use std::sync::Arc;

use log::{debug, info, warn};
use progress_core::Clock;
use progress_core::model::{PageBound, PageNumber, ProgressStats, Session};
use storage::record::{RecordError, SessionRecord, parse_session};
use storage::repository::KeyValueStore;

use crate::error::ProgressError;

/// Key used when the caller has no reason to pick another.
pub const DEFAULT_STORAGE_KEY: &str = "lesanimaux_session";

/// What a read of the backing key produced.
enum LoadOutcome {
    Missing,
    Corrupt(RecordError),
    Loaded(Session),
}

/// Tracks the easy pages of one exercise, persisted under a single key.
///
/// Every operation re-reads the stored record, so two stores over the same
/// backend and key observe each other's writes (last write wins).
///
/// Reads go through [`ProgressStore::get_or_create`]: the first query against
/// an empty backend materializes and persists a fresh session.
#[derive(Clone)]
pub struct ProgressStore {
    key: String,
    backend: Arc<dyn KeyValueStore>,
    clock: Clock,
}

impl ProgressStore {
    #[must_use]
    pub fn new(key: impl Into<String>, backend: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        Self {
            key: key.into(),
            backend,
            clock,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Load the stored session, creating and persisting an empty one if the
    /// key is missing or holds an unreadable record.
    ///
    /// Stored text is read with the same rules as [`ProgressStore::import`]: a
    /// JSON object with an `easy_web_pages` array is kept even when its
    /// timestamps are missing.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` only for backend failures.
    pub async fn get_or_create(&self) -> Result<Session, ProgressError> {
        match self.load().await? {
            LoadOutcome::Loaded(session) => return Ok(session),
            LoadOutcome::Missing => debug!("no session under {:?}, creating one", self.key),
            LoadOutcome::Corrupt(err) => {
                warn!("discarding unreadable session under {:?}: {err}", self.key);
            }
        }

        let session = Session::new(self.clock.now());
        self.write(&session).await?;
        Ok(session)
    }

    /// Stamp `last_updated` and replace the stored record.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the record cannot be encoded or written.
    pub async fn save(&self, session: &mut Session) -> Result<(), ProgressError> {
        session.touch(self.clock.now());
        self.write(session).await
    }

    /// Returns `false` without writing if `page` is already easy.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` for backend failures.
    pub async fn mark_easy(&self, page: PageNumber) -> Result<bool, ProgressError> {
        let mut session = self.get_or_create().await?;
        if !session.mark(page) {
            debug!("page {page} is already marked as easy");
            return Ok(false);
        }
        self.save(&mut session).await?;
        debug!("page {page} marked as easy");
        Ok(true)
    }

    /// Returns `false` without writing if `page` is not easy.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` for backend failures.
    pub async fn unmark_easy(&self, page: PageNumber) -> Result<bool, ProgressError> {
        let mut session = self.get_or_create().await?;
        if !session.unmark(page) {
            debug!("page {page} is not in the easy list");
            return Ok(false);
        }
        self.save(&mut session).await?;
        debug!("page {page} removed from the easy list");
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns `ProgressError` for backend failures.
    pub async fn is_easy(&self, page: PageNumber) -> Result<bool, ProgressError> {
        Ok(self.get_or_create().await?.contains(page))
    }

    /// Next non-easy page after `current`, wrapping to 1 past `bound`.
    /// `None` means every page in `1..=bound` is easy.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` for backend failures.
    pub async fn next_page(
        &self,
        current: PageNumber,
        bound: PageBound,
    ) -> Result<Option<PageNumber>, ProgressError> {
        let next = self.get_or_create().await?.next_page(current, bound);
        if next.is_none() {
            info!("all {bound} pages are marked as easy");
        }
        Ok(next)
    }

    /// # Errors
    ///
    /// Returns `ProgressError` for backend failures.
    pub async fn statistics(&self, bound: PageBound) -> Result<ProgressStats, ProgressError> {
        Ok(self.get_or_create().await?.statistics(bound))
    }

    /// Drop the stored record and start over with an empty session.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` for backend failures.
    pub async fn reset(&self) -> Result<Session, ProgressError> {
        self.backend.remove(&self.key).await?;
        info!("session {:?} reset", self.key);
        self.get_or_create().await
    }

    /// Pretty-printed JSON of the current session.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` for backend or encoding failures.
    pub async fn export(&self) -> Result<String, ProgressError> {
        let session = self.get_or_create().await?;
        Ok(SessionRecord::from_session(&session).to_json_pretty()?)
    }

    /// Replace the stored session with the one described by `text`.
    ///
    /// Returns `false`, leaving the stored record untouched, when `text` is not
    /// a JSON object with an `easy_web_pages` array of page numbers. Accepted
    /// pages are sorted and de-duplicated; timestamps are kept when present.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` for backend or encoding failures.
    pub async fn import(&self, text: &str) -> Result<bool, ProgressError> {
        let session = match parse_session(text, self.clock.now()) {
            Ok(session) => session,
            Err(err) => {
                warn!("rejected session import: {err}");
                return Ok(false);
            }
        };
        self.write(&session).await?;
        info!(
            "imported session {:?} with {} easy pages",
            self.key,
            session.easy_pages().len()
        );
        Ok(true)
    }

    async fn load(&self) -> Result<LoadOutcome, ProgressError> {
        let Some(text) = self.backend.get(&self.key).await? else {
            return Ok(LoadOutcome::Missing);
        };
        Ok(match parse_session(&text, self.clock.now()) {
            Ok(session) => LoadOutcome::Loaded(session),
            Err(err) => LoadOutcome::Corrupt(err),
        })
    }

    async fn write(&self, session: &Session) -> Result<(), ProgressError> {
        let text = SessionRecord::from_session(session).to_json()?;
        self.backend.set(&self.key, &text).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress_core::time::{fixed_clock, fixed_now};
    use storage::repository::InMemoryStore;

    fn store() -> (ProgressStore, InMemoryStore) {
        let backend = InMemoryStore::new();
        let store = ProgressStore::new(DEFAULT_STORAGE_KEY, Arc::new(backend.clone()), fixed_clock());
        (store, backend)
    }

    #[tokio::test]
    async fn get_or_create_persists_fresh_session() {
        let (store, backend) = store();
        let session = store.get_or_create().await.unwrap();

        assert!(session.easy_pages().is_empty());
        assert_eq!(session.created_at(), fixed_now());
        let stored = backend.get(DEFAULT_STORAGE_KEY).await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn corrupt_record_is_replaced() {
        let (store, backend) = store();
        backend.set(DEFAULT_STORAGE_KEY, "{oops").await.unwrap();

        let session = store.get_or_create().await.unwrap();
        assert!(session.easy_pages().is_empty());

        let stored = backend.get(DEFAULT_STORAGE_KEY).await.unwrap().unwrap();
        assert!(parse_session(&stored, fixed_now()).is_ok());
    }

    #[tokio::test]
    async fn query_on_virgin_store_materializes_record() {
        let (store, backend) = store();
        assert!(!store.is_easy(PageNumber::new(1)).await.unwrap());
        assert!(backend.get(DEFAULT_STORAGE_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn save_stamps_last_updated() {
        let (mut store, _backend) = store();
        let mut session = store.get_or_create().await.unwrap();
        store.clock_mut().advance(chrono::Duration::minutes(3));
        store.save(&mut session).await.unwrap();

        assert_eq!(session.last_updated(), fixed_now() + chrono::Duration::minutes(3));
        let reloaded = store.get_or_create().await.unwrap();
        assert_eq!(reloaded, session);
    }
}
