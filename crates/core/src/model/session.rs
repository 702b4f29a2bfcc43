use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::model::{PageBound, PageNumber, ProgressStats};

/// Persisted progress for one storage key.
///
/// `easy_pages` is kept sorted ascending and duplicate-free by every method
/// that touches it, and `created_at <= last_updated` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    easy_pages: Vec<PageNumber>,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
    extra: Map<String, Value>,
}

impl Session {
    /// Fresh session with no easy pages; both timestamps are `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            easy_pages: Vec::new(),
            created_at: now,
            last_updated: now,
            extra: Map::new(),
        }
    }

    /// Rebuild a session from decoded parts, restoring the invariants.
    ///
    /// Pages are sorted and de-duplicated. A `last_updated` earlier than
    /// `created_at` is raised to `created_at`.
    #[must_use]
    pub fn from_parts(
        mut easy_pages: Vec<PageNumber>,
        created_at: DateTime<Utc>,
        last_updated: DateTime<Utc>,
        extra: Map<String, Value>,
    ) -> Self {
        easy_pages.sort_unstable();
        easy_pages.dedup();
        Self {
            easy_pages,
            created_at,
            last_updated: last_updated.max(created_at),
            extra,
        }
    }

    #[must_use]
    pub fn easy_pages(&self) -> &[PageNumber] {
        &self.easy_pages
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Unknown top-level fields carried through from an imported record.
    #[must_use]
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    #[must_use]
    pub fn contains(&self, page: PageNumber) -> bool {
        self.easy_pages.binary_search(&page).is_ok()
    }

    /// Insert `page` in sorted position. Returns `false` if it was already present.
    pub fn mark(&mut self, page: PageNumber) -> bool {
        match self.easy_pages.binary_search(&page) {
            Ok(_) => false,
            Err(idx) => {
                self.easy_pages.insert(idx, page);
                true
            }
        }
    }

    /// Remove `page`. Returns `false` if it was not present.
    pub fn unmark(&mut self, page: PageNumber) -> bool {
        match self.easy_pages.binary_search(&page) {
            Ok(idx) => {
                self.easy_pages.remove(idx);
                true
            }
            Err(_) => false,
        }
    }

    /// Stamp `last_updated`, never moving it before `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = now.max(self.created_at);
    }

    /// First page after `current` that is not easy, scanning `1..=bound` cyclically.
    ///
    /// The scan makes at most `bound` attempts, so it terminates whatever the
    /// page list holds. Returns `None` when every page in range is easy.
    #[must_use]
    pub fn next_page(&self, current: PageNumber, bound: PageBound) -> Option<PageNumber> {
        let max = bound.get();
        let mut candidate = current.value().checked_add(1).unwrap_or(1);

        for _ in 0..max {
            if candidate > max {
                candidate = 1;
            }
            let page = PageNumber::new(candidate);
            if !self.contains(page) {
                return Some(page);
            }
            candidate = candidate.checked_add(1).unwrap_or(1);
        }

        None
    }

    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn statistics(&self, bound: PageBound) -> ProgressStats {
        let total = bound.get();
        let easy_count = self.easy_pages.len();
        let remaining = i64::from(total) - i64::try_from(easy_count).unwrap_or(i64::MAX);
        let percent_complete = ((easy_count as f64 / f64::from(total)) * 100.0).round() as u32;

        ProgressStats {
            total,
            easy_count,
            remaining,
            percent_complete,
            easy_list: self.easy_pages.clone(),
        }
    }
}
