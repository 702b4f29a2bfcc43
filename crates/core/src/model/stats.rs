use serde::Serialize;

use crate::model::PageNumber;

/// Derived progress view for a page bound.
///
/// `remaining` is signed: marking more pages than the bound allows drives it
/// below zero instead of clamping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressStats {
    pub total: u32,
    pub easy_count: usize,
    pub remaining: i64,
    pub percent_complete: u32,
    pub easy_list: Vec<PageNumber>,
}

impl ProgressStats {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.remaining <= 0
    }
}
