use serde::Serialize;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PageError {
    #[error("invalid page number: {raw}")]
    InvalidNumber { raw: String },

    #[error("page bound must be > 0")]
    ZeroBound,
}

/// A page of the exercise, 1-based.
///
/// Marks are not range-checked, so `0` and values above the query bound are
/// representable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PageNumber(u32);

impl PageNumber {
    #[must_use]
    pub fn new(page: u32) -> Self {
        Self(page)
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Upper bound of the page index space, supplied at query time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageBound(NonZeroU32);

impl PageBound {
    /// Bound used when the caller does not supply one.
    pub const DEFAULT: PageBound = PageBound(NonZeroU32::new(100).unwrap());

    /// # Errors
    ///
    /// Returns `PageError::ZeroBound` if `max_pages` is zero.
    pub fn new(max_pages: u32) -> Result<Self, PageError> {
        NonZeroU32::new(max_pages)
            .map(Self)
            .ok_or(PageError::ZeroBound)
    }

    #[must_use]
    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

impl Default for PageBound {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Debug for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageNumber({})", self.0)
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PageBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageBound({})", self.0)
    }
}

impl fmt::Display for PageBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PageNumber {
    fn from(page: u32) -> Self {
        Self(page)
    }
}

impl FromStr for PageNumber {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(PageNumber::new)
            .map_err(|_| PageError::InvalidNumber { raw: s.to_string() })
    }
}

impl FromStr for PageBound {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .parse::<u32>()
            .map_err(|_| PageError::InvalidNumber { raw: s.to_string() })?;
        PageBound::new(raw)
    }
}
