//! JSON shape of a persisted session.
//!
//! The same document is used as the stored value, the export text and the
//! import payload, and all three are read back through [`parse_session`]:
//!
//! ```json
//! {
//!   "easy_web_pages": [2, 4],
//!   "created_at": "2023-11-14T22:13:20.000Z",
//!   "last_updated": "2023-11-14T22:13:20.000Z"
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use progress_core::model::{PageNumber, Session};
use progress_core::time::parse_timestamp;

pub const PAGES_FIELD: &str = "easy_web_pages";
const CREATED_AT_FIELD: &str = "created_at";
const LAST_UPDATED_FIELD: &str = "last_updated";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RecordError {
    #[error("record is not valid JSON: {0}")]
    Malformed(String),

    #[error("record is not a JSON object")]
    NotObject,

    #[error("record has no `easy_web_pages` array")]
    MissingPages,

    #[error("easy_web_pages[{index}] is not a page number")]
    InvalidPage { index: usize },
}

/// Serialized form of a `Session`. `extra` is written after the known fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    pub easy_web_pages: Vec<PageNumber>,
    #[serde(serialize_with = "rfc3339::serialize")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "rfc3339::serialize")]
    pub last_updated: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionRecord {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        Self {
            easy_web_pages: session.easy_pages().to_vec(),
            created_at: session.created_at(),
            last_updated: session.last_updated(),
            extra: session.extra().clone(),
        }
    }

    /// Compact JSON for storage.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; unreachable for well-formed records.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Two-space indented JSON for export.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; unreachable for well-formed records.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Read a stored value or an import payload into a session.
///
/// Only `easy_web_pages` is required. Its elements must be non-negative
/// integers; the list is sorted and de-duplicated. Missing or unreadable
/// timestamps fall back to `now`. Other fields are kept as-is.
///
/// # Errors
///
/// Returns `RecordError` describing the first structural problem found.
pub fn parse_session(text: &str, now: DateTime<Utc>) -> Result<Session, RecordError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| RecordError::Malformed(err.to_string()))?;
    let Value::Object(mut fields) = value else {
        return Err(RecordError::NotObject);
    };
    let Some(Value::Array(raw_pages)) = fields.remove(PAGES_FIELD) else {
        return Err(RecordError::MissingPages);
    };

    let pages = raw_pages
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            raw.as_u64()
                .and_then(|page| u32::try_from(page).ok())
                .map(PageNumber::new)
                .ok_or(RecordError::InvalidPage { index })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let created_at = take_timestamp(&mut fields, CREATED_AT_FIELD).unwrap_or(now);
    let last_updated = take_timestamp(&mut fields, LAST_UPDATED_FIELD).unwrap_or(now);

    Ok(Session::from_parts(pages, created_at, last_updated, fields))
}

fn take_timestamp(fields: &mut Map<String, Value>, name: &str) -> Option<DateTime<Utc>> {
    match fields.remove(name)? {
        Value::String(raw) => parse_timestamp(&raw),
        _ => None,
    }
}

mod rfc3339 {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    use progress_core::time::format_timestamp;

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_timestamp(*at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use progress_core::time::fixed_now;

    fn pages(session: &Session) -> Vec<u32> {
        session.easy_pages().iter().map(PageNumber::value).collect()
    }

    #[test]
    fn encodes_wire_field_names() {
        let mut session = Session::new(fixed_now());
        session.mark(PageNumber::new(4));
        session.mark(PageNumber::new(2));

        let json = SessionRecord::from_session(&session).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"easy_web_pages":[2,4],"created_at":"2023-11-14T22:13:20.000Z","last_updated":"2023-11-14T22:13:20.000Z"}"#
        );
    }

    #[test]
    fn extra_fields_survive_a_write_and_read() {
        let text = r#"{"easy_web_pages":[3],"created_at":"2023-11-14T22:13:20Z","last_updated":"2023-11-14T22:13:20Z","theme":"dark"}"#;
        let session = parse_session(text, fixed_now()).unwrap();
        assert_eq!(session.extra().get("theme"), Some(&Value::from("dark")));

        let json = SessionRecord::from_session(&session).to_json().unwrap();
        assert!(json.ends_with(r#""theme":"dark"}"#));
        assert_eq!(parse_session(&json, fixed_now()).unwrap(), session);
    }

    #[test]
    fn parse_normalizes_page_order() {
        let session = parse_session(r#"{"easy_web_pages":[5,1,5,3]}"#, fixed_now()).unwrap();
        assert_eq!(pages(&session), vec![1, 3, 5]);
    }

    #[test]
    fn parse_defaults_missing_timestamps_to_now() {
        let session = parse_session(
            r#"{"easy_web_pages":[],"created_at":42}"#,
            fixed_now(),
        )
        .unwrap();
        assert_eq!(session.created_at(), fixed_now());
        assert_eq!(session.last_updated(), fixed_now());
        assert!(session.extra().is_empty());
    }

    #[test]
    fn parse_keeps_supplied_timestamps() {
        let created = fixed_now() - Duration::days(3);
        let text = format!(
            r#"{{"easy_web_pages":[1],"created_at":"{}","last_updated":"{}"}}"#,
            progress_core::time::format_timestamp(created),
            progress_core::time::format_timestamp(fixed_now()),
        );
        let session = parse_session(&text, fixed_now() + Duration::days(1)).unwrap();
        assert_eq!(session.created_at(), created);
        assert_eq!(session.last_updated(), fixed_now());
    }

    #[test]
    fn parse_rejects_structural_problems() {
        let now = fixed_now();
        assert!(matches!(
            parse_session("not json", now),
            Err(RecordError::Malformed(_))
        ));
        assert_eq!(parse_session("[1,2]", now), Err(RecordError::NotObject));
        assert_eq!(
            parse_session(r#"{"pages":[1]}"#, now),
            Err(RecordError::MissingPages)
        );
        assert_eq!(
            parse_session(r#"{"easy_web_pages":"1,2"}"#, now),
            Err(RecordError::MissingPages)
        );
        assert_eq!(
            parse_session(r#"{"easy_web_pages":[1,"two"]}"#, now),
            Err(RecordError::InvalidPage { index: 1 })
        );
        assert_eq!(
            parse_session(r#"{"easy_web_pages":[-4]}"#, now),
            Err(RecordError::InvalidPage { index: 0 })
        );
    }
}
