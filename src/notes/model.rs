//! Encounter record schema.
//!
//! Records are stored exactly as written: the storage layer never checks
//! that `name` is filled in or that `status` is one of the two known values.
//! That check belongs to whoever builds the draft (see
//! [`EncounterDraft::validate`]).

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Offset-less ISO-8601 shapes, read as UTC.
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EncounterStatus {
    Accepted,
    Rejected,
    /// Anything else found in storage, kept verbatim (including `""`).
    Other(UnknownStatus),
}

/// Status text that is neither `"accepted"` nor `"rejected"`. Only built by
/// [`EncounterStatus::parse`], so a known status never hides in here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UnknownStatus(String);

impl UnknownStatus {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl EncounterStatus {
    pub fn parse(raw: &str) -> Self {
        Self::from(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            EncounterStatus::Accepted => "accepted",
            EncounterStatus::Rejected => "rejected",
            EncounterStatus::Other(raw) => raw.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, EncounterStatus::Other(_))
    }
}

impl Default for EncounterStatus {
    fn default() -> Self {
        EncounterStatus::Other(UnknownStatus::default())
    }
}

impl From<String> for EncounterStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "accepted" => EncounterStatus::Accepted,
            "rejected" => EncounterStatus::Rejected,
            _ => EncounterStatus::Other(UnknownStatus(raw)),
        }
    }
}

impl From<EncounterStatus> for String {
    fn from(status: EncounterStatus) -> Self {
        match status {
            EncounterStatus::Other(UnknownStatus(raw)) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EncounterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged encounter as persisted under `encounter_notes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: EncounterStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approach: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Free text from a numeric input (1-10); never parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// ISO-8601 as written; see [`EncounterRecord::recorded_at`].
    #[serde(default)]
    pub timestamp: String,
    /// Keys this schema does not know about, written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EncounterRecord {
    /// Parsed `timestamp`, or `None` when the stored text is not an
    /// ISO-8601 date or date-time (see [`parse_timestamp`]).
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }

    /// Editable fields of this record, e.g. to prefill an edit form.
    pub fn draft(&self) -> EncounterDraft {
        EncounterDraft {
            name: self.name.clone(),
            status: self.status.clone(),
            location: self.location.clone(),
            approach: self.approach.clone(),
            reason: self.reason.clone(),
            confidence: self.confidence.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// User-entered fields of a record before it gets an id and timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncounterDraft {
    pub name: String,
    pub status: EncounterStatus,
    pub location: Option<String>,
    pub approach: Option<String>,
    pub reason: Option<String>,
    pub confidence: Option<String>,
    pub notes: Option<String>,
}

impl EncounterDraft {
    pub fn new(name: impl Into<String>, status: EncounterStatus) -> Self {
        Self {
            name: name.into(),
            status,
            ..Self::default()
        }
    }

    /// Form-level check run before a draft is handed to the repository.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        if !self.status.is_known() {
            return Err(ValidationError::MissingStatus);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name is required")]
    MissingName,
    #[error("status must be accepted or rejected")]
    MissingStatus,
}

/// Timestamp text in the shape the mobile client writes
/// (`2025-01-31T12:00:00.000Z`).
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse stored timestamp text. RFC 3339 first; date-times without an
/// offset and bare dates (`2025-01-31`, midnight) are taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Id derived from wall-clock milliseconds.
pub fn generate_id(at: DateTime<Utc>) -> String {
    at.timestamp_millis().to_string()
}

pub fn materialize(draft: EncounterDraft, existing_id: Option<&str>) -> EncounterRecord {
    materialize_at(draft, existing_id, Utc::now())
}

/// Complete a draft into a record stamped at `now`. Fields are copied
/// verbatim; nothing is trimmed or validated.
pub fn materialize_at(
    draft: EncounterDraft,
    existing_id: Option<&str>,
    now: DateTime<Utc>,
) -> EncounterRecord {
    let id = existing_id
        .map(str::to_string)
        .unwrap_or_else(|| generate_id(now));

    EncounterRecord {
        id,
        name: draft.name,
        status: draft.status,
        location: draft.location,
        approach: draft.approach,
        reason: draft.reason,
        confidence: draft.confidence,
        notes: draft.notes,
        timestamp: format_timestamp(now),
        extra: Map::new(),
    }
}
