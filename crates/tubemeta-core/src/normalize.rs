//! Mapping of cached records onto library metadata.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::CacheRecord;

/// Key under which channel ids are attached to people.
pub const PROVIDER_ID_KEY: &str = "youtubemetadata";

/// Role of an attributed person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonRole {
    /// Channel owner credited for the upload.
    Director,
}

/// A person attributed to an item, keyed by provider ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Display name.
    pub name: String,
    /// Credit.
    pub role: PersonRole,
    /// Ids keyed by provider, e.g. [`PROVIDER_ID_KEY`] to the channel id.
    pub provider_ids: HashMap<String, String>,
}

/// Metadata in the shape the host library consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMetadata {
    /// Remote title, verbatim.
    pub title: String,
    /// Remote description, verbatim.
    pub overview: String,
    /// Publication instant.
    pub premiere_date: DateTime<Utc>,
    /// Year of `premiere_date`.
    pub production_year: i32,
    /// Channel credited as director.
    pub director: Person,
}

/// Build the person credited as director for a channel.
#[must_use]
pub fn create_person(name: &str, channel_id: &str) -> Person {
    Person {
        name: name.to_string(),
        role: PersonRole::Director,
        provider_ids: HashMap::from([(PROVIDER_ID_KEY.to_string(), channel_id.to_string())]),
    }
}

/// Normalize a cached record.
///
/// # Errors
///
/// Returns [`Error::MetadataParse`] when the publication timestamp is missing
/// or cannot be parsed.
pub fn normalize(record: &CacheRecord) -> Result<NormalizedMetadata> {
    let snippet = record.snippet();
    let raw = snippet
        .published_at
        .as_deref()
        .ok_or_else(|| Error::metadata_parse(record.id(), "missing publishedAt"))?;
    let premiere_date = parse_timestamp(raw)
        .ok_or_else(|| Error::metadata_parse(record.id(), format!("invalid publishedAt {raw:?}")))?;
    let (channel_title, channel_id) = record.channel();

    Ok(NormalizedMetadata {
        title: snippet.title.clone(),
        overview: snippet.description.clone(),
        premiere_date,
        production_year: premiere_date.year(),
        director: create_person(channel_title, channel_id),
    })
}

/// Parse an API timestamp. Values without an offset are taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
