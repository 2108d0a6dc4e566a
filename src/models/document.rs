//! Document model as returned by the Reader `list` endpoint.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of document stored in Reader
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Article,
    Email,
    Rss,
    Highlight,
    Note,
    Pdf,
    Epub,
    Tweet,
    Video,
    #[serde(untagged)]
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Article => "article",
            Category::Email => "email",
            Category::Rss => "rss",
            Category::Highlight => "highlight",
            Category::Note => "note",
            Category::Pdf => "pdf",
            Category::Epub => "epub",
            Category::Tweet => "tweet",
            Category::Video => "video",
            Category::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a document lives in the Reader triage flow
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    New,
    Later,
    /// Legacy location, still returned for older accounts
    Shortlist,
    Archive,
    Feed,
    #[serde(untagged)]
    Other(String),
}

impl Location {
    pub fn as_str(&self) -> &str {
        match self {
            Location::New => "new",
            Location::Later => "later",
            Location::Shortlist => "shortlist",
            Location::Archive => "archive",
            Location::Feed => "feed",
            Location::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One value of the tag mapping: either a bare name or a tag object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(flatten)]
        extra: BTreeMap<String, serde_json::Value>,
    },
}

impl TagEntry {
    pub fn name(&self) -> &str {
        match self {
            TagEntry::Name(name) => name,
            TagEntry::Detailed { name, .. } => name,
        }
    }
}

/// Document tags. Upstream sends either a plain list or a mapping of opaque
/// keys to tag names; [`Tags::names`] is the only place that looks at the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tags {
    List(Vec<String>),
    Mapping(BTreeMap<String, TagEntry>),
}

impl Tags {
    /// Flatten to the canonical list of tag names
    pub fn names(&self) -> Vec<String> {
        match self {
            Tags::List(names) => names.clone(),
            Tags::Mapping(map) => map.values().map(|entry| entry.name().to_string()).collect(),
        }
    }
}

impl Default for Tags {
    fn default() -> Self {
        Tags::List(Vec::new())
    }
}

/// Tag names of an optional tag field, empty when absent
pub fn extract_tags(tags: Option<&Tags>) -> Vec<String> {
    tags.map(Tags::names).unwrap_or_default()
}

/// A Reader document
///
/// Fields mirror the upstream JSON. Timestamps are kept verbatim and parsed
/// on demand with [`parse_timestamp`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub source_url: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub category: Option<Category>,

    #[serde(default)]
    pub location: Option<Location>,

    #[serde(default)]
    pub tags: Option<Tags>,

    #[serde(default)]
    pub site_name: Option<String>,

    #[serde(default)]
    pub word_count: Option<u64>,

    #[serde(default)]
    pub reading_time: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,

    /// Either an ISO date or epoch milliseconds
    #[serde(default)]
    pub published_date: Option<serde_json::Value>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub parent_id: Option<String>,

    #[serde(default)]
    pub reading_progress: Option<f64>,

    #[serde(default)]
    pub first_opened_at: Option<String>,

    #[serde(default)]
    pub last_opened_at: Option<String>,

    #[serde(default)]
    pub saved_at: Option<String>,

    #[serde(default)]
    pub last_moved_at: Option<String>,

    #[serde(default)]
    pub html_content: Option<String>,

    #[serde(default)]
    pub raw_source_url: Option<String>,
}

impl Document {
    /// Canonical tag names for this document
    pub fn tag_names(&self) -> Vec<String> {
        extract_tags(self.tags.as_ref())
    }

    /// Parsed `saved_at`, if present and well-formed
    pub fn saved_at_time(&self) -> Option<DateTime<Utc>> {
        self.saved_at.as_deref().and_then(parse_timestamp)
    }

    /// URL content should be resolved from: `source_url`, falling back to `url`
    pub fn content_url(&self) -> Option<&str> {
        self.source_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| Some(self.url.as_str()).filter(|u| !u.trim().is_empty()))
    }
}

/// Parse an upstream or user-supplied timestamp.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (taken as UTC) or a bare
/// `YYYY-MM-DD` (UTC midnight).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
