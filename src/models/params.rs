//! Listing filters, listing pages and request bodies.

use serde::{Deserialize, Serialize};

use super::document::{Category, Document, Location};

/// Filter options accepted by the `list` operation.
///
/// Field names follow the upstream camelCase query keys. `added_after` and
/// `with_full_content` have no upstream equivalent and are never put on the
/// wire; see [`ListParams::query_pairs`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Single document ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// ISO 8601 lower bound on `updated_at`, evaluated upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_after: Option<String>,

    /// ISO 8601 lower bound on `saved_at`, evaluated locally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_after: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_cursor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_html_content: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_raw_source_url: Option<bool>,

    /// Resolve each document's plain-text content (local only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_full_content: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn added_after(mut self, date: impl Into<String>) -> Self {
        self.added_after = Some(date.into());
        self
    }

    pub fn page_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.page_cursor = Some(cursor.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_full_content(mut self, enabled: bool) -> Self {
        self.with_full_content = Some(enabled);
        self
    }

    pub fn with_html_content(mut self, enabled: bool) -> Self {
        self.with_html_content = Some(enabled);
        self
    }

    pub fn wants_full_content(&self) -> bool {
        self.with_full_content == Some(true)
    }

    pub fn wants_html_content(&self) -> bool {
        self.with_html_content == Some(true)
    }

    pub fn wants_raw_source_url(&self) -> bool {
        self.with_raw_source_url == Some(true)
    }

    /// Caller asked for a specific page or page size
    pub fn has_pagination_markers(&self) -> bool {
        self.page_cursor.is_some() || self.limit.is_some()
    }

    /// Query pairs forwarded to the upstream `list` endpoint
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref id) = self.id {
            pairs.push(("id", id.clone()));
        }
        if let Some(ref updated_after) = self.updated_after {
            pairs.push(("updatedAfter", updated_after.clone()));
        }
        if let Some(ref location) = self.location {
            pairs.push(("location", location.to_string()));
        }
        if let Some(ref category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        if let Some(ref tag) = self.tag {
            pairs.push(("tag", tag.clone()));
        }
        if let Some(ref cursor) = self.page_cursor {
            pairs.push(("pageCursor", cursor.clone()));
        }
        if let Some(with_html) = self.with_html_content {
            pairs.push(("withHtmlContent", with_html.to_string()));
        }
        if let Some(with_raw) = self.with_raw_source_url {
            pairs.push(("withRawSourceUrl", with_raw.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// One page of the `list` endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    /// Total matches for the current filter
    #[serde(default)]
    pub count: u64,

    /// Continuation token; `None` ends the stream
    #[serde(default)]
    pub next_page_cursor: Option<String>,

    #[serde(default)]
    pub results: Vec<Document>,
}

/// Body of `POST /save/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Body of `PATCH /update/{id}/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl UpdateDocumentRequest {
    pub fn tags(tags: Vec<String>) -> Self {
        Self {
            tags: Some(tags),
            ..Default::default()
        }
    }
}

/// A tag known to the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, alias = "key")]
    pub id: Option<String>,
    pub name: String,
}
