//! Output projection of documents.

use serde::Serialize;

use crate::models::{Category, Document, Location};

/// The fixed field set emitted for each document.
///
/// Core fields are always present (as `null` when upstream had nothing);
/// the trailing three appear only when requested and available.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentView {
    pub id: String,
    pub url: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub source: Option<String>,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub tags: Vec<String>,
    pub site_name: Option<String>,
    pub word_count: Option<u64>,
    pub reading_time: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub published_date: Option<serde_json::Value>,
    pub summary: Option<String>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub notes: Option<String>,
    pub parent_id: Option<String>,
    pub reading_progress: Option<f64>,
    pub first_opened_at: Option<String>,
    pub last_opened_at: Option<String>,
    pub saved_at: Option<String>,
    pub last_moved_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_source_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
}

/// Which optional fields to carry into the view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionOptions {
    pub raw_source_url: bool,
    pub html_content: bool,
}

impl DocumentView {
    /// Project a document; `content` is set only when enrichment ran
    pub fn project(doc: Document, content: Option<String>, options: ProjectionOptions) -> Self {
        let tags = doc.tag_names();
        Self {
            id: doc.id,
            url: doc.url,
            title: doc.title,
            author: doc.author,
            source: doc.source,
            category: doc.category,
            location: doc.location,
            tags,
            site_name: doc.site_name,
            word_count: doc.word_count,
            reading_time: doc.reading_time,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            published_date: doc.published_date,
            summary: doc.summary,
            image_url: doc.image_url,
            source_url: doc.source_url,
            notes: doc.notes,
            parent_id: doc.parent_id,
            reading_progress: doc.reading_progress,
            first_opened_at: doc.first_opened_at,
            last_opened_at: doc.last_opened_at,
            saved_at: doc.saved_at,
            last_moved_at: doc.last_moved_at,
            raw_source_url: doc.raw_source_url.filter(|_| options.raw_source_url),
            content,
            html_content: doc.html_content.filter(|_| options.html_content),
        }
    }
}

/// Result of a listing request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListing {
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_cursor: Option<String>,
    pub documents: Vec<DocumentView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::make_document;
    use crate::models::{TagEntry, Tags};
    use std::collections::BTreeMap;

    #[test]
    fn test_projection_has_stable_core_fields() {
        let view = DocumentView::project(
            make_document("a", "A"),
            None,
            ProjectionOptions::default(),
        );
        let json = serde_json::to_value(&view).unwrap();
        let obj = json.as_object().unwrap();

        for key in [
            "id", "url", "title", "author", "source", "category", "location", "tags",
            "site_name", "word_count", "reading_time", "created_at", "updated_at",
            "published_date", "summary", "image_url", "source_url", "notes", "parent_id",
            "reading_progress", "first_opened_at", "last_opened_at", "saved_at",
            "last_moved_at",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert!(!obj.contains_key("content"));
        assert!(!obj.contains_key("html_content"));
        assert!(!obj.contains_key("raw_source_url"));
    }

    #[test]
    fn test_optional_fields_need_request_and_value() {
        let mut doc = make_document("a", "A");
        doc.html_content = Some("<p>x</p>".into());
        doc.raw_source_url = Some("https://raw.example.com/a".into());

        let hidden = DocumentView::project(doc.clone(), None, ProjectionOptions::default());
        assert!(hidden.html_content.is_none());
        assert!(hidden.raw_source_url.is_none());

        let shown = DocumentView::project(
            doc,
            Some("text".into()),
            ProjectionOptions {
                raw_source_url: true,
                html_content: true,
            },
        );
        assert_eq!(shown.html_content.as_deref(), Some("<p>x</p>"));
        assert_eq!(shown.raw_source_url.as_deref(), Some("https://raw.example.com/a"));
        assert_eq!(shown.content.as_deref(), Some("text"));
    }

    #[test]
    fn test_mapping_tags_are_flattened() {
        let mut doc = make_document("a", "A");
        let mut map = BTreeMap::new();
        map.insert("k1".to_string(), TagEntry::Name("rust".to_string()));
        doc.tags = Some(Tags::Mapping(map));
        let view = DocumentView::project(doc, None, ProjectionOptions::default());
        assert_eq!(view.tags, vec!["rust"]);
    }
}
