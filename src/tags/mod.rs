//! Tag update helpers built on the update endpoint.

use serde::{Deserialize, Serialize};

use crate::client::ReaderApi;
use crate::error::ReaderError;
use crate::models::{ApiResponse, Document, UpdateDocumentRequest};

/// How new tags combine with a document's current ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagUpdateMode {
    /// Overwrite the tag set
    Replace,
    /// Union with the current tags
    #[default]
    Add,
}

impl std::fmt::Display for TagUpdateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagUpdateMode::Replace => write!(f, "replace"),
            TagUpdateMode::Add => write!(f, "add"),
        }
    }
}

/// Current tags followed by new ones, first occurrence wins
pub fn merge_tags(current: &[String], new: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(current.len() + new.len());
    for tag in current.iter().chain(new) {
        if !merged.contains(tag) {
            merged.push(tag.clone());
        }
    }
    merged
}

/// Set the tags of one document.
///
/// The document is looked up first so a missing ID surfaces as
/// [`ReaderError::DocumentNotFound`] rather than an upstream 404.
pub async fn update_document_tags(
    api: &dyn ReaderApi,
    id: &str,
    tags: &[String],
    mode: TagUpdateMode,
) -> Result<ApiResponse<Document>, ReaderError> {
    let current = api.get_document(id).await?;

    let next = match mode {
        TagUpdateMode::Replace => merge_tags(&[], tags),
        TagUpdateMode::Add => merge_tags(&current.data.tag_names(), tags),
    };
    tracing::debug!("Updating tags of {} ({}): {:?}", id, mode, next);

    let mut response = api
        .update_document(id, &UpdateDocumentRequest::tags(next))
        .await?;
    let mut messages = current.messages;
    messages.append(&mut response.messages);
    response.messages = messages;
    Ok(response)
}

/// Outcome for one document of a bulk update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagUpdateResult {
    pub id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-item report of a bulk update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkTagReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<TagUpdateResult>,
}

/// Apply the same tag change to many documents, one at a time.
///
/// Failures are recorded per ID and never abort the batch.
pub async fn bulk_update_tags(
    api: &dyn ReaderApi,
    ids: &[String],
    tags: &[String],
    mode: TagUpdateMode,
) -> BulkTagReport {
    let mut results = Vec::with_capacity(ids.len());

    for id in ids {
        let result = match update_document_tags(api, id, tags, mode).await {
            Ok(response) => TagUpdateResult {
                id: id.clone(),
                success: true,
                tags: Some(response.data.tag_names()),
                error: None,
            },
            Err(e) => {
                tracing::warn!("Tag update failed for {}: {}", id, e);
                TagUpdateResult {
                    id: id.clone(),
                    success: false,
                    tags: None,
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(result);
    }

    let succeeded = results.iter().filter(|r| r.success).count();
    BulkTagReport {
        total: results.len(),
        succeeded,
        failed: results.len() - succeeded,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{make_document, MockReader};
    use crate::models::Tags;

    fn tagged(id: &str, tags: &[&str]) -> Document {
        let mut doc = make_document(id, id);
        doc.tags = Some(Tags::List(tags.iter().map(|t| t.to_string()).collect()));
        doc
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_merge_keeps_first_occurrence() {
        let merged = merge_tags(&strings(&["a", "b"]), &strings(&["b", "c", "c"]));
        assert_eq!(merged, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_mode_parses_lowercase() {
        let mode: TagUpdateMode = serde_json::from_str("\"replace\"").unwrap();
        assert_eq!(mode, TagUpdateMode::Replace);
        assert_eq!(TagUpdateMode::default(), TagUpdateMode::Add);
    }

    #[tokio::test]
    async fn test_replace_overwrites() {
        let reader = MockReader::with_documents(vec![tagged("d1", &["old", "keep"])]);
        let response = update_document_tags(&reader, "d1", &strings(&["new"]), TagUpdateMode::Replace)
            .await
            .unwrap();

        assert_eq!(response.data.tag_names(), vec!["new"]);
        let calls = reader.update_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.tags, Some(strings(&["new"])));
    }

    #[tokio::test]
    async fn test_add_unions_without_duplicates() {
        let reader = MockReader::with_documents(vec![tagged("d1", &["rust", "async"])]);
        update_document_tags(&reader, "d1", &strings(&["async", "tokio"]), TagUpdateMode::Add)
            .await
            .unwrap();

        let doc = reader.document("d1").unwrap();
        assert_eq!(doc.tag_names(), vec!["rust", "async", "tokio"]);
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let reader = MockReader::new();
        let err = update_document_tags(&reader, "ghost", &strings(&["x"]), TagUpdateMode::Replace)
            .await
            .unwrap_err();
        assert!(matches!(err, ReaderError::DocumentNotFound(ref id) if id == "ghost"));
        assert!(reader.update_calls().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_reports_each_document() {
        let reader = MockReader::with_documents(vec![
            tagged("d1", &["a"]),
            tagged("d3", &[]),
        ]);
        let report = bulk_update_tags(
            &reader,
            &strings(&["d1", "d2", "d3"]),
            &strings(&["b"]),
            TagUpdateMode::Add,
        )
        .await;

        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.results[0].tags, Some(strings(&["a", "b"])));
        assert!(!report.results[1].success);
        assert_eq!(report.results[1].error.as_deref(), Some("Document not found"));
        assert_eq!(report.results[2].tags, Some(strings(&["b"])));

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["results"][1].get("tags").is_none());
        assert!(json["results"][0].get("error").is_none());
    }
}
