//! In-memory reader for testing purposes.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::client::ReaderApi;
use crate::error::ReaderError;
use crate::models::{
    parse_timestamp, ApiResponse, Category, CreateDocumentRequest, Document, ListParams,
    ListingPage, Location, Tag, Tags, UpdateDocumentRequest,
};

/// A mock reader that serves a fixed corpus with upstream-like paging.
///
/// Cursors are plain offsets. HTML content and raw source URLs are only
/// returned when requested, as upstream does. Every `list` call is recorded.
#[derive(Debug)]
pub struct MockReader {
    documents: Mutex<Vec<Document>>,
    tags: Mutex<Vec<Tag>>,
    page_size: usize,
    list_calls: Mutex<Vec<ListParams>>,
    update_calls: Mutex<Vec<(String, UpdateDocumentRequest)>>,
}

impl Default for MockReader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockReader {
    /// Create an empty mock reader.
    pub fn new() -> Self {
        Self::with_documents(Vec::new())
    }

    /// Create a mock reader serving the given documents in order.
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: Mutex::new(documents),
            tags: Mutex::new(Vec::new()),
            page_size: 100,
            list_calls: Mutex::new(Vec::new()),
            update_calls: Mutex::new(Vec::new()),
        }
    }

    /// Set the page size used when a request carries no `limit`.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set the tags returned by `list_tags`.
    pub fn with_tags(self, names: &[&str]) -> Self {
        {
            let mut guard = self.tags.lock().unwrap();
            *guard = names
                .iter()
                .enumerate()
                .map(|(i, name)| Tag {
                    id: Some(format!("tag-{i}")),
                    name: name.to_string(),
                })
                .collect();
        }
        self
    }

    /// Params of every `list` call so far.
    pub fn list_calls(&self) -> Vec<ListParams> {
        self.list_calls.lock().unwrap().clone()
    }

    /// ID and body of every successful `update` call so far.
    pub fn update_calls(&self) -> Vec<(String, UpdateDocumentRequest)> {
        self.update_calls.lock().unwrap().clone()
    }

    /// Current copy of a stored document.
    pub fn document(&self, id: &str) -> Option<Document> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    fn matches(doc: &Document, params: &ListParams) -> bool {
        if let Some(ref id) = params.id {
            if &doc.id != id {
                return false;
            }
        }
        if params.location.is_some() && doc.location != params.location {
            return false;
        }
        if params.category.is_some() && doc.category != params.category {
            return false;
        }
        if let Some(ref tag) = params.tag {
            if !doc.tag_names().iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(after) = params.updated_after.as_deref().and_then(parse_timestamp) {
            let updated = doc.updated_at.as_deref().and_then(parse_timestamp);
            if !updated.is_some_and(|u| u > after) {
                return false;
            }
        }
        true
    }

    fn not_found() -> ReaderError {
        ReaderError::Api {
            status: 404,
            status_text: "Not Found".to_string(),
            body: r#"{"detail":"Not found."}"#.to_string(),
        }
    }
}

#[async_trait]
impl ReaderApi for MockReader {
    async fn create_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> Result<ApiResponse<Document>, ReaderError> {
        let mut guard = self.documents.lock().unwrap();
        let id = format!("mock-{}", guard.len() + 1);
        let document = Document {
            id: id.clone(),
            url: format!("https://read.readwise.io/read/{id}"),
            source_url: Some(request.url.clone()),
            title: request.title.clone(),
            author: request.author.clone(),
            category: request.category.clone(),
            location: Some(request.location.clone().unwrap_or(Location::New)),
            tags: request.tags.clone().map(Tags::List),
            html_content: request.html.clone(),
            ..Default::default()
        };
        guard.push(document.clone());
        Ok(ApiResponse::new(document))
    }

    async fn list_documents(
        &self,
        params: &ListParams,
    ) -> Result<ApiResponse<ListingPage>, ReaderError> {
        self.list_calls.lock().unwrap().push(params.clone());

        let guard = self.documents.lock().unwrap();
        let matching: Vec<&Document> = guard.iter().filter(|d| Self::matches(d, params)).collect();

        let start = params
            .page_cursor
            .as_deref()
            .and_then(|c| c.parse::<usize>().ok())
            .unwrap_or(0)
            .min(matching.len());
        let take = params.limit.map(|l| l as usize).unwrap_or(self.page_size);
        let end = (start + take).min(matching.len());

        let results = matching[start..end]
            .iter()
            .map(|doc| {
                let mut doc = (*doc).clone();
                if !params.wants_html_content() {
                    doc.html_content = None;
                }
                if !params.wants_raw_source_url() {
                    doc.raw_source_url = None;
                }
                doc
            })
            .collect();

        Ok(ApiResponse::new(ListingPage {
            count: matching.len() as u64,
            next_page_cursor: (end < matching.len()).then(|| end.to_string()),
            results,
        }))
    }

    async fn update_document(
        &self,
        id: &str,
        request: &UpdateDocumentRequest,
    ) -> Result<ApiResponse<Document>, ReaderError> {
        let mut guard = self.documents.lock().unwrap();
        let doc = guard
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(Self::not_found)?;

        if let Some(ref title) = request.title {
            doc.title = Some(title.clone());
        }
        if let Some(ref author) = request.author {
            doc.author = Some(author.clone());
        }
        if let Some(ref summary) = request.summary {
            doc.summary = Some(summary.clone());
        }
        if let Some(ref location) = request.location {
            doc.location = Some(location.clone());
        }
        if let Some(ref category) = request.category {
            doc.category = Some(category.clone());
        }
        if let Some(ref tags) = request.tags {
            doc.tags = Some(Tags::List(tags.clone()));
        }

        self.update_calls
            .lock()
            .unwrap()
            .push((id.to_string(), request.clone()));
        Ok(ApiResponse::new(doc.clone()))
    }

    async fn delete_document(&self, id: &str) -> Result<ApiResponse<()>, ReaderError> {
        let mut guard = self.documents.lock().unwrap();
        let before = guard.len();
        guard.retain(|d| d.id != id);
        if guard.len() == before {
            return Err(Self::not_found());
        }
        Ok(ApiResponse::new(()))
    }

    async fn list_tags(&self) -> Result<ApiResponse<Vec<Tag>>, ReaderError> {
        Ok(ApiResponse::new(self.tags.lock().unwrap().clone()))
    }
}

/// Helper function to create a mock article for testing.
pub fn make_document(id: &str, title: &str) -> Document {
    Document {
        id: id.to_string(),
        url: format!("https://read.readwise.io/read/{id}"),
        source_url: Some(format!("https://example.com/{id}")),
        title: Some(title.to_string()),
        category: Some(Category::Article),
        location: Some(Location::New),
        tags: Some(Tags::List(Vec::new())),
        created_at: Some("2024-01-01T00:00:00+00:00".to_string()),
        updated_at: Some("2024-01-01T00:00:00+00:00".to_string()),
        saved_at: Some("2024-01-01T00:00:00+00:00".to_string()),
        ..Default::default()
    }
}
