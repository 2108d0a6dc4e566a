//! Readwise Reader API client.
//!
//! [`ReaderApi`] is the seam every higher layer talks to. [`ReaderClient`] is
//! the HTTP implementation; [`MockReader`] serves an in-memory corpus for tests.
//!
//! Each operation maps to exactly one upstream request, except `list_tags`,
//! which follows the tag endpoint's own cursor. Listing documents returns a
//! single page; use [`pages`] or [`collect_all`] to walk the cursor chain.

mod http;
pub mod mock;
mod pages;

pub use http::ReaderClient;
pub use mock::MockReader;
pub use pages::{collect_all, pages};

use async_trait::async_trait;

use crate::error::ReaderError;
use crate::models::{
    ApiResponse, CreateDocumentRequest, Document, ListParams, ListingPage, Tag,
    UpdateDocumentRequest,
};

/// Operations offered by the upstream document service.
///
/// Ordinary upstream failures come back as [`ReaderError`] values mapped from
/// the HTTP status; nothing here retries.
#[async_trait]
pub trait ReaderApi: Send + Sync + std::fmt::Debug {
    /// `POST /save/`
    async fn create_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> Result<ApiResponse<Document>, ReaderError>;

    /// `GET /list/` for a single page
    async fn list_documents(
        &self,
        params: &ListParams,
    ) -> Result<ApiResponse<ListingPage>, ReaderError>;

    /// `PATCH /update/{id}/`
    async fn update_document(
        &self,
        id: &str,
        request: &UpdateDocumentRequest,
    ) -> Result<ApiResponse<Document>, ReaderError>;

    /// `DELETE /delete/{id}/`
    async fn delete_document(&self, id: &str) -> Result<ApiResponse<()>, ReaderError>;

    /// `GET /tags/`
    async fn list_tags(&self) -> Result<ApiResponse<Vec<Tag>>, ReaderError>;

    /// Look up a single document by ID
    async fn get_document(&self, id: &str) -> Result<ApiResponse<Document>, ReaderError> {
        let response = self.list_documents(&ListParams::new().id(id)).await?;
        let messages = response.messages;
        let document = response
            .data
            .results
            .into_iter()
            .find(|doc| doc.id == id)
            .ok_or_else(|| ReaderError::DocumentNotFound(id.to_string()))?;
        Ok(ApiResponse {
            data: document,
            messages,
        })
    }
}
