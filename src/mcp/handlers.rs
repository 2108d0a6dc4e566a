//! Tool handlers: argument decoding, dispatch to the core and text rendering.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tools::ToolHandler;
use crate::client::{ReaderApi, ReaderClient};
use crate::config::Config;
use crate::convert::ContentConverter;
use crate::error::ReaderError;
use crate::models::{append_messages, CreateDocumentRequest, ListParams, UpdateDocumentRequest};
use crate::pipeline::{DocumentLister, DocumentView, ProjectionOptions};
use crate::search::search_documents_by_topic;
use crate::tags::{bulk_update_tags, update_document_tags, TagUpdateMode};

/// Shared state handed to every handler.
///
/// The upstream client is built once. When no token is configured it is
/// absent and every handler that needs it fails with
/// [`ReaderError::MissingToken`] before touching the network.
#[derive(Debug, Clone)]
pub struct ToolContext {
    client: Option<Arc<dyn ReaderApi>>,
    converter: Arc<ContentConverter>,
    max_pages: usize,
}

impl ToolContext {
    pub fn new(
        client: Option<Arc<dyn ReaderApi>>,
        converter: Arc<ContentConverter>,
        max_pages: usize,
    ) -> Self {
        Self {
            client,
            converter,
            max_pages,
        }
    }

    /// Build the context from configuration; a missing token is not fatal here
    pub fn from_config(config: &Config) -> Result<Self, ReaderError> {
        let client: Option<Arc<dyn ReaderApi>> = match ReaderClient::from_config(config) {
            Ok(client) => Some(Arc::new(client)),
            Err(ReaderError::MissingToken) => {
                tracing::warn!("No Readwise token configured, tool calls will fail");
                None
            }
            Err(e) => return Err(e),
        };
        let converter = ContentConverter::new(&config.content)?;
        Ok(Self::new(
            client,
            Arc::new(converter),
            config.pagination.max_pages,
        ))
    }

    pub fn client(&self) -> Result<&dyn ReaderApi, ReaderError> {
        self.client.as_deref().ok_or(ReaderError::MissingToken)
    }

    fn lister(&self) -> Result<DocumentLister, ReaderError> {
        let client = self.client.clone().ok_or(ReaderError::MissingToken)?;
        Ok(DocumentLister::new(
            client,
            self.converter.clone(),
            self.max_pages,
        ))
    }
}

/// Decode tool arguments; a missing argument object counts as empty
fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ReaderError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ReaderError::InvalidArgument(e.to_string()))
}

fn pretty<T: Serialize>(value: &T) -> Result<String, ReaderError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// `readwise_save_document`
#[derive(Debug)]
pub struct SaveDocumentHandler {
    pub ctx: ToolContext,
}

#[async_trait::async_trait]
impl ToolHandler for SaveDocumentHandler {
    async fn execute(&self, args: Value) -> Result<String, ReaderError> {
        let request: CreateDocumentRequest = parse_args(args)?;
        let response = self.ctx.client()?.create_document(&request).await?;
        let doc = &response.data;

        let mut text = format!(
            "Document saved successfully!\nID: {}\nTitle: {}\nURL: {}\nLocation: {}",
            doc.id,
            doc.title.as_deref().unwrap_or("Untitled"),
            doc.url,
            doc.location.as_ref().map_or("new", |l| l.as_str()),
        );
        append_messages(&mut text, &response.messages);
        Ok(text)
    }
}

/// `readwise_list_documents`
#[derive(Debug)]
pub struct ListDocumentsHandler {
    pub ctx: ToolContext,
}

#[async_trait::async_trait]
impl ToolHandler for ListDocumentsHandler {
    async fn execute(&self, args: Value) -> Result<String, ReaderError> {
        let params: ListParams = parse_args(args)?;
        let response = self.ctx.lister()?.list(params).await?;

        let mut text = pretty(&response.data)?;
        append_messages(&mut text, &response.messages);
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct UpdateArgs {
    id: String,
    #[serde(flatten)]
    changes: UpdateDocumentRequest,
}

/// `readwise_update_document`
#[derive(Debug)]
pub struct UpdateDocumentHandler {
    pub ctx: ToolContext,
}

#[async_trait::async_trait]
impl ToolHandler for UpdateDocumentHandler {
    async fn execute(&self, args: Value) -> Result<String, ReaderError> {
        let UpdateArgs { id, changes } = parse_args(args)?;
        let response = self.ctx.client()?.update_document(&id, &changes).await?;

        let mut text = format!(
            "Document updated successfully!\nID: {}\nReader URL: {}",
            response.data.id, response.data.url
        );
        append_messages(&mut text, &response.messages);
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct IdArgs {
    id: String,
}

/// `readwise_delete_document`
#[derive(Debug)]
pub struct DeleteDocumentHandler {
    pub ctx: ToolContext,
}

#[async_trait::async_trait]
impl ToolHandler for DeleteDocumentHandler {
    async fn execute(&self, args: Value) -> Result<String, ReaderError> {
        let IdArgs { id } = parse_args(args)?;
        let response = self.ctx.client()?.delete_document(&id).await?;

        let mut text = format!("Document {} deleted successfully!", id);
        append_messages(&mut text, &response.messages);
        Ok(text)
    }
}

/// `readwise_list_tags`
#[derive(Debug)]
pub struct ListTagsHandler {
    pub ctx: ToolContext,
}

#[async_trait::async_trait]
impl ToolHandler for ListTagsHandler {
    async fn execute(&self, _args: Value) -> Result<String, ReaderError> {
        let response = self.ctx.client()?.list_tags().await?;

        let lines: Vec<String> = response
            .data
            .iter()
            .map(|tag| format!("- {}", tag.name))
            .collect();
        let mut text = format!("Available tags:\n{}", lines.join("\n"));
        append_messages(&mut text, &response.messages);
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicSearchArgs {
    search_terms: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TopicSearchResult<'a> {
    search_terms: &'a [String],
    total_matches: usize,
    documents: Vec<DocumentView>,
}

/// `readwise_topic_search`
#[derive(Debug)]
pub struct TopicSearchHandler {
    pub ctx: ToolContext,
}

#[async_trait::async_trait]
impl ToolHandler for TopicSearchHandler {
    async fn execute(&self, args: Value) -> Result<String, ReaderError> {
        let TopicSearchArgs { search_terms } = parse_args(args)?;
        let response =
            search_documents_by_topic(self.ctx.client()?, &search_terms, self.ctx.max_pages)
                .await?;

        let documents: Vec<DocumentView> = response
            .data
            .into_iter()
            .map(|doc| DocumentView::project(doc, None, ProjectionOptions::default()))
            .collect();
        let result = TopicSearchResult {
            search_terms: &search_terms,
            total_matches: documents.len(),
            documents,
        };

        let mut text = pretty(&result)?;
        append_messages(&mut text, &response.messages);
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct DocumentTagsArgs {
    id: String,
    tags: Vec<String>,
    #[serde(default)]
    mode: TagUpdateMode,
}

/// `readwise_update_document_tags`
#[derive(Debug)]
pub struct UpdateDocumentTagsHandler {
    pub ctx: ToolContext,
}

#[async_trait::async_trait]
impl ToolHandler for UpdateDocumentTagsHandler {
    async fn execute(&self, args: Value) -> Result<String, ReaderError> {
        let DocumentTagsArgs { id, tags, mode } = parse_args(args)?;
        let response = update_document_tags(self.ctx.client()?, &id, &tags, mode).await?;

        let mut text = format!(
            "Document tags updated successfully!\nID: {}\nMode: {}\nTags: {}",
            response.data.id,
            mode,
            response.data.tag_names().join(", ")
        );
        append_messages(&mut text, &response.messages);
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct BulkTagsArgs {
    ids: Vec<String>,
    tags: Vec<String>,
    #[serde(default)]
    mode: TagUpdateMode,
}

/// `readwise_bulk_update_tags`
#[derive(Debug)]
pub struct BulkUpdateTagsHandler {
    pub ctx: ToolContext,
}

#[async_trait::async_trait]
impl ToolHandler for BulkUpdateTagsHandler {
    async fn execute(&self, args: Value) -> Result<String, ReaderError> {
        let BulkTagsArgs { ids, tags, mode } = parse_args(args)?;
        let report = bulk_update_tags(self.ctx.client()?, &ids, &tags, mode).await;
        pretty(&report)
    }
}
