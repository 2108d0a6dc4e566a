//! Tool registry for MCP tools.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};

use super::handlers::{
    BulkUpdateTagsHandler, DeleteDocumentHandler, ListDocumentsHandler, ListTagsHandler,
    SaveDocumentHandler, ToolContext, TopicSearchHandler, UpdateDocumentHandler,
    UpdateDocumentTagsHandler,
};
use crate::error::ReaderError;

const LOCATIONS: [&str; 5] = ["new", "later", "shortlist", "archive", "feed"];

const CATEGORIES: [&str; 9] = [
    "article", "email", "rss", "highlight", "note", "pdf", "epub", "tweet", "video",
];

/// An MCP tool that can be called by the client
#[derive(Clone)]
pub struct Tool {
    /// Tool name (e.g., "readwise_list_documents")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: Value,

    /// Handler function to execute the tool
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish()
    }
}

/// Handler for executing a tool
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync + std::fmt::Debug {
    /// Execute the tool and render its text output
    async fn execute(&self, args: Value) -> Result<String, ReaderError>;
}

/// Text block returned for one tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResponse {
    pub text: String,
    pub is_error: bool,
}

impl ToolResponse {
    pub fn success(text: String) -> Self {
        Self {
            text,
            is_error: false,
        }
    }

    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            text: format!("Error: {}", message),
            is_error: true,
        }
    }
}

/// Registry for all MCP tools
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Tool>,
}

impl ToolRegistry {
    /// Create a registry with every Reader tool bound to `ctx`
    pub fn new(ctx: ToolContext) -> Self {
        let mut registry = Self {
            tools: BTreeMap::new(),
        };
        registry.register_reader_tools(ctx);
        registry
    }

    fn register_reader_tools(&mut self, ctx: ToolContext) {
        self.register(Tool {
            name: "readwise_save_document".to_string(),
            description: "Save a document (URL or HTML content) to Readwise Reader".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "URL of the document to save"
                    },
                    "html": {
                        "type": "string",
                        "description": "HTML content of the document (optional)"
                    },
                    "title": {
                        "type": "string",
                        "description": "Title override"
                    },
                    "author": {
                        "type": "string",
                        "description": "Author override"
                    },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Tags to add to the document"
                    },
                    "location": {
                        "type": "string",
                        "enum": LOCATIONS,
                        "description": "Location to save the document (default: new)"
                    },
                    "category": {
                        "type": "string",
                        "enum": CATEGORIES,
                        "description": "Category of the document (auto-detected if not specified)"
                    }
                },
                "required": ["url"],
                "additionalProperties": false
            }),
            handler: Arc::new(SaveDocumentHandler { ctx: ctx.clone() }),
        });

        self.register(Tool {
            name: "readwise_list_documents".to_string(),
            description: "List documents from Readwise Reader with optional filtering".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "Filter by specific document ID"
                    },
                    "updatedAfter": {
                        "type": "string",
                        "description": "Filter documents updated after this date (ISO 8601)"
                    },
                    "addedAfter": {
                        "type": "string",
                        "description": "Filter documents added after this date (ISO 8601). Filtering happens client-side: without pageCursor or limit every page is fetched first."
                    },
                    "location": {
                        "type": "string",
                        "enum": LOCATIONS,
                        "description": "Filter by document location"
                    },
                    "category": {
                        "type": "string",
                        "enum": CATEGORIES,
                        "description": "Filter by document category"
                    },
                    "tag": {
                        "type": "string",
                        "description": "Filter by tag name"
                    },
                    "pageCursor": {
                        "type": "string",
                        "description": "Page cursor for pagination"
                    },
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Maximum number of documents per page"
                    },
                    "withHtmlContent": {
                        "type": "boolean",
                        "description": "Include HTML content in the response. This significantly slows down the API; only use when raw HTML is needed."
                    },
                    "withRawSourceUrl": {
                        "type": "boolean",
                        "description": "Include the raw source URL of each document"
                    },
                    "withFullContent": {
                        "type": "boolean",
                        "description": "Include full converted text content. Each document's content is fetched and converted, so this is slow; at most 5 documents are enriched per call. Default: false."
                    }
                },
                "additionalProperties": false
            }),
            handler: Arc::new(ListDocumentsHandler { ctx: ctx.clone() }),
        });

        self.register(Tool {
            name: "readwise_update_document".to_string(),
            description: "Update a document in Readwise Reader".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "Document ID to update"
                    },
                    "title": {
                        "type": "string",
                        "description": "New title for the document"
                    },
                    "author": {
                        "type": "string",
                        "description": "New author for the document"
                    },
                    "summary": {
                        "type": "string",
                        "description": "New summary for the document"
                    },
                    "published_date": {
                        "type": "string",
                        "description": "New published date (ISO 8601)"
                    },
                    "image_url": {
                        "type": "string",
                        "description": "New image URL for the document"
                    },
                    "location": {
                        "type": "string",
                        "enum": LOCATIONS,
                        "description": "New location for the document"
                    },
                    "category": {
                        "type": "string",
                        "enum": CATEGORIES,
                        "description": "New category for the document"
                    }
                },
                "required": ["id"],
                "additionalProperties": false
            }),
            handler: Arc::new(UpdateDocumentHandler { ctx: ctx.clone() }),
        });

        self.register(Tool {
            name: "readwise_delete_document".to_string(),
            description: "Delete a document from Readwise Reader".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "Document ID to delete"
                    }
                },
                "required": ["id"],
                "additionalProperties": false
            }),
            handler: Arc::new(DeleteDocumentHandler { ctx: ctx.clone() }),
        });

        self.register(Tool {
            name: "readwise_list_tags".to_string(),
            description: "List all tags from Readwise Reader".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
            handler: Arc::new(ListTagsHandler { ctx: ctx.clone() }),
        });

        self.register(Tool {
            name: "readwise_topic_search".to_string(),
            description: "Search documents in Readwise Reader by topic, matching terms case-insensitively against title, summary, notes and tags".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "searchTerms": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": 1,
                        "description": "Terms to look for; each is matched literally and case-insensitively"
                    }
                },
                "required": ["searchTerms"],
                "additionalProperties": false
            }),
            handler: Arc::new(TopicSearchHandler { ctx: ctx.clone() }),
        });

        self.register(Tool {
            name: "readwise_update_document_tags".to_string(),
            description: "Replace or extend the tags of a single document".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "Document ID"
                    },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Tags to apply"
                    },
                    "mode": {
                        "type": "string",
                        "enum": ["add", "replace"],
                        "default": "add",
                        "description": "'add' keeps existing tags, 'replace' overwrites them"
                    }
                },
                "required": ["id", "tags"],
                "additionalProperties": false
            }),
            handler: Arc::new(UpdateDocumentTagsHandler { ctx: ctx.clone() }),
        });

        self.register(Tool {
            name: "readwise_bulk_update_tags".to_string(),
            description: "Apply the same tag change to several documents; failures are reported per document".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "ids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": 1,
                        "description": "Document IDs"
                    },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Tags to apply"
                    },
                    "mode": {
                        "type": "string",
                        "enum": ["add", "replace"],
                        "default": "add",
                        "description": "'add' keeps existing tags, 'replace' overwrites them"
                    }
                },
                "required": ["ids", "tags"],
                "additionalProperties": false
            }),
            handler: Arc::new(BulkUpdateTagsHandler { ctx }),
        });
    }

    /// Register a tool
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get all tools, ordered by name
    pub fn all(&self) -> Vec<&Tool> {
        self.tools.values().collect()
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, args: Value) -> Result<String, ReaderError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ReaderError::InvalidArgument(format!("Unknown tool: {}", name)))?;

        tracing::debug!("Calling tool {}", name);
        tool.handler.execute(args).await
    }

    /// Execute a tool and render the outcome as a single text block
    pub async fn call(&self, name: &str, args: Value) -> ToolResponse {
        match self.execute(name, args).await {
            Ok(text) => ToolResponse::success(text),
            Err(e) => {
                tracing::debug!("Tool {} failed: {}", name, e);
                ToolResponse::error(e)
            }
        }
    }
}
