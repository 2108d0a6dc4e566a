//! # Readwise Reader MCP
//!
//! A Model Context Protocol (MCP) server exposing a Readwise Reader library
//! (save, list, update and delete documents, list tags, topic search and tag
//! updates) as tools for an LLM agent.
//!
//! ## Architecture
//!
//! - [`models`]: documents, listing filters, request bodies and the response envelope
//! - [`client`]: the Reader REST client behind the [`client::ReaderApi`] trait, plus paging
//! - [`convert`]: plain-text content resolution (readability service or local extraction)
//! - [`pipeline`]: the listing pipeline (cost guard, `addedAfter`, enrichment, projection)
//! - [`search`]: topic search over the whole library
//! - [`tags`]: tag replace/add helpers and the bulk variant
//! - [`mcp`]: tool registry, handlers and the pmcp server
//! - [`config`]: layered configuration
//! - [`error`]: the crate-wide error type

pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod mcp;
pub mod models;
pub mod pipeline;
pub mod search;
pub mod tags;

// Re-export commonly used types
pub use client::{ReaderApi, ReaderClient};
pub use error::ReaderError;
pub use models::{ApiResponse, Document, ListParams};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
