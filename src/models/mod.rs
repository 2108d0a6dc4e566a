//! Core data models for Reader documents, listing filters and response envelopes.

mod document;
mod envelope;
mod params;

pub use document::{
    extract_tags, parse_timestamp, Category, Document, Location, TagEntry, Tags,
};
pub use envelope::{append_messages, ApiMessage, ApiResponse, MessageType};
pub use params::{
    CreateDocumentRequest, ListParams, ListingPage, Tag, UpdateDocumentRequest,
};
