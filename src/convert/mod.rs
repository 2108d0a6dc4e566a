//! Plain-text content resolution for documents.
//!
//! Articles and PDFs (and documents without a category) go through a remote
//! readability service, which copes with paywalls and PDFs far better than
//! local parsing. Everything else is extracted locally from the inline HTML
//! Reader already returned, or from the page fetched directly when no HTML is
//! at hand. Conversion never fails the caller: errors degrade to
//! [`CONTENT_UNAVAILABLE`].

mod html;

pub use html::extract_text_from_html;

use reqwest::header::ACCEPT;
use reqwest::Client;
use std::sync::Arc;

use crate::config::ContentConfig;
use crate::error::ReaderError;
use crate::models::{Category, Document};

/// Text substituted when conversion fails
pub const CONTENT_UNAVAILABLE: &str = "[Content unavailable - conversion error]";

/// Errors raised while converting; they never leave this module
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Readability conversion failed: {0}")]
    Readability(u16),

    #[error("HTML fetch failed: {0}")]
    Fetch(u16),
}

/// How a document's text will be obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStrategy {
    /// Remote readability extraction of the document URL
    Readability,
    /// Local extraction of the inline `html_content`
    InlineHtml,
    /// Direct fetch of the document URL, then local extraction
    FetchHtml,
}

impl ConversionStrategy {
    /// Pick the strategy for a document
    pub fn for_document(doc: &Document) -> Self {
        if prefers_readability(doc.category.as_ref()) {
            ConversionStrategy::Readability
        } else if doc.html_content.as_deref().is_some_and(|h| !h.is_empty()) {
            ConversionStrategy::InlineHtml
        } else {
            ConversionStrategy::FetchHtml
        }
    }
}

fn prefers_readability(category: Option<&Category>) -> bool {
    matches!(category, None | Some(Category::Article) | Some(Category::Pdf))
}

/// Resolves document text on demand
#[derive(Debug, Clone)]
pub struct ContentConverter {
    client: Arc<Client>,
    readability_base_url: String,
}

impl ContentConverter {
    /// Create a converter from content settings
    pub fn new(config: &ContentConfig) -> Result<Self, ReaderError> {
        let client = Client::builder().user_agent(&config.user_agent).build()?;
        Ok(Self {
            client: Arc::new(client),
            readability_base_url: config.readability_base_url.clone(),
        })
    }

    /// Plain text for a document; never fails
    pub async fn text_for(&self, doc: &Document) -> String {
        let strategy = ConversionStrategy::for_document(doc);
        tracing::debug!("Resolving content of {} via {:?}", doc.id, strategy);

        match strategy {
            ConversionStrategy::InlineHtml => {
                extract_text_from_html(doc.html_content.as_deref().unwrap_or_default())
            }
            ConversionStrategy::Readability => match doc.content_url() {
                Some(url) => recover(url, self.fetch_readable(url).await),
                None => String::new(),
            },
            ConversionStrategy::FetchHtml => match doc.content_url() {
                Some(url) => recover(url, self.fetch_and_extract(url).await),
                None => String::new(),
            },
        }
    }

    /// `GET {readability_base_url}{url}` as plain text
    pub async fn fetch_readable(&self, url: &str) -> Result<String, ConvertError> {
        let endpoint = format!("{}{}", self.readability_base_url, url);
        let response = self
            .client
            .get(&endpoint)
            .header(ACCEPT, "text/plain")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ConvertError::Readability(response.status().as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Fetch a page directly and extract its text locally
    pub async fn fetch_and_extract(&self, url: &str) -> Result<String, ConvertError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ConvertError::Fetch(response.status().as_u16()));
        }
        let html = response.text().await?;
        Ok(extract_text_from_html(&html))
    }
}

fn recover(url: &str, result: Result<String, ConvertError>) -> String {
    result.unwrap_or_else(|e| {
        tracing::warn!("Error converting {} to text: {}", url, e);
        CONTENT_UNAVAILABLE.to_string()
    })
}
