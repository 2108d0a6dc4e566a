//! HTTP implementation of [`ReaderApi`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use super::ReaderApi;
use crate::config::{Config, USER_AGENT};
use crate::error::ReaderError;
use crate::models::{
    ApiMessage, ApiResponse, CreateDocumentRequest, Document, ListParams, ListingPage, Tag,
    UpdateDocumentRequest,
};

/// Seconds to wait when a 429 carries no usable `Retry-After`
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Guard on the tag endpoint's own cursor chain
const MAX_TAG_PAGES: usize = 100;

/// Client for the Reader v3 REST API
///
/// Holds the credential and a shared connection pool; cheap to clone.
#[derive(Debug, Clone)]
pub struct ReaderClient {
    client: Arc<Client>,
    base_url: Url,
    token: String,
}

impl ReaderClient {
    /// Create a client against the production API
    pub fn new(token: impl Into<String>) -> Result<Self, ReaderError> {
        Self::with_base_url(token, &Config::default().api.base_url)
    }

    /// Create a client against a custom base URL
    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> Result<Self, ReaderError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ReaderError::MissingToken);
        }

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ReaderError::Config(format!("Invalid API base URL '{}': {}", base_url, e)))?;

        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
            token,
        })
    }

    /// Build a client from configuration; fails when no token is configured
    pub fn from_config(config: &Config) -> Result<Self, ReaderError> {
        let token = config.token().ok_or(ReaderError::MissingToken)?;
        Self::with_base_url(token, &config.api.base_url)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .header(ACCEPT, "application/json")
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ReaderError> {
        let response = self.authorized(builder).send().await?;
        check_status(response).await
    }
}

/// Map an upstream response to success or a typed error
async fn check_status(response: Response) -> Result<Response, ReaderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = retry_after_seconds(response.headers());
        tracing::warn!("Readwise rate limit hit, retry after {}s", retry_after);
        return Err(ReaderError::RateLimited { retry_after });
    }

    let status_text = status.canonical_reason().unwrap_or("").to_string();
    let body = response.text().await.unwrap_or_default();
    Err(ReaderError::Api {
        status: status.as_u16(),
        status_text,
        body,
    })
}

/// Seconds from a `Retry-After` header, defaulting when absent or non-numeric
pub fn retry_after_seconds(headers: &HeaderMap) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ReaderError> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// The tag endpoint has answered both as a bare array and as a page object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagsPayload {
    List(Vec<Tag>),
    Page {
        results: Vec<Tag>,
        #[serde(default, rename = "nextPageCursor", alias = "next_page_cursor")]
        next_page_cursor: Option<String>,
    },
}

#[async_trait]
impl ReaderApi for ReaderClient {
    async fn create_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> Result<ApiResponse<Document>, ReaderError> {
        tracing::debug!("Saving document {}", request.url);
        let response = self
            .send(self.client.post(self.endpoint("/save/")).json(request))
            .await?;
        Ok(ApiResponse::new(decode(response).await?))
    }

    async fn list_documents(
        &self,
        params: &ListParams,
    ) -> Result<ApiResponse<ListingPage>, ReaderError> {
        let query = params.query_pairs();
        tracing::debug!("Listing documents with {:?}", query);
        let response = self
            .send(self.client.get(self.endpoint("/list/")).query(&query))
            .await?;
        Ok(ApiResponse::new(decode(response).await?))
    }

    async fn update_document(
        &self,
        id: &str,
        request: &UpdateDocumentRequest,
    ) -> Result<ApiResponse<Document>, ReaderError> {
        let path = format!("/update/{}/", urlencoding::encode(id));
        tracing::debug!("Updating document {}", id);
        let response = self
            .send(self.client.patch(self.endpoint(&path)).json(request))
            .await?;
        Ok(ApiResponse::new(decode(response).await?))
    }

    async fn delete_document(&self, id: &str) -> Result<ApiResponse<()>, ReaderError> {
        let path = format!("/delete/{}/", urlencoding::encode(id));
        tracing::debug!("Deleting document {}", id);
        self.send(self.client.delete(self.endpoint(&path))).await?;
        Ok(ApiResponse::new(()))
    }

    async fn list_tags(&self) -> Result<ApiResponse<Vec<Tag>>, ReaderError> {
        let mut tags = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_TAG_PAGES {
            let mut builder = self.client.get(self.endpoint("/tags/"));
            if let Some(ref c) = cursor {
                builder = builder.query(&[("pageCursor", c.as_str())]);
            }

            match decode::<TagsPayload>(self.send(builder).await?).await? {
                TagsPayload::List(page) => {
                    tags.extend(page);
                    return Ok(ApiResponse::new(tags));
                }
                TagsPayload::Page {
                    results,
                    next_page_cursor,
                } => {
                    tags.extend(results);
                    match next_page_cursor {
                        Some(next) if !next.is_empty() => cursor = Some(next),
                        _ => return Ok(ApiResponse::new(tags)),
                    }
                }
            }
        }

        tracing::warn!("Tag listing stopped after {} pages", MAX_TAG_PAGES);
        Ok(ApiResponse::new(tags).with_message(ApiMessage::warning(format!(
            "Tag listing was truncated after {} pages.",
            MAX_TAG_PAGES
        ))))
    }
}
