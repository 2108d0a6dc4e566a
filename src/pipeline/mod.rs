//! Document listing pipeline.
//!
//! A listing request runs through three stages that compose:
//!
//! 1. **Cost guard**: when full content is requested, a count-only request
//!    decides whether the match set must be cut to a small batch
//!    (see [`guard`]). A full `addedAfter` scan is budgeted after filtering
//!    instead.
//! 2. **`addedAfter` filtering**: evaluated locally, either over the full
//!    traversal or over the single requested page (see [`added_after`]).
//! 3. **Enrichment and projection**: content is resolved concurrently for
//!    the page and every document is projected to a [`DocumentView`].
//!
//! Upstream order is preserved throughout.

pub mod added_after;
pub mod guard;
mod projection;

pub use projection::{DocumentListing, DocumentView, ProjectionOptions};

use futures_util::future::join_all;
use std::sync::Arc;

use crate::client::ReaderApi;
use crate::convert::ContentConverter;
use crate::error::ReaderError;
use crate::models::{ApiResponse, Document, ListParams};

/// Runs listing requests against an API and a content converter
#[derive(Debug, Clone)]
pub struct DocumentLister {
    api: Arc<dyn ReaderApi>,
    converter: Arc<ContentConverter>,
    max_pages: usize,
}

impl DocumentLister {
    pub fn new(
        api: Arc<dyn ReaderApi>,
        converter: Arc<ContentConverter>,
        max_pages: usize,
    ) -> Self {
        Self {
            api,
            converter,
            max_pages,
        }
    }

    /// List documents matching `params`
    pub async fn list(
        &self,
        params: ListParams,
    ) -> Result<ApiResponse<DocumentListing>, ReaderError> {
        let mut params = params;
        let enrich = params.wants_full_content();
        if enrich {
            params.with_html_content = Some(true);
        }

        let added_after = params
            .added_after
            .take()
            .map(|raw| added_after::parse_added_after(&raw))
            .transpose()?;

        // A full addedAfter scan is budgeted on the filtered set without a count request.
        let full_scan = added_after.is_some() && !params.has_pagination_markers();

        let mut messages = Vec::new();

        if enrich && !full_scan {
            let budget = guard::check_content_budget(self.api.as_ref(), &params).await?;
            if let Some(limit) = budget.limit {
                params.limit = Some(params.limit.map_or(limit, |l| l.min(limit)));
            }
            messages.extend(budget.message);
        }

        let mut page = match added_after {
            Some(after) => {
                let api = self.api.as_ref();
                added_after::list_added_after(api, params.clone(), after, self.max_pages).await?
            }
            None => self.api.list_documents(&params).await?,
        };

        if enrich && full_scan {
            let budget = guard::ContentBudget::for_count(page.data.results.len() as u64);
            budget.truncate(&mut page.data.results);
            messages.extend(budget.message);
        }
        messages.extend(page.messages);

        let options = ProjectionOptions {
            raw_source_url: params.wants_raw_source_url(),
            html_content: params.wants_html_content(),
        };
        let documents = self.project_all(page.data.results, enrich, options).await;

        Ok(ApiResponse {
            data: DocumentListing {
                count: page.data.count,
                next_page_cursor: page.data.next_page_cursor,
                documents,
            },
            messages,
        })
    }

    /// Enrich concurrently, then project in input order
    async fn project_all(
        &self,
        documents: Vec<Document>,
        enrich: bool,
        options: ProjectionOptions,
    ) -> Vec<DocumentView> {
        let contents = if enrich {
            join_all(documents.iter().map(|doc| self.converter.text_for(doc)))
                .await
                .into_iter()
                .map(Some)
                .collect()
        } else {
            vec![None; documents.len()]
        };

        documents
            .into_iter()
            .zip(contents)
            .map(|(doc, content)| DocumentView::project(doc, content, options))
            .collect()
    }
}
