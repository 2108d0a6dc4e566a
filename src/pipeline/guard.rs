//! Cost guard for full-content listings.

use crate::client::ReaderApi;
use crate::error::ReaderError;
use crate::models::{ApiMessage, ListParams};

/// Documents enriched per request when the match set is too large
pub const FULL_CONTENT_BATCH: u32 = 5;

/// Beyond this many matches, full content is reported as unsupported
pub const FULL_CONTENT_MAX_MATCHES: u64 = 20;

/// Outcome of the count-only request
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBudget {
    /// Total matches for the filter
    pub count: u64,
    /// Page size to impose, if the set must be truncated
    pub limit: Option<u32>,
    /// Advisory to attach to the response
    pub message: Option<ApiMessage>,
}

impl ContentBudget {
    /// Decide the budget for a given match count
    pub fn for_count(count: u64) -> Self {
        let batch = u64::from(FULL_CONTENT_BATCH);
        if count <= batch {
            return Self {
                count,
                limit: None,
                message: None,
            };
        }

        let message = if count <= FULL_CONTENT_MAX_MATCHES {
            ApiMessage::info(format!(
                "Found {count} documents matching your query. Full content was fetched for the first {batch} only. \
                 Narrow the query with filters like location, category, tag or updatedAfter, \
                 or fetch the remaining documents individually by ID."
            ))
        } else {
            ApiMessage::error(format!(
                "Found {count} documents matching your query. Full content is not supported for more than \
                 {FULL_CONTENT_MAX_MATCHES} matching documents; only the first {batch} were returned with content. \
                 Please use more specific filters to reduce the number of matches."
            ))
        };

        Self {
            count,
            limit: Some(FULL_CONTENT_BATCH),
            message: Some(message),
        }
    }

    /// Cut an already-fetched match set down to the batch size
    pub fn truncate<T>(&self, items: &mut Vec<T>) {
        if let Some(limit) = self.limit {
            items.truncate(limit as usize);
        }
    }
}

/// Count matches without any content flags, then size the request
pub async fn check_content_budget(
    api: &dyn ReaderApi,
    params: &ListParams,
) -> Result<ContentBudget, ReaderError> {
    let mut count_params = params.clone();
    count_params.with_full_content = None;
    count_params.with_html_content = None;
    count_params.added_after = None;

    let response = api.list_documents(&count_params).await?;
    let budget = ContentBudget::for_count(response.data.count);
    tracing::debug!(
        "Full content requested for {} matches (limit: {:?})",
        budget.count,
        budget.limit
    );
    Ok(budget)
}
