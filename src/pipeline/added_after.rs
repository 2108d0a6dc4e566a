//! Client-side `addedAfter` filtering; upstream has no such filter.

use chrono::{DateTime, Utc};

use crate::client::{collect_all, ReaderApi};
use crate::error::ReaderError;
use crate::models::{parse_timestamp, ApiMessage, ApiResponse, Document, ListParams, ListingPage};

pub const FULL_SCAN_MESSAGE: &str = "Documents were filtered client-side based on the addedAfter date. \
All documents were fetched from the API first, then filtered by their saved_at date.";

pub const PAGE_SCAN_MESSAGE: &str = "Documents on this page were filtered client-side based on the addedAfter date. \
count and nextPageCursor describe the unfiltered page.";

/// Parse the user-supplied `addedAfter` bound
pub fn parse_added_after(raw: &str) -> Result<DateTime<Utc>, ReaderError> {
    parse_timestamp(raw).ok_or_else(|| {
        ReaderError::InvalidArgument(format!(
            "addedAfter must be an ISO 8601 date or timestamp, got '{}'",
            raw
        ))
    })
}

/// Keep documents saved strictly after `after`, preserving order.
/// Documents without a parseable `saved_at` are dropped.
pub fn filter_added_after(documents: Vec<Document>, after: DateTime<Utc>) -> Vec<Document> {
    documents
        .into_iter()
        .filter(|doc| doc.saved_at_time().is_some_and(|saved| saved > after))
        .collect()
}

/// List documents saved after `after`.
///
/// Without `pageCursor`/`limit` the whole filtered set is fetched and filtered.
/// With either marker only the requested page is filtered, and its upstream
/// count and cursor are passed through as-is.
pub async fn list_added_after(
    api: &dyn ReaderApi,
    params: ListParams,
    after: DateTime<Utc>,
    max_pages: usize,
) -> Result<ApiResponse<ListingPage>, ReaderError> {
    debug_assert!(params.added_after.is_none());

    if params.has_pagination_markers() {
        let mut page = api.list_documents(&params).await?;
        page.data.results = filter_added_after(std::mem::take(&mut page.data.results), after);
        return Ok(page.with_message(ApiMessage::info(PAGE_SCAN_MESSAGE)));
    }

    let all = collect_all(api, params, max_pages).await?;
    let results = filter_added_after(all.data, after);
    tracing::debug!("{} documents saved after {}", results.len(), after);

    Ok(ApiResponse {
        data: ListingPage {
            count: results.len() as u64,
            next_page_cursor: None,
            results,
        },
        messages: all.messages,
    }
    .with_message(ApiMessage::info(FULL_SCAN_MESSAGE)))
}
