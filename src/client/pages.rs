//! Cursor-driven traversal of the `list` endpoint.

use async_stream::try_stream;
use futures_util::{pin_mut, Stream, TryStreamExt};

use super::ReaderApi;
use crate::error::ReaderError;
use crate::models::{ApiMessage, ApiResponse, Document, ListParams, ListingPage};

/// Lazily walk every page matching `params`, starting at its `page_cursor`.
///
/// Pages are fetched strictly one after another since each cursor comes from
/// the previous page. Calling again with the same params restarts the walk.
/// The stream fails with [`ReaderError::PageLimitExceeded`] once `max_pages`
/// pages have been read and the upstream still hands out a cursor.
pub fn pages<'a>(
    api: &'a dyn ReaderApi,
    params: ListParams,
    max_pages: usize,
) -> impl Stream<Item = Result<ApiResponse<ListingPage>, ReaderError>> + 'a {
    try_stream! {
        let mut params = params;
        let mut fetched = 0usize;

        loop {
            if fetched >= max_pages {
                tracing::warn!("Cursor chain still open after {} pages", max_pages);
                Err::<(), _>(ReaderError::PageLimitExceeded(max_pages))?;
            }

            let page = api.list_documents(&params).await?;
            fetched += 1;

            let next = page
                .data
                .next_page_cursor
                .clone()
                .filter(|cursor| !cursor.is_empty());
            tracing::debug!(
                "Fetched page {} with {} documents (more: {})",
                fetched,
                page.data.results.len(),
                next.is_some()
            );

            yield page;

            match next {
                Some(cursor) => params.page_cursor = Some(cursor),
                None => break,
            }
        }
    }
}

/// Materialize every document of the traversal, in upstream order
pub async fn collect_all(
    api: &dyn ReaderApi,
    params: ListParams,
    max_pages: usize,
) -> Result<ApiResponse<Vec<Document>>, ReaderError> {
    let stream = pages(api, params, max_pages);
    pin_mut!(stream);

    let mut documents = Vec::new();
    let mut messages: Vec<ApiMessage> = Vec::new();
    while let Some(page) = stream.try_next().await? {
        documents.extend(page.data.results);
        messages.extend(page.messages);
    }

    Ok(ApiResponse { data: documents, messages })
}
