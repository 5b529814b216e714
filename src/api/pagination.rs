// src/api/pagination.rs
//! Cursor pagination: drain a remote paged collection into one sequence.

use crate::error::AppError;
use serde::Deserialize;

/// Generic paginated response from the Notion API.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedResponse<T> {
    pub results: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Result of draining a paginated endpoint.
#[derive(Debug, Clone)]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub total_fetched: usize,
}

/// Fetches all pages of a cursor-paginated endpoint.
///
/// Calls `fetch_fn(page_size, None)` for the first page, then follows
/// continuation cursors until the endpoint reports no more results.
/// Items are concatenated in fetch order; no deduplication happens here
/// (callers deduplicate). Errors from `fetch_fn` propagate unchanged —
/// retry belongs to the transport, not the drain.
pub async fn fetch_all_pages<T, F, Fut>(
    mut fetch_fn: F,
    page_size: u32,
    max_pages: Option<u32>,
) -> Result<PaginationResult<T>, AppError>
where
    T: Send + 'static,
    F: FnMut(u32, Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<PaginatedResponse<T>, AppError>>,
{
    let mut all_items = Vec::new();
    let mut cursor = None;
    let mut pages_fetched = 0u32;

    loop {
        // Check if we've reached the page limit
        if let Some(max) = max_pages {
            if pages_fetched >= max {
                log::debug!("Reached maximum page limit: {}", max);
                break;
            }
        }

        // Fetch the next page
        let response = fetch_fn(page_size, cursor).await?;

        let has_more = response.has_more;
        cursor = response.next_cursor.clone();
        all_items.extend(response.results);
        pages_fetched += 1;

        if !has_more || cursor.is_none() {
            break;
        }
    }

    Ok(PaginationResult {
        total_fetched: all_items.len(),
        items: all_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Serves `items` in chunks of `chunk`, cursor = next start index.
    fn paged_source(items: Vec<u32>, chunk: usize) -> impl FnMut(u32, Option<String>) -> std::future::Ready<Result<PaginatedResponse<u32>, AppError>> {
        move |_page_size, cursor| {
            let start: usize = cursor.as_deref().map_or(0, |c| c.parse().unwrap());
            let end = (start + chunk).min(items.len());
            let has_more = end < items.len();
            std::future::ready(Ok(PaginatedResponse {
                results: items[start..end].to_vec(),
                next_cursor: has_more.then(|| end.to_string()),
                has_more,
            }))
        }
    }

    #[tokio::test]
    async fn drains_all_pages_in_order() {
        let result = fetch_all_pages(paged_source((0..10).collect(), 3), 3, None)
            .await
            .unwrap();
        assert_eq!(result.items, (0..10).collect::<Vec<_>>());
        assert_eq!(result.total_fetched, 10);
    }

    #[tokio::test]
    async fn single_page_stops_without_cursor() {
        let result = fetch_all_pages(paged_source(vec![1, 2], 100), 100, None)
            .await
            .unwrap();
        assert_eq!(result.items, vec![1, 2]);
    }

    #[tokio::test]
    async fn empty_collection_yields_empty_result() {
        let result = fetch_all_pages(paged_source(vec![], 100), 100, None)
            .await
            .unwrap();
        assert!(result.items.is_empty());
    }

    #[tokio::test]
    async fn respects_max_pages_bound() {
        let result = fetch_all_pages(paged_source((0..10).collect(), 3), 3, Some(2))
            .await
            .unwrap();
        assert_eq!(result.items, vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn propagates_fetch_errors_unchanged() {
        let result: Result<PaginationResult<u32>, _> = fetch_all_pages(
            |_, _| std::future::ready(Err(AppError::MalformedResponse("bad page".to_string()))),
            100,
            None,
        )
        .await;
        assert!(matches!(result, Err(AppError::MalformedResponse(_))));
    }
}
