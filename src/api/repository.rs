// src/api/repository.rs
//! Domain-level access to workspace resources.
//!
//! Layers two things on top of the wire trait: cursor drains (every
//! "get all X" here is a full drain of a paginated endpoint) and
//! absence normalization — `object_not_found` means the crawling
//! principal lost access to the target, which is an expected state of
//! the workspace, not a failure of the crawl.

use super::pagination::fetch_all_pages;
use super::NotionRepository;
use crate::constants::BLOCKS_PER_PAGE_ESTIMATE;
use crate::error::AppError;
use crate::model::{Block, Database, Page, ResourceRef};
use crate::types::NotionId;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Repository over a workspace, normalizing not-found into absence.
#[derive(Clone)]
pub struct ResourceRepository {
    client: Arc<dyn NotionRepository>,
    page_size: u32,
    concurrency: usize,
}

impl ResourceRepository {
    pub fn new(client: Arc<dyn NotionRepository>, page_size: u32, concurrency: usize) -> Self {
        Self {
            client,
            page_size,
            concurrency,
        }
    }

    /// The fan-out width shared with the crawler.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Retrieves one page; absent if it no longer exists or access was
    /// revoked.
    pub async fn get_page(&self, id: &NotionId) -> Result<Option<Page>, AppError> {
        normalize_absence(self.client.retrieve_page(id).await, id, "page")
    }

    /// Retrieves one database; absent if it no longer exists or access
    /// was revoked.
    pub async fn get_database(&self, id: &NotionId) -> Result<Option<Database>, AppError> {
        normalize_absence(self.client.retrieve_database(id).await, id, "database")
    }

    /// Returns the full content tree rooted at a resource as one flat,
    /// breadth-first sequence.
    ///
    /// Each level drains the direct children of every pending container
    /// concurrently; a block's own children are queued for the next
    /// level iff it has children and is not a `child_page` marker —
    /// those children belong to the nested page, which gets its own
    /// crawl.
    pub async fn get_block_subtree(&self, root: &NotionId) -> Result<Vec<Block>, AppError> {
        let mut blocks = Vec::with_capacity(BLOCKS_PER_PAGE_ESTIMATE);
        let mut queue = vec![root.clone()];

        while !queue.is_empty() {
            let fetched: Vec<Result<Option<Vec<Block>>, AppError>> = stream::iter(queue.iter())
                .map(|container| self.children_of(container))
                .buffered(self.concurrency)
                .collect()
                .await;

            let mut next = Vec::new();
            for result in fetched {
                let Some(children) = result? else { continue };
                for block in children {
                    if block.descend_into_children() {
                        next.push(block.id.clone());
                    }
                    blocks.push(block);
                }
            }
            queue = next;
        }

        Ok(blocks)
    }

    /// Drains one container's direct children; absent if the container
    /// vanished mid-crawl.
    async fn children_of(&self, container: &NotionId) -> Result<Option<Vec<Block>>, AppError> {
        let drained = fetch_all_pages(
            |page_size, cursor| {
                self.client
                    .retrieve_block_children(container, page_size, cursor)
            },
            self.page_size,
            None,
        )
        .await;

        Ok(normalize_absence(drained, container, "block children")?.map(|result| result.items))
    }

    /// Drains a database's member query, returning each member page's id.
    ///
    /// A database that vanished between being fetched and being queried
    /// simply has no members.
    pub async fn get_database_member_ids(
        &self,
        database: &NotionId,
    ) -> Result<Vec<NotionId>, AppError> {
        let drained = fetch_all_pages(
            |page_size, cursor| self.client.query_database(database, page_size, cursor),
            self.page_size,
            None,
        )
        .await;

        Ok(normalize_absence(drained, database, "database members")?
            .map(|result| result.items)
            .unwrap_or_default())
    }

    /// Drains the workspace-wide search, returning every accessible
    /// page and database reference.
    pub async fn search_accessible_resources(&self) -> Result<Vec<ResourceRef>, AppError> {
        let result = fetch_all_pages(
            |page_size, cursor| self.client.search(page_size, cursor),
            self.page_size,
            None,
        )
        .await?;

        log::info!("Search returned {} accessible resources", result.items.len());
        Ok(result.items)
    }
}

/// Maps a not-found failure to `None`; everything else propagates.
fn normalize_absence<T>(
    result: Result<T, AppError>,
    id: &NotionId,
    what: &str,
) -> Result<Option<T>, AppError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => {
            log::info!("Inaccessible {} {} dropped from the crawl", what, id);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
