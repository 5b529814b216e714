// src/api/mod.rs
//! Notion API interaction — the ability to retrieve content from a workspace.
//!
//! This module provides a data-oriented interface to the Notion API,
//! with clear separation between I/O operations, parsing, and business
//! logic: the `NotionRepository` trait is the wire boundary, `pagination`
//! drains cursors, `repository` layers domain semantics (absence,
//! subtree drains) on top.

pub mod client;
pub mod pagination;
pub mod parser;
pub mod repository;

use crate::error::AppError;
use crate::model::{Block, Database, Page, ResourceRef};
use crate::types::NotionId;
use pagination::PaginatedResponse;

/// The ability to retrieve content from a Notion workspace.
///
/// This is the fundamental algebra for API interaction. Business logic
/// depends on this trait, never on HTTP details. Paginated operations
/// are exposed at single-page granularity so the drain layer above is
/// one reusable function — and so tests can exercise cursor handling.
#[async_trait::async_trait]
pub trait NotionRepository: Send + Sync {
    /// Retrieves one page by id.
    async fn retrieve_page(&self, id: &NotionId) -> Result<Page, AppError>;

    /// Retrieves one database by id.
    async fn retrieve_database(&self, id: &NotionId) -> Result<Database, AppError>;

    /// Retrieves one page of a container's direct child blocks.
    async fn retrieve_block_children(
        &self,
        parent: &NotionId,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<Block>, AppError>;

    /// Retrieves one page of a database's member page ids.
    async fn query_database(
        &self,
        database: &NotionId,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<NotionId>, AppError>;

    /// Retrieves one page of the unfiltered workspace-wide search.
    async fn search(
        &self,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<ResourceRef>, AppError>;
}

// Re-export the public interface
pub use client::NotionHttpClient;
pub use repository::ResourceRepository;
