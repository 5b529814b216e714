// src/lib.rs
//! notion-graph library — crawls a Notion workspace and materializes its
//! link structure as an in-memory directed graph.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling** — `AppError`, `NotionErrorCode`, `ValidationError`
//! - **Configuration** — `CrawlerConfig`
//! - **Domain model** — `Page`, `Database`, `Block`, `ResourceRef`, etc.
//! - **Domain types** — `NotionId`, `ApiKey`, `RichTextItem`, etc.
//! - **API access** — `NotionRepository`, `NotionHttpClient`,
//!   `ResourceRepository`, pagination
//! - **Graph** — `GraphCrawler`, `Graph`, `GraphNode`, `LinkSet`,
//!   `GraphView`

// Internal modules — must match what's in main.rs
mod api;
mod config;
mod constants;
mod error;
mod error_recovery;
mod graph;
mod model;
mod types;

// --- Error Handling ---
pub use crate::error::{AppError, NotionErrorCode};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, CrawlerConfig};

// --- Domain Model ---
pub use crate::model::{
    Block, BlockType, Database, Page, ParentRef, PropertyValue, ResourceKind, ResourceRef,
};

// --- Domain Types ---
pub use crate::types::{ApiKey, MentionKind, NotionId, PropertyName, RichTextItem, RichTextType};

// --- API Access ---
pub use crate::api::{
    pagination::{fetch_all_pages, PaginatedResponse, PaginationResult},
    NotionHttpClient, NotionRepository, ResourceRepository,
};

// --- Graph ---
pub use crate::graph::{
    crawler::GraphCrawler,
    links::extract_links,
    view::{EdgeMultiplicity, GraphView, ViewLink, ViewNode},
    DatabaseLinks, Graph, GraphNode, LinkSet, NodeLinks, Parent,
};
