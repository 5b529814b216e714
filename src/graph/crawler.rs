// src/graph/crawler.rs
//! Level-synchronous BFS over the workspace reference graph.
//!
//! The crawl proceeds in waves: every resource queued for the current
//! level is fetched through a bounded concurrent fan-out, the results
//! are folded into the graph sequentially, and the next wave is every
//! referenced id not yet graphed and not already queued. Crawler state
//! is only ever touched between fan-outs, so no locking is needed.

use super::links::extract_links;
use super::{DatabaseLinks, Graph, GraphNode, LinkSet, NodeLinks, Parent};
use crate::api::ResourceRepository;
use crate::constants::GRAPH_INITIAL_CAPACITY;
use crate::error::AppError;
use crate::model::{Block, Database, Page, PropertyValue, ResourceKind, ResourceRef};
use crate::types::{NotionId, PropertyName, RichTextItem};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};

/// Owns the crawl and its result.
///
/// The held graph is replaced wholesale when a crawl completes; a crawl
/// that fails leaves the previous graph (if any) untouched.
pub struct GraphCrawler {
    repo: ResourceRepository,
    graph: Option<Graph>,
}

impl GraphCrawler {
    pub fn new(repo: ResourceRepository) -> Self {
        Self { repo, graph: None }
    }

    /// The graph assembled by the last successful crawl.
    pub fn graph(&self) -> Option<&Graph> {
        self.graph.as_ref()
    }

    /// Crawls the whole workspace and installs the resulting graph.
    ///
    /// Inaccessible resources are dropped silently; any other fetch
    /// failure aborts the crawl with no partial result.
    pub async fn build(&mut self) -> Result<&Graph, AppError> {
        let graph = self.crawl().await?;
        Ok(self.graph.insert(graph))
    }

    async fn crawl(&self) -> Result<Graph, AppError> {
        let mut graph = Graph::with_capacity(GRAPH_INITIAL_CAPACITY);

        // Seed: everything the integration can see, workspace-wide.
        let mut frontier = self.repo.search_accessible_resources().await?;
        let mut level = 0u32;

        while !frontier.is_empty() {
            level += 1;
            log::debug!(
                "Level {}: fetching {} queued resources",
                level,
                frontier.len()
            );

            let (page_refs, database_refs): (Vec<_>, Vec<_>) = frontier
                .into_iter()
                .partition(|entry| entry.kind == ResourceKind::Page);

            // Retrieve the resources themselves. Entries that vanished
            // between being queued and being fetched drop out here.
            let (pages, databases) = tokio::join!(
                self.fetch_pages(page_refs),
                self.fetch_databases(database_refs)
            );
            let (pages, databases) = (pages?, databases?);

            // Retrieve each page's block subtree and each database's
            // member page ids.
            let (pages, databases) = tokio::join!(
                self.attach_block_subtrees(pages),
                self.attach_member_ids(databases)
            );
            let (pages, databases) = (pages?, databases?);

            let mut page_links = Vec::with_capacity(pages.len());
            let mut database_links = Vec::with_capacity(databases.len());

            for (page, blocks) in pages {
                page_links.push(insert_page_node(&mut graph, page, blocks));
            }
            for (database, member_ids) in databases {
                database_links.push(insert_database_node(&mut graph, database, member_ids));
            }

            frontier = next_frontier(&graph, &page_links, &database_links);
        }

        log::info!("Crawl complete: {} nodes across {} levels", graph.len(), level);
        Ok(graph)
    }

    async fn fetch_pages(&self, refs: Vec<ResourceRef>) -> Result<Vec<Page>, AppError> {
        let results: Vec<Result<Option<Page>, AppError>> = stream::iter(refs)
            .map(|entry| async move { self.repo.get_page(&entry.id).await })
            .buffered(self.repo.concurrency())
            .collect()
            .await;
        results.into_iter().filter_map(|result| result.transpose()).collect()
    }

    async fn fetch_databases(&self, refs: Vec<ResourceRef>) -> Result<Vec<Database>, AppError> {
        let results: Vec<Result<Option<Database>, AppError>> = stream::iter(refs)
            .map(|entry| async move { self.repo.get_database(&entry.id).await })
            .buffered(self.repo.concurrency())
            .collect()
            .await;
        results.into_iter().filter_map(|result| result.transpose()).collect()
    }

    async fn attach_block_subtrees(
        &self,
        pages: Vec<Page>,
    ) -> Result<Vec<(Page, Vec<Block>)>, AppError> {
        let results: Vec<Result<(Page, Vec<Block>), AppError>> = stream::iter(pages)
            .map(|page| async move {
                let blocks = self.repo.get_block_subtree(&page.id).await?;
                Ok((page, blocks))
            })
            .buffered(self.repo.concurrency())
            .collect()
            .await;
        results.into_iter().collect()
    }

    async fn attach_member_ids(
        &self,
        databases: Vec<Database>,
    ) -> Result<Vec<(Database, Vec<NotionId>)>, AppError> {
        let results: Vec<Result<(Database, Vec<NotionId>), AppError>> = stream::iter(databases)
            .map(|database| async move {
                let member_ids = self.repo.get_database_member_ids(&database.id).await?;
                Ok((database, member_ids))
            })
            .buffered(self.repo.concurrency())
            .collect()
            .await;
        results.into_iter().collect()
    }
}

/// Extracts a page's links, resolves its parent and title, and inserts
/// its node. Returns the links for frontier expansion.
fn insert_page_node(graph: &mut Graph, page: Page, blocks: Vec<Block>) -> LinkSet {
    let mut links = extract_links(&blocks);
    links.parent = Parent::from_declared(&page.parent);

    graph.insert(GraphNode {
        id: page.id.clone(),
        kind: ResourceKind::Page,
        title: resolve_page_title(&page.properties),
        created_time: page.created_time,
        last_edited_time: page.last_edited_time,
        blocks,
        links: NodeLinks::Page(links.clone()),
    });

    links
}

/// Resolves a database's parent and title and inserts its node.
/// Returns the links for frontier expansion.
fn insert_database_node(
    graph: &mut Graph,
    database: Database,
    member_ids: Vec<NotionId>,
) -> DatabaseLinks {
    let links = DatabaseLinks {
        pages: member_ids,
        parent: Parent::from_declared(&database.parent),
    };

    graph.insert(GraphNode {
        id: database.id.clone(),
        kind: ResourceKind::Database,
        title: join_title_fragments(&database.title),
        created_time: database.created_time,
        last_edited_time: database.last_edited_time,
        blocks: Vec::new(),
        links: NodeLinks::Database(links.clone()),
    });

    links
}

/// Computes the next wave: every id referenced this level that is
/// neither already graphed nor already queued.
fn next_frontier(
    graph: &Graph,
    page_links: &[LinkSet],
    database_links: &[DatabaseLinks],
) -> Vec<ResourceRef> {
    let mut builder = FrontierBuilder::new(graph);

    for links in page_links {
        for id in &links.child_pages {
            builder.push(id, ResourceKind::Page);
        }
        for id in &links.linked_pages {
            builder.push(id, ResourceKind::Page);
        }
        for id in &links.linked_databases {
            builder.push(id, ResourceKind::Database);
        }
        builder.push_parent(&links.parent);
    }

    for links in database_links {
        for id in &links.pages {
            builder.push(id, ResourceKind::Page);
        }
        builder.push_parent(&links.parent);
    }

    builder.into_refs()
}

/// Frontier accumulator deduplicating against both the graph and the
/// frontier being built.
struct FrontierBuilder<'a> {
    graph: &'a Graph,
    queued: HashSet<NotionId>,
    refs: Vec<ResourceRef>,
}

impl<'a> FrontierBuilder<'a> {
    fn new(graph: &'a Graph) -> Self {
        Self {
            graph,
            queued: HashSet::new(),
            refs: Vec::new(),
        }
    }

    fn push(&mut self, id: &NotionId, kind: ResourceKind) {
        if self.graph.contains(id) || self.queued.contains(id) {
            return;
        }
        self.queued.insert(id.clone());
        self.refs.push(ResourceRef {
            id: id.clone(),
            kind,
        });
    }

    fn push_parent(&mut self, parent: &Parent) {
        if let (Some(id), Some(kind)) = (parent.id(), parent.kind()) {
            self.push(id, kind);
        }
    }

    fn into_refs(self) -> Vec<ResourceRef> {
        self.refs
    }
}

/// Resolves a page title via the two-case property fallback: a
/// title-typed property named "Name", else a property literally named
/// "title", else the empty string.
fn resolve_page_title(properties: &HashMap<PropertyName, PropertyValue>) -> String {
    properties
        .get("Name")
        .filter(|value| value.is_title())
        .or_else(|| properties.get("title"))
        .and_then(|value| value.title_fragments())
        .map(join_title_fragments)
        .unwrap_or_default()
}

/// Concatenates title fragments: each fragment's plain text, trimmed,
/// space-joined.
fn join_title_fragments(fragments: &[RichTextItem]) -> String {
    fragments
        .iter()
        .map(|fragment| fragment.plain_text.trim())
        .collect::<Vec<_>>()
        .join(" ")
}
