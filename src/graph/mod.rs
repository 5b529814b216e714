// src/graph/mod.rs
//! The link graph: nodes, edges, and the crawler that assembles them.

pub mod crawler;
pub mod links;
pub mod view;

use crate::constants::GRAPH_INITIAL_CAPACITY;
use crate::model::{Block, ParentRef, ResourceKind};
use crate::types::NotionId;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A resource's resolved parent relationship.
///
/// Exactly one of three shapes: under a page, under a database, or at
/// the workspace root (which carries no id and contributes no edge).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parent {
    Page(NotionId),
    Database(NotionId),
    Workspace,
}

impl Parent {
    /// Resolves the parent declared on a fetched resource.
    ///
    /// Block-parented pages have no arm in this model; they resolve to
    /// the workspace root and contribute no parent edge.
    pub fn from_declared(declared: &ParentRef) -> Self {
        match declared {
            ParentRef::Page { page_id } => Parent::Page(page_id.clone()),
            ParentRef::Database { database_id } => Parent::Database(database_id.clone()),
            ParentRef::Workspace | ParentRef::Block { .. } => Parent::Workspace,
        }
    }

    /// The parent's id, when it has one.
    pub fn id(&self) -> Option<&NotionId> {
        match self {
            Parent::Page(id) | Parent::Database(id) => Some(id),
            Parent::Workspace => None,
        }
    }

    /// The parent's resource kind, when it is itself a crawlable resource.
    pub fn kind(&self) -> Option<ResourceKind> {
        match self {
            Parent::Page(_) => Some(ResourceKind::Page),
            Parent::Database(_) => Some(ResourceKind::Database),
            Parent::Workspace => None,
        }
    }
}

impl Default for Parent {
    fn default() -> Self {
        Parent::Workspace
    }
}

/// The outbound references extracted from one page's blocks.
///
/// Repeated mentions of the same target are preserved — collapsing them
/// to one edge per distinct target is a projection-time choice (see
/// `view::EdgeMultiplicity`). The parent field is filled by the crawler,
/// not the extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkSet {
    pub linked_pages: Vec<NotionId>,
    pub linked_databases: Vec<NotionId>,
    pub linked_users: Vec<NotionId>,
    pub child_pages: Vec<NotionId>,
    pub parent: Parent,
}

/// A database's outbound references: its member pages and its parent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseLinks {
    pub pages: Vec<NotionId>,
    pub parent: Parent,
}

/// Per-kind edge payload of a graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeLinks {
    Page(LinkSet),
    Database(DatabaseLinks),
}

impl NodeLinks {
    pub fn parent(&self) -> &Parent {
        match self {
            NodeLinks::Page(links) => &links.parent,
            NodeLinks::Database(links) => &links.parent,
        }
    }
}

/// One materialized workspace resource with its outbound edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NotionId,
    pub kind: ResourceKind,
    pub title: String,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    /// Flattened block subtree; always empty for databases.
    pub blocks: Vec<Block>,
    pub links: NodeLinks,
}

/// The assembled link graph: an insertion-ordered map from resource id
/// to node.
///
/// Built fresh by each crawl and installed on the crawler wholesale on
/// success; edge targets need not appear as keys (a dangling edge means
/// the target was inaccessible).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Graph {
    nodes: IndexMap<NotionId, GraphNode>,
}

impl Graph {
    pub fn new() -> Self {
        Self::with_capacity(GRAPH_INITIAL_CAPACITY)
    }

    pub fn with_capacity(expected_nodes: usize) -> Self {
        Self {
            nodes: IndexMap::with_capacity(expected_nodes),
        }
    }

    /// Inserts a node keyed by its id, replacing any previous node with
    /// the same id.
    pub fn insert(&mut self, node: GraphNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    #[allow(dead_code)] // Used by lib consumers
    pub fn get(&self, id: &NotionId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NotionId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[allow(dead_code)] // Used by lib consumers
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NotionId, &GraphNode)> {
        self.nodes.iter()
    }

    #[allow(dead_code)] // Used by lib consumers
    pub fn ids(&self) -> impl Iterator<Item = &NotionId> {
        self.nodes.keys()
    }
}
